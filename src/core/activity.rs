//! # Activity tracker.
//!
//! Holds the engine-wide "work in flight" flag behind the `stream` events.
//!
//! ## Rules
//! - Only a change of value produces an event; setting the current value is silent.
//! - Consecutive `stream` events therefore never carry the same value.

use crate::events::Event;

/// Boolean activity flag with change detection.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActivityTracker {
    active: bool,
}

impl ActivityTracker {
    /// Creates an inactive tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag; returns the `stream` event to publish if it changed.
    pub fn set(&mut self, active: bool) -> Option<Event> {
        if self.active == active {
            return None;
        }
        self.active = active;
        Some(Event::stream(active))
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }
}
