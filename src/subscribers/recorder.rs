//! # Recorder - in-memory event log
//!
//! A subscriber that keeps every event it receives. Handy in tests and demos
//! to assert on the exact emitted sequence.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::documents::WorkflowStatus;
use crate::events::Event;
use crate::subscribers::subscriber::Subscribe;

/// Collects events in delivery order.
#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    /// Construct an empty [`Recorder`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// `(id, status)` pairs of the recorded status events.
    pub fn statuses(&self) -> Vec<(String, WorkflowStatus)> {
        self.lock()
            .iter()
            .filter_map(Event::as_status)
            .map(|s| (s.id.clone(), s.status))
            .collect()
    }

    /// Statuses recorded for one document, in order.
    pub fn statuses_of(&self, id: &str) -> Vec<WorkflowStatus> {
        self.lock()
            .iter()
            .filter_map(Event::as_status)
            .filter(|s| s.id == id)
            .map(|s| s.status)
            .collect()
    }

    /// Values of the recorded stream events, in order.
    pub fn stream_values(&self) -> Vec<bool> {
        self.lock().iter().filter_map(Event::as_stream).collect()
    }

    /// Drops everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Subscribe for Recorder {
    fn on_event(&self, event: &Event) {
        self.lock().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}
