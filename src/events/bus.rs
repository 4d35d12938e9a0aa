//! # Event bus: synchronous fan-out to registered subscribers.
//!
//! [`Bus`] is a registry of [`Subscribe`] implementations. Publishing calls
//! every current subscriber directly, in registration order, before
//! returning. There is no queue, no buffering and no backpressure.
//!
//! ## Architecture
//! ```text
//! Publishers:                          Subscribers (registration order):
//!   Engine::queue ───┐
//!   Engine::run_batch┼──► Bus::publish ──► sub1.on_event(&ev)
//!   timer firings ───┤       (direct)  ──► sub2.on_event(&ev)
//!   resolve_error ───┘                 ──► subN.on_event(&ev)
//! ```
//!
//! ## Rules
//! - **Set semantics**: subscribing the same `Arc` twice returns the existing id.
//! - **Synchronous**: `publish()` returns after every subscriber has run.
//! - **Panic isolation**: a panicking subscriber is logged and skipped; the rest
//!   still receive the event.
//! - **No persistence**: events published with no subscribers are dropped.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use crate::events::event::Event;
use crate::subscribers::Subscribe;

/// Handle returned by [`Bus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw numeric value (unique per bus).
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Per-subscription registry entry.
struct Entry {
    id: SubscriptionId,
    subscriber: Arc<dyn Subscribe>,
}

/// Registry of subscribers with direct, ordered fan-out.
#[derive(Default)]
pub struct Bus {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Bus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber.
    ///
    /// Subscribing an `Arc` that is already registered is a no-op and returns
    /// the id of the existing subscription.
    pub fn subscribe(&mut self, subscriber: Arc<dyn Subscribe>) -> SubscriptionId {
        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| std::ptr::addr_eq(Arc::as_ptr(&e.subscriber), Arc::as_ptr(&subscriber)))
        {
            return existing.id;
        }

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, subscriber });
        id
    }

    /// Removes a subscription. Returns `false` if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Delivers `event` to every subscriber, in registration order.
    pub fn publish(&self, event: &Event) {
        for entry in &self.entries {
            let sub = &entry.subscriber;
            if let Err(panic_err) = panic::catch_unwind(AssertUnwindSafe(|| sub.on_event(event))) {
                warn!(
                    subscriber = sub.name(),
                    kind = event.kind(),
                    info = %panic_message(panic_err.as_ref()),
                    "subscriber panicked"
                );
            }
        }
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.id, e.subscriber.name())))
            .finish()
    }
}

fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
