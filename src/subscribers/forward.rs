//! # Broadcast forwarder: bridge from the synchronous bus to async consumers.
//!
//! [`BroadcastForwarder`] is a subscriber that pushes every event into a
//! [`tokio::sync::broadcast`] channel. Async consumers hold receivers and read
//! at their own pace.
//!
//! ## Behavior
//! - `on_event` clones the event into the channel and returns; the engine's
//!   timer firing is never held up by an async reader.
//! - Receivers created with [`BroadcastForwarder::receiver`] only see events
//!   forwarded after they were created.
//! - A receiver that falls more than `capacity` events behind gets
//!   `RecvError::Lagged` and resumes from the oldest retained event. The
//!   [`Driver`](crate::Driver) sizes the channel from
//!   `EngineConfig::broadcast_capacity`.

use tokio::sync::broadcast;

use crate::events::Event;
use crate::subscribers::subscriber::Subscribe;

/// Forwards bus events into a broadcast channel.
#[derive(Clone, Debug)]
pub struct BroadcastForwarder {
    tx: broadcast::Sender<Event>,
}

impl BroadcastForwarder {
    /// Creates a forwarder with a fresh channel of the given capacity (min 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Creates a new receiver that observes subsequently forwarded events.
    pub fn receiver(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Sender side, for handing out more receivers later.
    pub fn sender(&self) -> broadcast::Sender<Event> {
        self.tx.clone()
    }
}

impl Subscribe for BroadcastForwarder {
    fn on_event(&self, event: &Event) {
        let _ = self.tx.send(event.clone());
    }

    fn name(&self) -> &'static str {
        "broadcast-forwarder"
    }
}
