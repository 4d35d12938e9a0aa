//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], the extension point for plugging event handlers
//! into an [`Engine`](crate::Engine).
//!
//! ## Rules
//! - `on_event` runs **inline** inside the publisher call (timer firing,
//!   `queue`, `run_batch`, `resolve_error`); keep it short.
//! - Events arrive in emission order; every subscriber sees the same order.
//! - Panics are caught by the bus and logged; other subscribers are unaffected.
//! - Subscribers that need async processing should forward events to a channel
//!   (see [`BroadcastForwarder`](crate::BroadcastForwarder)).
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use signflow::{Event, Subscribe, WorkflowStatus};
//!
//! #[derive(Default)]
//! struct ErrorCounter(AtomicUsize);
//!
//! impl Subscribe for ErrorCounter {
//!     fn on_event(&self, ev: &Event) {
//!         if ev.as_status().is_some_and(|s| s.status == WorkflowStatus::Error) {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "error-counter" }
//! }
//! ```

use crate::events::Event;

/// Event subscriber registered on the engine's bus.
///
/// ### Implementation requirements
/// - Do not block; the engine waits for `on_event` to return.
/// - Handle errors internally; do not panic.
/// - Use interior mutability for state (`Mutex`, atomics): the bus holds
///   subscribers behind `Arc`.
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    fn on_event(&self, event: &Event);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
