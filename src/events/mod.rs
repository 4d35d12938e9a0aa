//! Lifecycle events: types and bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! deliver events emitted by the engine to its subscribers.
//!
//! ## Contents
//! - [`Event`], [`StatusChange`], [`ToastVariant`] event payloads (the wire contract)
//! - [`Bus`] synchronous subscriber registry
//!
//! ## Quick reference
//! - **Publishers**: `Engine` (queue/batch scheduling, timer firings, `resolve_error`).
//! - **Consumers**: any [`Subscribe`](crate::Subscribe) implementation, e.g.
//!   [`DocumentBoard`](crate::DocumentBoard), [`Recorder`](crate::Recorder) or the
//!   driver's broadcast forwarder.

mod bus;
mod event;

pub use bus::{Bus, SubscriptionId};
pub use event::{Event, StatusChange, StatusContext, ToastVariant};
