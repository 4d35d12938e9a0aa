//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and built-in implementations
//! for handling events published through the engine's [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Engine ── publish(&Event) ──► Bus ──► every subscriber, inline
//!                                          │
//!                                          ├──► Subscribe::on_event(&Event)
//!                                          │         │
//!                                          │    ┌────┴─────┬───────────┬──────────────┐
//!                                          │    ▼          ▼           ▼              ▼
//!                                          │  LogWriter  Recorder  SubscriberFn  BroadcastForwarder ──► async receivers
//!                                          │
//!                                          └──► DocumentBoard (applies statuses to documents)
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers** - observe and react (logging, recording, forwarding)
//! - **Stateful subscribers** - maintain state from events ([`DocumentBoard`](crate::DocumentBoard))

mod forward;
#[cfg(feature = "logging")]
mod log;
mod recorder;
mod subscriber;
mod subscriber_fn;

pub use forward::BroadcastForwarder;
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use recorder::Recorder;
pub use subscriber::Subscribe;
pub use subscriber_fn::SubscriberFn;
