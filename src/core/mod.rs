//! Runtime core: scheduling, stage progression and the real-time driver.
//!
//! The public API of this module is [`Engine`] (with its [`EngineBuilder`])
//! and the tokio [`Driver`] that runs an engine on a real clock.
//!
//! Internal modules:
//! - [`timers`]: virtual clock and cancellable timer queue;
//! - [`stages`]: pure stage state machine, delays and recovery detour;
//! - [`activity`]: the change-detecting activity flag behind `stream` events;
//! - [`engine`]: entry points, timer firing and event publishing;
//! - [`builder`]: validated engine construction;
//! - [`driver`]: tokio task mapping virtual time onto real time.

mod activity;
mod builder;
mod driver;
mod engine;
pub mod stages;
mod timers;

pub use builder::EngineBuilder;
pub use driver::{Driver, DriverHandle};
pub use engine::{EMPTY_BATCH_MESSAGE, EMPTY_QUEUE_MESSAGE, Engine, MANUAL_RESOLUTION_MESSAGE};
pub use timers::{TimerId, TimerQueue};
