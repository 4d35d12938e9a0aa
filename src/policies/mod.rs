//! Timing and randomness policies.
//!
//! This module groups the knobs that decide **how long** a stage waits and
//! **where** the randomness behind that wait comes from.
//!
//! ## Contents
//! - [`JitterPolicy`] randomization added on top of nominal stage delays
//! - [`RandomSource`] the single injectable source of draws for jitter and faults
//! - [`ThreadRandom`], [`SeededRandom`], [`ScriptedRandom`] built-in sources
//!
//! ## Quick wiring
//! ```text
//! EngineConfig { jitter: JitterPolicy, stage_jitter, fault_probability, .. }
//!      └─► core::Engine owns Box<dyn RandomSource>:
//!           - jitter.sample(bound, rng) for every scheduled stage
//!           - rng.next_unit() < fault_probability at the `routed` attempt
//! ```

mod jitter;
mod random;

pub use jitter::JitterPolicy;
pub use random::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
