//! # Injectable random source.
//!
//! Every probabilistic decision the engine makes (jitter magnitude, fault draw)
//! is taken from one [`RandomSource`] owned by the engine. Swapping the source
//! is how tests pin a timeline.
//!
//! - [`ThreadRandom`] - thread-local generator, the production default
//! - [`SeededRandom`] - reproducible stream from a `u64` seed
//! - [`ScriptedRandom`] - replays a fixed list of draws, then a fallback value
//!
//! All sources yield values in `[0, 1)`; [`ScriptedRandom`] additionally accepts
//! `1.0` to express "maximum jitter".

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send + 'static {
    /// Returns the next uniform draw.
    fn next_unit(&mut self) -> f64;
}

/// Thread-local generator backed by [`rand::rng`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Reproducible generator seeded from a `u64`.
///
/// ## Example
/// ```rust
/// use signflow::{RandomSource, SeededRandom};
///
/// let mut a = SeededRandom::new(7);
/// let mut b = SeededRandom::new(7);
/// assert_eq!(a.next_unit(), b.next_unit());
/// ```
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a scripted sequence of draws.
///
/// Once the script is exhausted every further draw returns the fallback
/// (`0.0` unless set with [`ScriptedRandom::with_fallback`]). Values are
/// clamped to `[0, 1]`.
///
/// ## Example
/// ```rust
/// use signflow::{RandomSource, ScriptedRandom};
///
/// let mut r = ScriptedRandom::new([0.25, 0.75]).with_fallback(0.5);
/// assert_eq!(r.next_unit(), 0.25);
/// assert_eq!(r.next_unit(), 0.75);
/// assert_eq!(r.next_unit(), 0.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    script: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script: values.into_iter().map(clamp_unit).collect(),
            fallback: 0.0,
        }
    }

    /// Every draw returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(std::iter::empty()).with_fallback(value)
    }

    /// Sets the value returned after the script runs out.
    #[must_use]
    pub fn with_fallback(mut self, value: f64) -> Self {
        self.fallback = clamp_unit(value);
        self
    }

    /// Number of scripted draws not consumed yet.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
