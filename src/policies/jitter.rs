//! # Jitter policy for stage delays.
//!
//! [`JitterPolicy`] adds a bounded random amount to a nominal delay so that
//! documents in the same batch do not transition in lock-step.
//!
//! - [`JitterPolicy::None`] - no randomization, never consumes a draw
//! - [`JitterPolicy::Full`] - extra delay in [0, bound] (the default)
//! - [`JitterPolicy::Equal`] - extra delay = bound/2 + random[0, bound/2]

use std::time::Duration;

use crate::policies::random::RandomSource;

/// Policy controlling the random extra delay added on top of a nominal delay.
///
/// ## Trade-offs
/// - **None**: Exact timings, useful for previews and debugging
/// - **Full**: Widest spread, matches the simulated insurer behavior
/// - **Equal**: Spread with a guaranteed floor of half the bound
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: the nominal delay is used as-is.
    None,

    /// Full jitter: extra delay drawn uniformly from [0, bound].
    #[default]
    Full,

    /// Equal jitter: extra delay = bound/2 + random[0, bound/2].
    Equal,
}

impl JitterPolicy {
    /// Draws the extra delay for the given bound.
    ///
    /// `None` returns zero without touching `rng`, so disabling jitter does not
    /// shift the draws that later fault decisions see.
    pub fn sample(&self, bound: Duration, rng: &mut dyn RandomSource) -> Duration {
        match self {
            JitterPolicy::None => Duration::ZERO,
            JitterPolicy::Full => scale(bound, rng.next_unit()),
            JitterPolicy::Equal => {
                let half = bound / 2;
                half + scale(half, rng.next_unit())
            }
        }
    }

    /// Largest extra delay this policy can produce for `bound`.
    pub fn max_extra(&self, bound: Duration) -> Duration {
        match self {
            JitterPolicy::None => Duration::ZERO,
            JitterPolicy::Full | JitterPolicy::Equal => bound,
        }
    }
}

/// `bound * draw`, rounded to whole nanoseconds.
fn scale(bound: Duration, draw: f64) -> Duration {
    let nanos = (bound.as_nanos() as f64 * draw.clamp(0.0, 1.0)).round();
    Duration::from_nanos(nanos as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::random::{ScriptedRandom, SeededRandom};

    #[test]
    fn test_none_consumes_no_draw() {
        let mut rng = ScriptedRandom::new([0.9]);
        let d = JitterPolicy::None.sample(Duration::from_millis(300), &mut rng);
        assert_eq!(d, Duration::ZERO);
        assert_eq!(rng.remaining(), 1);
    }

    #[test]
    fn test_full_jitter_scales_bound() {
        let mut rng = ScriptedRandom::new([0.0, 0.5, 1.0]);
        let bound = Duration::from_millis(300);
        assert_eq!(JitterPolicy::Full.sample(bound, &mut rng), Duration::ZERO);
        assert_eq!(
            JitterPolicy::Full.sample(bound, &mut rng),
            Duration::from_millis(150)
        );
        assert_eq!(JitterPolicy::Full.sample(bound, &mut rng), bound);
    }

    #[test]
    fn test_equal_jitter_bounds() {
        let mut rng = SeededRandom::new(11);
        let bound = Duration::from_millis(1000);
        for _ in 0..200 {
            let d = JitterPolicy::Equal.sample(bound, &mut rng);
            assert!(d >= Duration::from_millis(500));
            assert!(d <= bound);
        }
    }

    #[test]
    fn test_zero_bound_is_zero() {
        let mut rng = ScriptedRandom::constant(0.7);
        assert_eq!(
            JitterPolicy::Full.sample(Duration::ZERO, &mut rng),
            Duration::ZERO
        );
        assert_eq!(
            JitterPolicy::Equal.sample(Duration::ZERO, &mut rng),
            Duration::ZERO
        );
    }
}
