//! # Engine configuration.
//!
//! Provides [`EngineConfig`], the centralized timing and probability settings
//! of the workflow engine. Defaults reproduce the simulated insurer pipeline:
//!
//! | Setting                    | Default | Used by                        |
//! |----------------------------|---------|--------------------------------|
//! | `queue_base_delay`         | 120ms   | queue: per-index delay + jitter bound |
//! | `queue_finalize_per_item`  | 140ms   | queue: activity finalize       |
//! | `queue_finalize_flat`      | 600ms   | queue: activity finalize       |
//! | `batch_stagger`            | 280ms   | batch: start offset per index  |
//! | `stage_delays`             | 500/700/900/1000ms | batch: ready/signing/routed/delivered |
//! | `stage_jitter`             | 300ms   | batch: jitter bound per stage  |
//! | `fault_probability`        | 0.12    | batch: fault draw at `routed`  |
//! | `remediation_delay`        | 1600ms  | recovery: error → ready        |
//! | `redelivery_delay`         | 900ms   | recovery: ready → delivered    |
//! | `pipeline_duration`        | 3600ms  | batch: activity finalize       |
//! | `recovery_window`          | 2600ms  | batch: activity finalize       |
//! | `broadcast_capacity`       | 1024    | driver: async event stream     |
//!
//! ## Finalize windows
//! The activity finalize timer of an invocation must fire strictly after its
//! last status event. [`EngineConfig::validate`] rejects settings where the
//! configured windows could be overtaken by the worst-case timeline.

use std::time::Duration;

use crate::documents::WorkflowStatus;
use crate::error::{Error, Result};
use crate::policies::JitterPolicy;

/// Nominal delay of each batch stage, added to the document's cumulative offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageDelays {
    pub ready: Duration,
    pub signing: Duration,
    pub routed: Duration,
    pub delivered: Duration,
}

impl StageDelays {
    /// Nominal delay for `stage`; zero for statuses outside the stage list.
    pub fn delay_for(&self, stage: WorkflowStatus) -> Duration {
        match stage {
            WorkflowStatus::Ready => self.ready,
            WorkflowStatus::Signing => self.signing,
            WorkflowStatus::Routed => self.routed,
            WorkflowStatus::Delivered => self.delivered,
            WorkflowStatus::Pending | WorkflowStatus::Error => Duration::ZERO,
        }
    }

    /// Sum of all four stage delays.
    pub fn total(&self) -> Duration {
        self.ready + self.signing + self.routed + self.delivered
    }
}

impl Default for StageDelays {
    fn default() -> Self {
        Self {
            ready: Duration::from_millis(500),
            signing: Duration::from_millis(700),
            routed: Duration::from_millis(900),
            delivered: Duration::from_millis(1000),
        }
    }
}

/// Timing and probability settings of the engine.
///
/// ## Field semantics
/// - Queue mode: `queue_base_delay`, `queue_finalize_per_item`, `queue_finalize_flat`
/// - Batch mode: `batch_stagger`, `stage_delays`, `stage_jitter`, `jitter`,
///   `pipeline_duration`, `recovery_window`
/// - Faults: `fault_probability`, `remediation_delay`, `redelivery_delay`
/// - Driver: `broadcast_capacity` (min 1)
///
/// ## Notes
/// All fields are public for flexibility. Call [`EngineConfig::validate`]
/// (done by [`EngineBuilder::build`](crate::EngineBuilder::build)) after editing.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Queue mode: item `i` becomes ready after `base * i + jitter(0, base)`.
    pub queue_base_delay: Duration,
    /// Queue mode: finalize after `items * per_item + flat`.
    pub queue_finalize_per_item: Duration,
    pub queue_finalize_flat: Duration,

    /// Batch mode: document `i` starts its timeline at `i * stagger`.
    pub batch_stagger: Duration,
    /// Batch mode: nominal per-stage delays.
    pub stage_delays: StageDelays,
    /// Batch mode: jitter bound added to every stage.
    pub stage_jitter: Duration,
    /// How jitter is drawn (queue and batch).
    pub jitter: JitterPolicy,

    /// Probability that the `routed` attempt is rejected. Must be in `[0, 1]`.
    pub fault_probability: f64,
    /// Delay between `error` and the remediated `ready`.
    pub remediation_delay: Duration,
    /// Delay between the remediated `ready` and `delivered`.
    pub redelivery_delay: Duration,

    /// Batch mode: finalize after `(items - 1) * stagger + pipeline + recovery`.
    pub pipeline_duration: Duration,
    pub recovery_window: Duration,

    /// Capacity of the driver's broadcast stream.
    pub broadcast_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_base_delay: Duration::from_millis(120),
            queue_finalize_per_item: Duration::from_millis(140),
            queue_finalize_flat: Duration::from_millis(600),
            batch_stagger: Duration::from_millis(280),
            stage_delays: StageDelays::default(),
            stage_jitter: Duration::from_millis(300),
            jitter: JitterPolicy::Full,
            fault_probability: 0.12,
            remediation_delay: Duration::from_millis(1600),
            redelivery_delay: Duration::from_millis(900),
            pipeline_duration: Duration::from_millis(3600),
            recovery_window: Duration::from_millis(2600),
            broadcast_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Activity finalize delay of a queue invocation with `items` documents.
    #[inline]
    pub fn queue_finalize_delay(&self, items: usize) -> Duration {
        self.queue_finalize_per_item.saturating_mul(saturating_u32(items)) + self.queue_finalize_flat
    }

    /// Activity finalize delay of a batch invocation with `items` documents.
    #[inline]
    pub fn batch_finalize_delay(&self, items: usize) -> Duration {
        self.stagger_offset(items.saturating_sub(1)) + self.pipeline_duration + self.recovery_window
    }

    /// Start offset of the document at `index` within a batch.
    #[inline]
    pub fn stagger_offset(&self, index: usize) -> Duration {
        self.batch_stagger.saturating_mul(saturating_u32(index))
    }

    /// Latest time, relative to its own start offset, at which one batch
    /// document can emit its final status.
    pub fn worst_case_document_span(&self) -> Duration {
        let jmax = self.jitter.max_extra(self.stage_jitter);
        let d = &self.stage_delays;
        let happy = d.total() + jmax * 4;
        let faulted = d.ready + d.signing + d.routed + jmax * 3 + self.remediation_delay + self.redelivery_delay;
        happy.max(faulted)
    }

    /// Returns the broadcast capacity clamped to a minimum of 1.
    #[inline]
    pub fn broadcast_capacity_clamped(&self) -> usize {
        self.broadcast_capacity.max(1)
    }

    /// Checks ranges and finalize windows.
    ///
    /// - `fault_probability` must be finite and in `[0, 1]`
    /// - queue: `queue_finalize_per_item >= queue_base_delay` and a non-zero
    ///   `queue_finalize_flat`, so finalize always trails the last `ready`
    /// - batch: `pipeline_duration + recovery_window` must exceed
    ///   [`worst_case_document_span`](Self::worst_case_document_span)
    pub fn validate(&self) -> Result<()> {
        if !self.fault_probability.is_finite() || !(0.0..=1.0).contains(&self.fault_probability) {
            return Err(Error::invalid_config(
                "fault_probability",
                format!("must be in [0, 1], got {}", self.fault_probability),
            ));
        }
        if self.queue_finalize_per_item < self.queue_base_delay {
            return Err(Error::invalid_config(
                "queue_finalize_per_item",
                format!(
                    "{:?} is shorter than queue_base_delay {:?}",
                    self.queue_finalize_per_item, self.queue_base_delay
                ),
            ));
        }
        if self.queue_finalize_flat.is_zero() {
            return Err(Error::invalid_config("queue_finalize_flat", "must be non-zero"));
        }
        let window = self.pipeline_duration + self.recovery_window;
        let span = self.worst_case_document_span();
        if window <= span {
            return Err(Error::invalid_config(
                "recovery_window",
                format!("finalize window {window:?} does not exceed worst-case span {span:?}"),
            ));
        }
        Ok(())
    }
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
