//! # Stage state machine.
//!
//! Pure decisions behind every timer firing. Nothing here schedules or
//! publishes: [`Engine`](crate::Engine) asks [`next_action`] what a firing
//! stage emits and what follows, and uses [`stage_delay`] / [`queue_delay`]
//! to turn configuration plus random draws into delays.
//!
//! ## Batch timeline of one document
//! ```text
//! ready ──► signing ──► routed ──► delivered                (no fault)
//!                         │
//!                         └─ draw < p_fault:
//!                              error ──(remediation)──► ready ──(redelivery)──► delivered
//! ```
//!
//! ## Draw order
//! 1. jitter of stage 0 when the batch is scheduled
//! 2. on every firing: the fault draw first (only at `routed`), then the
//!    jitter of the next stage
//! 3. the recovery detour draws nothing

use std::time::Duration;

use crate::config::EngineConfig;
use crate::documents::{Document, WorkflowStatus};
use crate::events::Event;
use crate::policies::RandomSource;

/// Batch stages in firing order.
pub const STAGES: [WorkflowStatus; 4] = [
    WorkflowStatus::Ready,
    WorkflowStatus::Signing,
    WorkflowStatus::Routed,
    WorkflowStatus::Delivered,
];

/// Index of the stage where faults are drawn.
pub const FAULT_STAGE: usize = 2;

/// The slice of a [`Document`] the engine keeps while work is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub id: String,
    pub insurer: String,
}

impl From<&Document> for WorkItem {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            insurer: doc.insurer.clone(),
        }
    }
}

/// What happens after a stage has fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Schedule the stage at this index.
    Stage(usize),
    /// Start the recovery detour.
    Recover,
    /// Timeline complete.
    Done,
}

/// Outcome of one stage firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageAction {
    pub emit: Event,
    pub next: NextStep,
}

/// Steps of the fixed recovery detour that follows a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStep {
    /// `ready` with a remediation message.
    Remediated,
    /// Final `delivered`.
    Redelivered,
}

impl RecoveryStep {
    /// First step and its delay after the `error` event.
    pub fn start(cfg: &EngineConfig) -> (Duration, RecoveryStep) {
        (cfg.remediation_delay, RecoveryStep::Remediated)
    }

    /// Event emitted when this step fires.
    pub fn emit(&self, item: &WorkItem) -> Event {
        match self {
            RecoveryStep::Remediated => Event::status(&item.id, WorkflowStatus::Ready)
                .with_message(format!("{} ready after remediation.", item.insurer)),
            RecoveryStep::Redelivered => Event::status(&item.id, WorkflowStatus::Delivered),
        }
    }

    /// Following step and its delay, if any.
    pub fn next(&self, cfg: &EngineConfig) -> Option<(Duration, RecoveryStep)> {
        match self {
            RecoveryStep::Remediated => Some((cfg.redelivery_delay, RecoveryStep::Redelivered)),
            RecoveryStep::Redelivered => None,
        }
    }
}

/// Decides what the firing of `stage` emits and what comes next.
///
/// `fault_draw` is only consulted at [`FAULT_STAGE`]; a draw strictly below
/// `cfg.fault_probability` rejects the attempt.
pub fn next_action(
    item: &WorkItem,
    stage: usize,
    fault_draw: Option<f64>,
    cfg: &EngineConfig,
) -> StageAction {
    let faulted =
        stage == FAULT_STAGE && fault_draw.is_some_and(|draw| draw < cfg.fault_probability);
    if faulted {
        return StageAction {
            emit: Event::status(&item.id, WorkflowStatus::Error)
                .with_message(format!("{} validation required additional data.", item.insurer)),
            next: NextStep::Recover,
        };
    }

    let status = STAGES.get(stage).copied().unwrap_or(WorkflowStatus::Delivered);
    let next = if stage + 1 < STAGES.len() {
        NextStep::Stage(stage + 1)
    } else {
        NextStep::Done
    };
    StageAction {
        emit: Event::status(&item.id, status),
        next,
    }
}

/// Returns true if the firing of `stage` needs a fault draw.
#[inline]
pub fn draws_fault(stage: usize) -> bool {
    stage == FAULT_STAGE
}

/// Nominal delay of `stage` plus one jitter draw.
pub fn stage_delay(cfg: &EngineConfig, stage: usize, rng: &mut dyn RandomSource) -> Duration {
    let nominal = STAGES
        .get(stage)
        .map(|s| cfg.stage_delays.delay_for(*s))
        .unwrap_or_default();
    nominal + cfg.jitter.sample(cfg.stage_jitter, rng)
}

/// Queue mode: delay of the item at `index` (`base * index + jitter(0, base)`).
pub fn queue_delay(cfg: &EngineConfig, index: usize, rng: &mut dyn RandomSource) -> Duration {
    let base = cfg.queue_base_delay;
    base.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX)) + cfg.jitter.sample(base, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::{JitterPolicy, ScriptedRandom};

    fn item() -> WorkItem {
        WorkItem {
            id: "EMP001-a.pdf".into(),
            insurer: "LINK4".into(),
        }
    }

    #[test]
    fn test_happy_progression() {
        let cfg = EngineConfig::default();
        let item = item();

        let a = next_action(&item, 0, None, &cfg);
        assert_eq!(a.emit, Event::status("EMP001-a.pdf", WorkflowStatus::Ready));
        assert_eq!(a.next, NextStep::Stage(1));

        let a = next_action(&item, 2, Some(0.5), &cfg);
        assert_eq!(a.emit, Event::status("EMP001-a.pdf", WorkflowStatus::Routed));
        assert_eq!(a.next, NextStep::Stage(3));

        let a = next_action(&item, 3, None, &cfg);
        assert_eq!(a.emit.as_status().unwrap().status, WorkflowStatus::Delivered);
        assert_eq!(a.next, NextStep::Done);
    }

    #[test]
    fn test_fault_at_routed() {
        let cfg = EngineConfig::default();
        let a = next_action(&item(), 2, Some(0.05), &cfg);
        let change = a.emit.as_status().unwrap();
        assert_eq!(change.status, WorkflowStatus::Error);
        assert_eq!(change.message(), Some("LINK4 validation required additional data."));
        assert_eq!(a.next, NextStep::Recover);
    }

    #[test]
    fn test_fault_ignored_outside_routed() {
        let cfg = EngineConfig::default();
        let a = next_action(&item(), 1, Some(0.0), &cfg);
        assert_eq!(a.emit.as_status().unwrap().status, WorkflowStatus::Signing);
    }

    #[test]
    fn test_fault_threshold_is_strict() {
        let cfg = EngineConfig {
            fault_probability: 0.25,
            ..EngineConfig::default()
        };
        assert_eq!(next_action(&item(), 2, Some(0.25), &cfg).next, NextStep::Stage(3));
        assert_eq!(next_action(&item(), 2, Some(0.2499), &cfg).next, NextStep::Recover);
    }

    #[test]
    fn test_recovery_steps() {
        let cfg = EngineConfig::default();
        let item = item();
        let (delay, step) = RecoveryStep::start(&cfg);
        assert_eq!(delay, Duration::from_millis(1600));

        let ev = step.emit(&item);
        let change = ev.as_status().unwrap();
        assert_eq!(change.status, WorkflowStatus::Ready);
        assert_eq!(change.message(), Some("LINK4 ready after remediation."));

        let (delay, step) = step.next(&cfg).unwrap();
        assert_eq!(delay, Duration::from_millis(900));
        assert_eq!(step.emit(&item).as_status().unwrap().status, WorkflowStatus::Delivered);
        assert!(step.next(&cfg).is_none());
    }

    #[test]
    fn test_delays_with_pinned_draws() {
        let cfg = EngineConfig::default();
        let mut rng = ScriptedRandom::constant(0.5);
        assert_eq!(stage_delay(&cfg, 0, &mut rng), Duration::from_millis(650));
        assert_eq!(stage_delay(&cfg, 3, &mut rng), Duration::from_millis(1150));
        assert_eq!(queue_delay(&cfg, 2, &mut rng), Duration::from_millis(300));
    }

    #[test]
    fn test_no_jitter_uses_nominal_delay() {
        let cfg = EngineConfig {
            jitter: JitterPolicy::None,
            ..EngineConfig::default()
        };
        let mut rng = ScriptedRandom::new(std::iter::empty());
        assert_eq!(stage_delay(&cfg, 1, &mut rng), Duration::from_millis(700));
        assert_eq!(queue_delay(&cfg, 3, &mut rng), Duration::from_millis(360));
    }
}
