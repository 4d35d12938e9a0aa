//! # Engine: schedules document workflows on a virtual clock.
//!
//! The [`Engine`] owns everything one workflow simulation needs: the event
//! [`Bus`], the [`TimerQueue`], the [`ActivityTracker`] and the injected
//! [`RandomSource`]. It is single-threaded and driven explicitly: entry points
//! schedule timers, and [`Engine::advance`] / [`Engine::advance_to`] /
//! [`Engine::run_until_idle`] fire them. A [`Driver`](crate::Driver) maps the
//! virtual clock onto real time.
//!
//! ## Flow
//! ```text
//! queue(docs) ─────► stream{true}? ─► QueueReady × n ─► Finalize(queue)
//! run_batch(docs) ─► cancel batch timers ─► stream{true}? ─► Stage(0) × n ─► Finalize(batch)
//!
//! advance_to(t):
//!   while timer due ≤ t:
//!     QueueReady  ─► status{ready}
//!     Stage(k)    ─► stages::next_action ─► status ─► Stage(k+1) | Recovery | done
//!     Recovery    ─► status{ready, msg} ─► status{delivered}
//!     Finalize    ─► stream{false} once no other finalize is pending
//! ```
//!
//! ## Rules
//! - Every event is published synchronously, in firing order.
//! - `stream{true}` precedes the first status of an invocation; the last
//!   pending finalize emits `stream{false}`.
//! - A new batch silently drops every pending stage, recovery and batch
//!   finalize timer. Queue timers always run to completion.
//! - Entry points never fail: empty input produces one info toast.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use signflow::{Engine, EngineConfig, RawRecord, Recorder, ScriptedRandom, WorkflowStatus, ingest};
//!
//! let recorder = Arc::new(Recorder::new());
//! let mut engine = Engine::builder(EngineConfig::default())
//!     .with_random(ScriptedRandom::constant(0.5))
//!     .with_subscribers(vec![recorder.clone()])
//!     .build()
//!     .unwrap();
//!
//! let docs = ingest([RawRecord::new("EMP001", "a.pdf")]);
//! engine.run_batch(&docs);
//! engine.run_until_idle();
//!
//! assert_eq!(
//!     recorder.statuses_of("EMP001-a.pdf"),
//!     vec![WorkflowStatus::Ready, WorkflowStatus::Signing, WorkflowStatus::Routed, WorkflowStatus::Delivered]
//! );
//! assert_eq!(recorder.stream_values(), vec![true, false]);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::EngineConfig;
use crate::core::activity::ActivityTracker;
use crate::core::builder::EngineBuilder;
use crate::core::stages::{self, NextStep, RecoveryStep, WorkItem};
use crate::core::timers::TimerQueue;
use crate::documents::{Document, WorkflowStatus};
use crate::events::{Bus, Event, SubscriptionId, ToastVariant};
use crate::policies::{RandomSource, ThreadRandom};
use crate::subscribers::Subscribe;

/// Toast published when `queue` receives no documents.
pub const EMPTY_QUEUE_MESSAGE: &str = "No documents matched the current filters.";
/// Toast published when `run_batch` receives no documents.
pub const EMPTY_BATCH_MESSAGE: &str = "Nothing queued for signing.";
/// Context message of a manual resolution.
pub const MANUAL_RESOLUTION_MESSAGE: &str = "Manual remediation complete.";

/// Which entry point scheduled a finalize timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Invocation {
    Queue,
    Batch,
}

/// Pending timed work.
#[derive(Debug)]
enum Action {
    QueueReady { id: String },
    Stage { item: Arc<WorkItem>, stage: usize },
    Recovery { item: Arc<WorkItem>, step: RecoveryStep },
    Finalize { invocation: Invocation },
}

impl Action {
    fn belongs_to_batch(&self) -> bool {
        match self {
            Action::QueueReady { .. } => false,
            Action::Stage { .. } | Action::Recovery { .. } => true,
            Action::Finalize { invocation } => *invocation == Invocation::Batch,
        }
    }

    fn is_finalize(&self) -> bool {
        matches!(self, Action::Finalize { .. })
    }
}

/// Single-threaded workflow engine.
pub struct Engine {
    cfg: EngineConfig,
    bus: Bus,
    timers: TimerQueue<Action>,
    activity: ActivityTracker,
    rng: Box<dyn RandomSource>,
}

impl Engine {
    /// Creates an engine with thread-local randomness and no subscribers.
    ///
    /// The config is used as-is; use [`Engine::builder`] to validate it.
    pub fn new(cfg: EngineConfig) -> Self {
        Self::from_parts(cfg, Box::new(ThreadRandom), Bus::new())
    }

    /// Returns a builder for an engine with custom randomness or subscribers.
    pub fn builder(cfg: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(cfg)
    }

    pub(crate) fn from_parts(cfg: EngineConfig, rng: Box<dyn RandomSource>, bus: Bus) -> Self {
        Self {
            cfg,
            bus,
            timers: TimerQueue::new(),
            activity: ActivityTracker::new(),
            rng,
        }
    }

    /// Registers a subscriber. Subscribing the same `Arc` twice returns the same id.
    pub fn subscribe(&mut self, subscriber: Arc<dyn Subscribe>) -> SubscriptionId {
        self.bus.subscribe(subscriber)
    }

    /// Removes a subscriber. Returns `false` if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Queue mode: moves every document straight to `ready`, staggered by index.
    pub fn queue(&mut self, docs: &[Document]) {
        if docs.is_empty() {
            self.publish(&Event::toast(ToastVariant::Info, EMPTY_QUEUE_MESSAGE));
            return;
        }
        self.set_active(true);

        for (index, doc) in docs.iter().enumerate() {
            let delay = stages::queue_delay(&self.cfg, index, self.rng.as_mut());
            debug!(id = %doc.id, delay_ms = delay.as_millis() as u64, "queue item scheduled");
            self.timers.schedule_in(delay, Action::QueueReady { id: doc.id.clone() });
        }
        self.schedule_finalize(Invocation::Queue, self.cfg.queue_finalize_delay(docs.len()));
    }

    /// Batch mode: runs every document through the full stage pipeline.
    ///
    /// Pending timers of a previous batch are dropped first.
    pub fn run_batch(&mut self, docs: &[Document]) {
        if docs.is_empty() {
            self.publish(&Event::toast(ToastVariant::Info, EMPTY_BATCH_MESSAGE));
            return;
        }

        let dropped = self.timers.cancel_where(Action::belongs_to_batch);
        if dropped > 0 {
            debug!(dropped, "previous batch superseded");
        }
        self.set_active(true);

        for (index, doc) in docs.iter().enumerate() {
            let offset = self.cfg.stagger_offset(index)
                + stages::stage_delay(&self.cfg, 0, self.rng.as_mut());
            debug!(id = %doc.id, delay_ms = offset.as_millis() as u64, "batch item scheduled");
            let item = Arc::new(WorkItem::from(doc));
            self.timers.schedule_in(offset, Action::Stage { item, stage: 0 });
        }
        self.schedule_finalize(Invocation::Batch, self.cfg.batch_finalize_delay(docs.len()));
    }

    /// Manually marks a document as ready again.
    ///
    /// Publishes immediately; no state checks, unknown ids are accepted and
    /// no timers or activity are touched.
    pub fn resolve_error(&self, id: &str) {
        self.publish(
            &Event::status(id, WorkflowStatus::Ready).with_message(MANUAL_RESOLUTION_MESSAGE),
        );
    }

    /// Fires every timer due within `by` from now. Returns the number fired.
    pub fn advance(&mut self, by: Duration) -> usize {
        self.advance_to(self.timers.now().saturating_add(by))
    }

    /// Fires every timer due at or before `t` and moves the clock to `t`.
    /// Returns the number fired.
    pub fn advance_to(&mut self, t: Duration) -> usize {
        let mut fired = 0;
        while let Some((_, action)) = self.timers.pop_due(t) {
            self.fire(action);
            fired += 1;
        }
        self.timers.set_now(t);
        fired
    }

    /// Fires timers until none is pending. Returns the number fired.
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.timers.next_deadline() {
            fired += self.advance_to(deadline);
        }
        fired
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Deadline of the next pending timer.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_active(&self) -> bool {
        self.activity.is_active()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    fn fire(&mut self, action: Action) {
        match action {
            Action::QueueReady { id } => {
                self.publish(&Event::status(id, WorkflowStatus::Ready));
            }
            Action::Stage { item, stage } => {
                let draw = stages::draws_fault(stage).then(|| self.rng.next_unit());
                let step = stages::next_action(&item, stage, draw, &self.cfg);
                self.publish(&step.emit);

                match step.next {
                    NextStep::Stage(next) => {
                        let delay = stages::stage_delay(&self.cfg, next, self.rng.as_mut());
                        self.timers.schedule_in(delay, Action::Stage { item, stage: next });
                    }
                    NextStep::Recover => {
                        debug!(id = %item.id, "fault injected, recovery scheduled");
                        let (delay, step) = RecoveryStep::start(&self.cfg);
                        self.timers.schedule_in(delay, Action::Recovery { item, step });
                    }
                    NextStep::Done => {}
                }
            }
            Action::Recovery { item, step } => {
                self.publish(&step.emit(&item));
                if let Some((delay, next)) = step.next(&self.cfg) {
                    self.timers.schedule_in(delay, Action::Recovery { item, step: next });
                }
            }
            Action::Finalize { invocation } => {
                if self.timers.any(Action::is_finalize) {
                    debug!(?invocation, "finalize deferred to a later invocation");
                } else {
                    self.set_active(false);
                }
            }
        }
    }

    fn schedule_finalize(&mut self, invocation: Invocation, delay: Duration) {
        debug!(?invocation, delay_ms = delay.as_millis() as u64, "finalize scheduled");
        self.timers.schedule_in(delay, Action::Finalize { invocation });
    }

    fn set_active(&mut self, active: bool) {
        if let Some(ev) = self.activity.set(active) {
            self.publish(&ev);
        }
    }

    fn publish(&self, event: &Event) {
        if let Some(change) = event.as_status() {
            debug!(id = %change.id, status = %change.status, "status emitted");
        }
        self.bus.publish(event);
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("now", &self.timers.now())
            .field("pending_timers", &self.timers.len())
            .field("active", &self.activity.is_active())
            .field("subscribers", &self.bus.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{RawRecord, ingest};
    use crate::policies::{ScriptedRandom, SeededRandom};
    use crate::subscribers::Recorder;

    use crate::documents::WorkflowStatus::{Delivered, Error, Ready, Routed, Signing};

    fn docs(ids: &[&str]) -> Vec<Document> {
        ingest(ids.iter().map(|id| {
            let mut r = RawRecord::new("EMP", *id);
            r.insurer = "LINK4".into();
            r
        }))
    }

    fn engine(rng: impl RandomSource) -> (Engine, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::new());
        let engine = Engine::builder(EngineConfig::default())
            .with_random(rng)
            .with_subscribers(vec![recorder.clone()])
            .build()
            .unwrap();
        (engine, recorder)
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_queue_with_zero_jitter() {
        let (mut engine, rec) = engine(ScriptedRandom::constant(0.0));
        engine.queue(&docs(&["a", "b"]));
        assert_eq!(rec.events(), vec![Event::stream(true)]);

        engine.advance(ms(119));
        assert_eq!(rec.statuses(), vec![("EMP-a".to_string(), Ready)]);

        engine.run_until_idle();
        assert_eq!(
            rec.events(),
            vec![
                Event::stream(true),
                Event::status("EMP-a", Ready),
                Event::status("EMP-b", Ready),
                Event::stream(false),
            ]
        );
        assert_eq!(engine.now(), ms(880));
        assert!(!engine.is_active());
    }

    #[test]
    fn test_empty_inputs_only_toast() {
        let (mut engine, rec) = engine(ScriptedRandom::constant(0.0));
        engine.queue(&[]);
        engine.run_batch(&[]);

        assert_eq!(
            rec.events(),
            vec![
                Event::toast(ToastVariant::Info, EMPTY_QUEUE_MESSAGE),
                Event::toast(ToastVariant::Info, EMPTY_BATCH_MESSAGE),
            ]
        );
        assert_eq!(engine.pending_timers(), 0);
        assert!(!engine.is_active());
    }

    #[test]
    fn test_batch_happy_path_timeline() {
        let (mut engine, rec) = engine(ScriptedRandom::constant(0.5));
        engine.run_batch(&docs(&["a"]));

        let mut seen = Vec::new();
        while let Some(deadline) = engine.next_deadline() {
            engine.advance_to(deadline);
            if let Some(last) = rec.events().last() {
                seen.push((deadline, last.clone()));
            }
        }

        assert_eq!(
            seen,
            vec![
                (ms(650), Event::status("EMP-a", Ready)),
                (ms(1500), Event::status("EMP-a", Signing)),
                (ms(2550), Event::status("EMP-a", Routed)),
                (ms(3700), Event::status("EMP-a", Delivered)),
                (ms(6200), Event::stream(false)),
            ]
        );
    }

    #[test]
    fn test_batch_fault_path() {
        let (mut engine, rec) = engine(ScriptedRandom::new([0.0, 0.0, 0.0, 0.05]));
        engine.run_batch(&docs(&["a"]));
        engine.run_until_idle();

        assert_eq!(rec.statuses_of("EMP-a"), vec![Ready, Signing, Error, Ready, Delivered]);

        let changes: Vec<_> = rec
            .events()
            .iter()
            .filter_map(Event::as_status)
            .cloned()
            .collect();
        let error_msg = changes[2].message().unwrap();
        assert!(error_msg.contains("LINK4"));
        let recovered = changes[3].message().unwrap();
        assert!(recovered.contains("LINK4"));
        assert!(recovered.contains("ready after remediation"));
        assert_eq!(changes[4].message(), None);
        assert_eq!(rec.stream_values(), vec![true, false]);
    }

    #[test]
    fn test_fault_timeline_offsets() {
        let (mut engine, rec) = engine(ScriptedRandom::new([0.0, 0.0, 0.0, 0.05]));
        engine.run_batch(&docs(&["a"]));

        engine.advance(ms(2100));
        assert_eq!(rec.statuses_of("EMP-a"), vec![Ready, Signing, Error]);
        engine.advance(ms(1599));
        assert_eq!(rec.statuses_of("EMP-a").len(), 3);
        engine.advance(ms(1));
        assert_eq!(rec.statuses_of("EMP-a").len(), 4);
        engine.advance(ms(900));
        assert_eq!(rec.statuses_of("EMP-a").last(), Some(&Delivered));
    }

    #[test]
    fn test_resolve_error_standalone() {
        let (engine, rec) = engine(ScriptedRandom::constant(0.0));
        engine.resolve_error("EMP-zzz");

        let events = rec.events();
        assert_eq!(events.len(), 1);
        let change = events[0].as_status().unwrap();
        assert_eq!(change.id, "EMP-zzz");
        assert_eq!(change.status, Ready);
        assert_eq!(change.message(), Some(MANUAL_RESOLUTION_MESSAGE));
        assert_eq!(engine.pending_timers(), 0);
    }

    #[test]
    fn test_second_batch_cancels_first() {
        let (mut engine, rec) = engine(ScriptedRandom::constant(0.5));
        engine.run_batch(&docs(&["a", "b"]));
        engine.advance(ms(700));
        assert_eq!(rec.statuses(), vec![("EMP-a".to_string(), Ready)]);

        engine.run_batch(&docs(&["c"]));
        engine.run_until_idle();

        assert_eq!(rec.statuses_of("EMP-a"), vec![Ready]);
        assert!(rec.statuses_of("EMP-b").is_empty());
        assert_eq!(rec.statuses_of("EMP-c"), vec![Ready, Signing, Routed, Delivered]);
        assert_eq!(rec.stream_values(), vec![true, false]);
        assert_eq!(engine.now(), ms(700 + 6200));
    }

    #[test]
    fn test_second_batch_cancels_recovery() {
        let (mut engine, rec) = engine(ScriptedRandom::new([0.0, 0.0, 0.0, 0.05]));
        engine.run_batch(&docs(&["a"]));
        engine.advance(ms(2200));
        assert_eq!(rec.statuses_of("EMP-a"), vec![Ready, Signing, Error]);

        engine.run_batch(&docs(&["b"]));
        engine.run_until_idle();

        assert_eq!(rec.statuses_of("EMP-a"), vec![Ready, Signing, Error]);
        assert_eq!(rec.statuses_of("EMP-b").last(), Some(&Delivered));
        assert_eq!(rec.stream_values(), vec![true, false]);
        assert_eq!(engine.now(), ms(2200 + 6200));
    }

    #[test]
    fn test_advance_saturates_clock() {
        let (mut engine, rec) = engine(ScriptedRandom::constant(0.5));
        engine.queue(&docs(&["a"]));
        engine.advance(Duration::MAX);

        assert_eq!(engine.now(), Duration::MAX);
        assert_eq!(rec.stream_values(), vec![true, false]);
        engine.advance(ms(1));
        assert_eq!(engine.now(), Duration::MAX);
    }

    #[test]
    fn test_batch_does_not_cancel_queue() {
        let (mut engine, rec) = engine(ScriptedRandom::constant(0.5));
        engine.queue(&docs(&["q"]));
        engine.run_batch(&docs(&["b"]));
        engine.run_until_idle();

        assert_eq!(rec.statuses_of("EMP-q"), vec![Ready]);
        assert_eq!(rec.statuses_of("EMP-b"), vec![Ready, Signing, Routed, Delivered]);
    }

    #[test]
    fn test_overlapping_invocations_end_once() {
        let (mut engine, rec) = engine(ScriptedRandom::constant(0.5));
        engine.run_batch(&docs(&["b"]));
        engine.queue(&docs(&["q"]));

        engine.advance(ms(1000));
        assert!(engine.is_active());

        engine.run_until_idle();
        let events = rec.events();
        assert_eq!(rec.stream_values(), vec![true, false]);
        assert_eq!(events.first(), Some(&Event::stream(true)));
        assert_eq!(events.last(), Some(&Event::stream(false)));
    }

    #[test]
    fn test_stream_values_alternate() {
        let (mut engine, rec) = engine(SeededRandom::new(3));
        engine.queue(&docs(&["a"]));
        engine.queue(&docs(&["b"]));
        engine.run_until_idle();
        engine.run_batch(&docs(&["c", "d"]));
        engine.advance(ms(100));
        engine.run_batch(&docs(&["e"]));
        engine.run_until_idle();

        let values = rec.stream_values();
        assert!(values.windows(2).all(|w| w[0] != w[1]));
        assert_eq!(values, vec![true, false, true, false]);
    }

    #[test]
    fn test_seeded_batch_every_document_delivered() {
        let (mut engine, rec) = engine(SeededRandom::new(42));
        let ids: Vec<String> = (0..20).map(|i| format!("doc{i}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        engine.run_batch(&docs(&refs));
        engine.run_until_idle();

        for id in &ids {
            let seq = rec.statuses_of(&format!("EMP-{id}"));
            let happy = vec![Ready, Signing, Routed, Delivered];
            let faulted = vec![Ready, Signing, Error, Ready, Delivered];
            assert!(seq == happy || seq == faulted, "{id}: {seq:?}");
        }
        assert_eq!(rec.events().last(), Some(&Event::stream(false)));
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let (mut engine, rec) = engine(ScriptedRandom::constant(0.0));
        let other = Arc::new(Recorder::new());
        let id = engine.subscribe(other.clone());
        assert_eq!(engine.subscribe(other.clone()), id);

        engine.resolve_error("x");
        assert!(engine.unsubscribe(id));
        engine.resolve_error("y");

        assert_eq!(other.events().len(), 1);
        assert_eq!(rec.events().len(), 2);
    }
}
