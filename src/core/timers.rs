//! # Virtual timer queue.
//!
//! [`TimerQueue`] owns every pending timed action of an engine and a logical
//! clock. Nothing here sleeps: time only moves when the owner asks for due
//! timers up to some instant, which lets tests fast-forward a whole batch and
//! lets the runtime driver map logical time onto a real clock.
//!
//! ## Rules
//! - Timers fire in deadline order; equal deadlines fire in insertion order.
//! - Deadlines in the past are clamped to `now` (they fire on the next pop).
//! - Cancelling only removes the timer; nothing is emitted.
//! - `now` never moves backwards.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

/// Identity of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Pending timers keyed by `(deadline, insertion sequence)`.
///
/// Cancelled entries stay in the heap and are skipped lazily.
#[derive(Debug)]
pub struct TimerQueue<A> {
    now: Duration,
    next_seq: u64,
    heap: BinaryHeap<Reverse<(Duration, u64)>>,
    pending: HashMap<u64, A>,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TimerQueue<A> {
    /// Creates an empty queue with the clock at zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            heap: BinaryHeap::new(),
            pending: HashMap::new(),
        }
    }

    /// Current logical time.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `action` to fire `delay` after now.
    pub fn schedule_in(&mut self, delay: Duration, action: A) -> TimerId {
        self.schedule_at(self.now.saturating_add(delay), action)
    }

    /// Schedules `action` at an absolute logical time (clamped to now).
    pub fn schedule_at(&mut self, deadline: Duration, action: A) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((deadline.max(self.now), seq)));
        self.pending.insert(seq, action);
        TimerId(seq)
    }

    /// Cancels one timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id.0).is_some()
    }

    /// Cancels every pending timer whose action matches `pred`.
    /// Returns the number of cancelled timers.
    ///
    /// Drops stale heap entries once they outnumber the live timers.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&A) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, action| !pred(action));
        if self.heap.len() > 2 * self.pending.len() {
            let pending = &self.pending;
            self.heap.retain(|Reverse((_, seq))| pending.contains_key(seq));
        }
        before - self.pending.len()
    }

    /// Returns true if any pending timer matches `pred`.
    pub fn any(&self, pred: impl FnMut(&A) -> bool) -> bool {
        self.pending.values().any(pred)
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.purge_cancelled_head();
        self.heap.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to
    /// its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, A)> {
        loop {
            let Reverse((deadline, seq)) = *self.heap.peek()?;
            if deadline > until {
                return None;
            }
            self.heap.pop();
            if let Some(action) = self.pending.remove(&seq) {
                self.now = self.now.max(deadline);
                return Some((TimerId(seq), action));
            }
        }
    }

    /// Moves the clock forward to `t` (never backwards).
    pub fn set_now(&mut self, t: Duration) {
        self.now = self.now.max(t);
    }

    /// Number of pending (not cancelled) timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if no timer is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn purge_cancelled_head(&mut self) {
        while let Some(Reverse((_, seq))) = self.heap.peek() {
            if self.pending.contains_key(seq) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn drain(q: &mut TimerQueue<&'static str>, until: Duration) -> Vec<&'static str> {
        let mut out = Vec::new();
        while let Some((_, a)) = q.pop_due(until) {
            out.push(a);
        }
        out
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule_in(ms(300), "c");
        q.schedule_in(ms(100), "a");
        q.schedule_in(ms(200), "b");

        assert_eq!(q.next_deadline(), Some(ms(100)));
        assert_eq!(drain(&mut q, ms(1000)), vec!["a", "b", "c"]);
        assert_eq!(q.now(), ms(300));
        assert!(q.is_empty());
    }

    #[test]
    fn test_ties_fire_in_insertion_order() {
        let mut q = TimerQueue::new();
        q.schedule_at(ms(50), "first");
        q.schedule_at(ms(50), "second");
        q.schedule_at(ms(50), "third");
        assert_eq!(drain(&mut q, ms(50)), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_pop_due_respects_until() {
        let mut q = TimerQueue::new();
        q.schedule_in(ms(100), "a");
        q.schedule_in(ms(500), "b");

        assert_eq!(drain(&mut q, ms(499)), vec!["a"]);
        assert_eq!(q.now(), ms(100));
        assert_eq!(q.len(), 1);
        q.set_now(ms(499));
        assert_eq!(q.now(), ms(499));
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut q = TimerQueue::new();
        let a = q.schedule_in(ms(10), "a");
        q.schedule_in(ms(20), "b");

        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert_eq!(q.next_deadline(), Some(ms(20)));
        assert_eq!(drain(&mut q, ms(100)), vec!["b"]);
    }

    #[test]
    fn test_cancel_where_filters_by_action() {
        let mut q = TimerQueue::new();
        q.schedule_in(ms(10), "batch");
        q.schedule_in(ms(20), "queue");
        q.schedule_in(ms(30), "batch");

        assert_eq!(q.cancel_where(|a| *a == "batch"), 2);
        assert!(q.any(|a| *a == "queue"));
        assert!(!q.any(|a| *a == "batch"));
        assert_eq!(drain(&mut q, ms(100)), vec!["queue"]);
    }

    #[test]
    fn test_cancel_where_compacts_heap() {
        let mut q = TimerQueue::new();
        for _ in 0..50 {
            for i in 0..10 {
                q.schedule_in(ms(100 + i), "batch");
            }
            q.cancel_where(|a| *a == "batch");
        }
        q.schedule_in(ms(5), "queue");

        assert_eq!(q.len(), 1);
        assert!(q.heap.len() <= 11);
        assert_eq!(drain(&mut q, ms(1000)), vec!["queue"]);
    }

    #[test]
    fn test_schedule_saturates_deadline() {
        let mut q = TimerQueue::new();
        q.set_now(ms(10));
        q.schedule_in(Duration::MAX, "far");
        assert_eq!(q.next_deadline(), Some(Duration::MAX));
        assert!(drain(&mut q, ms(1000)).is_empty());
    }

    #[test]
    fn test_past_deadline_clamped_to_now() {
        let mut q = TimerQueue::new();
        q.set_now(ms(1000));
        q.schedule_at(ms(10), "late");
        assert_eq!(q.next_deadline(), Some(ms(1000)));
        assert_eq!(drain(&mut q, ms(1000)), vec!["late"]);
        assert_eq!(q.now(), ms(1000));
    }
}
