//! Deadline timers for tap confirmation and long-press detection.

use std::collections::{BTreeMap, HashMap};

use crate::sample::PointerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerPurpose {
    TapConfirm,
    LongPress,
}

/// Identifies one pending timer. `generation` is unique per machine, so a
/// timer left behind by a finished machine never fires into a newer machine
/// that reuses the same pointer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerKey {
    pub pointer: PointerId,
    pub generation: u64,
    pub purpose: TimerPurpose,
}

/// Timer service the detector schedules against. Firing is the host's job:
/// deliver due keys to [`GestureDetector::on_timer`](crate::GestureDetector::on_timer)
/// on the same thread that delivers touch input.
pub trait Scheduler {
    /// Arms `key` for `deadline`, replacing any pending deadline for the same key.
    fn schedule(&mut self, key: TimerKey, deadline: u64);
    /// Disarms `key`. Unknown or already fired keys are ignored.
    fn cancel(&mut self, key: TimerKey);
}

/// Virtual-clock timer queue ordered by deadline, then insertion order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    queue: BTreeMap<(u64, u64), TimerKey>,
    pending: HashMap<TimerKey, (u64, u64)>,
    seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, key: &TimerKey) -> bool {
        self.pending.contains_key(key)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes and returns the earliest timer whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: u64) -> Option<TimerKey> {
        let (&slot, _) = self.queue.iter().next()?;
        if slot.0 > now {
            return None;
        }
        let key = self.queue.remove(&slot)?;
        self.pending.remove(&key);
        Some(key)
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, key: TimerKey, deadline: u64) {
        if let Some(old) = self.pending.remove(&key) {
            self.queue.remove(&old);
        }
        let slot = (deadline, self.seq);
        self.seq += 1;
        self.queue.insert(slot, key);
        self.pending.insert(key, slot);
    }

    fn cancel(&mut self, key: TimerKey) {
        if let Some(slot) = self.pending.remove(&key) {
            self.queue.remove(&slot);
        }
    }
}
