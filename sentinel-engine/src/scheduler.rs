//! Discrete-event action queue over a virtual clock.
//!
//! The recurring generator and every per-event heal live in one priority
//! queue ordered by `(due, seq)`. `seq` is the insertion order, so actions
//! due at the same instant fire in the order they were scheduled. Nothing
//! here touches fleet state; the session pops actions and applies them.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::event::EventId;

/// Work the session performs when an entry comes due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Produce the next failure event and re-arm the generator.
    Generate,
    /// Resolve one specific event.
    Heal(EventId),
}

impl Action {
    #[must_use]
    pub const fn is_generate(&self) -> bool {
        matches!(self, Self::Generate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scheduled {
    due: u64,
    seq: u64,
    action: Action,
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Time-ordered queue of pending generator ticks and heals.
#[derive(Debug, Clone)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Scheduled>>,
    now: u64,
    next_seq: u64,
    running: bool,
    tick_interval: u64,
    heal_delay: u64,
}

impl Scheduler {
    #[must_use]
    pub fn new(tick_interval: u64, heal_delay: u64) -> Self {
        Self {
            queue: BinaryHeap::new(),
            now: 0,
            next_seq: 0,
            running: false,
            tick_interval: tick_interval.max(1),
            heal_delay: heal_delay.max(1),
        }
    }

    /// Current virtual instant.
    #[must_use]
    pub const fn now(&self) -> u64 {
        self.now
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub const fn tick_interval(&self) -> u64 {
        self.tick_interval
    }

    #[must_use]
    pub const fn heal_delay(&self) -> u64 {
        self.heal_delay
    }

    /// Arm the generator one interval from now. Returns false if it was
    /// already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.schedule_generate();
        true
    }

    /// Disarm the generator. Queued heals stay unless `cancel_heals` is set.
    /// Returns false if it was already stopped.
    pub fn stop(&mut self, cancel_heals: bool) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        if cancel_heals {
            self.queue.clear();
        } else {
            self.queue.retain(|Reverse(entry)| !entry.action.is_generate());
        }
        true
    }

    /// Queue the next generator tick, one interval from now.
    pub fn schedule_generate(&mut self) {
        let due = self.now.saturating_add(self.tick_interval);
        self.push(due, Action::Generate);
    }

    /// Queue the heal of `event_id`, one heal delay from now.
    pub fn schedule_heal(&mut self, event_id: EventId) {
        let due = self.now.saturating_add(self.heal_delay);
        self.push(due, Action::Heal(event_id));
    }

    fn push(&mut self, due: u64, action: Action) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.queue.push(Reverse(Scheduled { due, seq, action }));
    }

    /// Instant of the earliest pending action.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Pop the earliest action due at or before `until`, moving the clock to
    /// its due instant.
    pub fn pop_due(&mut self, until: u64) -> Option<Action> {
        let due = self.next_due()?;
        if due > until {
            return None;
        }
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some(entry.action)
    }

    /// Move the clock forward without firing anything.
    pub fn advance_clock(&mut self, instant: u64) {
        self.now = self.now.max(instant);
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn pending_heals(&self) -> usize {
        self.queue
            .iter()
            .filter(|Reverse(entry)| matches!(entry.action, Action::Heal(_)))
            .count()
    }
}
