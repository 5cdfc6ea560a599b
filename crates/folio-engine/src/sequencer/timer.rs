// sequencer/timer.rs
//
// Single-slot timer. Scheduling always replaces whatever was pending, so a
// stale transition from an earlier phase can never fire alongside a new one.

use crate::api::types::Phase;

/// A transition waiting on the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingTransition {
    /// Phase the timer was armed in. The timer only advances out of this phase.
    pub from: Phase,
    /// Absolute virtual time at which it fires.
    pub due_ms: f64,
}

#[derive(Debug, Default)]
pub struct TransitionSlot {
    pending: Option<PendingTransition>,
    armed: u64,
    cancelled: u64,
}

impl TransitionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot. Returns the transition it displaced, if any.
    pub fn schedule(&mut self, from: Phase, due_ms: f64) -> Option<PendingTransition> {
        let displaced = self.cancel();
        self.pending = Some(PendingTransition { from, due_ms });
        self.armed += 1;
        log::debug!("timer armed: leave {} at {:.0}ms", from.name(), due_ms);
        displaced
    }

    pub fn cancel(&mut self) -> Option<PendingTransition> {
        let cancelled = self.pending.take();
        if let Some(t) = &cancelled {
            self.cancelled += 1;
            log::debug!("timer cancelled: leave {} at {:.0}ms", t.from.name(), t.due_ms);
        }
        cancelled
    }

    /// Take the pending transition if its deadline has passed.
    pub fn take_due(&mut self, now_ms: f64) -> Option<PendingTransition> {
        match self.pending {
            Some(t) if t.due_ms <= now_ms => self.pending.take(),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingTransition> {
        self.pending.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Timers armed over the slot's lifetime.
    pub fn armed_count(&self) -> u64 {
        self.armed
    }

    /// Timers cancelled before firing.
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}
