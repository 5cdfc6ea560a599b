//! Timed progression through the intro phases.
//!
//! ```text
//! EMERGENCE --3000ms--> CONVERGENCE --2000ms--> CENTRAL_BUBBLE --click--> EXPLOSION --1000ms--> CURRICULUM
//!     any phase --skip / reduced motion--> CURRICULUM
//! ```
//!
//! The sequencer watches the store's phase the way a subscriber would: after
//! anything touches the store, [`PhaseSequencer::sync`] re-arms its single
//! timer for whatever phase is now current.

use crate::api::config::PhaseDurations;
use crate::api::types::Phase;
use crate::core::store::Store;
use super::timer::{PendingTransition, TransitionSlot};

#[derive(Debug)]
pub struct PhaseSequencer {
    durations: PhaseDurations,
    slot: TransitionSlot,
    /// Phase the current timer was armed for.
    observed: Option<Phase>,
    mounted: bool,
}

impl PhaseSequencer {
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            durations,
            slot: TransitionSlot::new(),
            observed: None,
            mounted: false,
        }
    }

    /// How long a phase lasts before advancing on its own.
    pub fn duration_for(&self, phase: Phase) -> Option<f64> {
        match phase {
            Phase::Emergence => Some(self.durations.emergence_ms),
            Phase::Convergence => Some(self.durations.convergence_ms),
            Phase::Explosion => Some(self.durations.explosion_ms),
            Phase::Entry | Phase::CentralBubble | Phase::Curriculum => None,
        }
    }

    /// Start driving the store. `reduced_motion` is the media query's current value.
    pub fn mount(&mut self, store: &mut Store, reduced_motion: bool, now_ms: f64) {
        self.mounted = true;
        self.observed = None;
        if store.phase() == Phase::Entry {
            store.set_phase(Phase::Emergence);
        }
        self.set_reduced_motion(store, reduced_motion, now_ms);
        self.sync(store, now_ms);
    }

    /// Stop driving the store and drop any pending timer.
    pub fn unmount(&mut self) {
        self.slot.cancel();
        self.observed = None;
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn pending(&self) -> Option<&PendingTransition> {
        self.slot.pending()
    }

    /// Reconcile the timer with the store.
    ///
    /// Reduced motion disables every timer and forces the curriculum. Otherwise,
    /// when the phase differs from the one the timer was armed for, the old
    /// timer is cancelled and a new one armed from `now_ms`.
    pub fn sync(&mut self, store: &mut Store, now_ms: f64) {
        if !self.mounted {
            return;
        }
        if store.state().prefers_reduced_motion {
            self.slot.cancel();
            store.skip_intro();
            self.observed = Some(store.phase());
            return;
        }
        let phase = store.phase();
        if self.observed == Some(phase) && (self.slot.is_armed() || self.duration_for(phase).is_none()) {
            return;
        }
        self.rearm(phase, now_ms);
    }

    fn rearm(&mut self, phase: Phase, start_ms: f64) {
        self.slot.cancel();
        self.observed = Some(phase);
        if let Some(duration) = self.duration_for(phase) {
            self.slot.schedule(phase, start_ms + duration);
        }
    }

    /// Fire every timer whose deadline is at or before `now_ms`.
    ///
    /// Each follow-up timer is armed from the previous deadline rather than from
    /// `now_ms`, so a long frame fires the same transitions a steady clock would.
    /// Returns the phase after the last transition, if any fired.
    pub fn advance(&mut self, store: &mut Store, now_ms: f64) -> Option<Phase> {
        if !self.mounted {
            return None;
        }
        self.sync(store, now_ms);
        let mut last = None;
        while let Some(fired) = self.slot.take_due(now_ms) {
            if store.phase() != fired.from {
                // The phase moved under us without a sync; the timer is stale.
                self.sync(store, now_ms);
                continue;
            }
            store.next_phase();
            let phase = store.phase();
            last = Some(phase);
            self.rearm(phase, fired.due_ms);
        }
        last
    }

    /// The central bubble was clicked. Only meaningful in CENTRAL_BUBBLE.
    pub fn click_central_bubble(&mut self, store: &mut Store, now_ms: f64) -> bool {
        if !self.mounted || store.phase() != Phase::CentralBubble {
            return false;
        }
        store.next_phase();
        self.sync(store, now_ms);
        true
    }

    /// Manual skip button.
    pub fn skip(&mut self, store: &mut Store, now_ms: f64) -> bool {
        let changed = store.skip_intro();
        self.sync(store, now_ms);
        changed
    }

    /// The OS motion preference changed (or was read at mount).
    pub fn set_reduced_motion(&mut self, store: &mut Store, matches: bool, now_ms: f64) {
        store.set_prefers_reduced_motion(matches);
        if matches {
            log::info!("reduced motion requested, skipping intro");
        }
        self.sync(store, now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::VirtualClock;

    fn mounted() -> (PhaseSequencer, Store, VirtualClock) {
        let mut seq = PhaseSequencer::new(PhaseDurations::default());
        let mut store = Store::new();
        let clock = VirtualClock::new();
        seq.mount(&mut store, false, clock.now_ms());
        (seq, store, clock)
    }

    #[test]
    fn full_scripted_run() {
        let (mut seq, mut store, mut clock) = mounted();
        assert_eq!(store.phase(), Phase::Emergence);

        seq.advance(&mut store, clock.advance(2999.0));
        assert_eq!(store.phase(), Phase::Emergence);
        seq.advance(&mut store, clock.advance(1.0));
        assert_eq!(store.phase(), Phase::Convergence);

        seq.advance(&mut store, clock.advance(2000.0));
        assert_eq!(store.phase(), Phase::CentralBubble);

        // Waits indefinitely for the click.
        seq.advance(&mut store, clock.advance(60_000.0));
        assert_eq!(store.phase(), Phase::CentralBubble);
        assert!(seq.pending().is_none());

        assert!(seq.click_central_bubble(&mut store, clock.now_ms()));
        assert_eq!(store.phase(), Phase::Explosion);

        seq.advance(&mut store, clock.advance(999.0));
        assert_eq!(store.phase(), Phase::Explosion);
        seq.advance(&mut store, clock.advance(1.0));
        assert_eq!(store.phase(), Phase::Curriculum);
        assert!(seq.pending().is_none());
    }

    #[test]
    fn long_frame_fires_chained_timers() {
        let (mut seq, mut store, mut clock) = mounted();
        let last = seq.advance(&mut store, clock.advance(10_000.0));
        assert_eq!(last, Some(Phase::CentralBubble));
        assert_eq!(store.phase(), Phase::CentralBubble);
    }

    #[test]
    fn click_outside_central_bubble_is_ignored() {
        let (mut seq, mut store, clock) = mounted();
        assert!(!seq.click_central_bubble(&mut store, clock.now_ms()));
        assert_eq!(store.phase(), Phase::Emergence);
    }

    #[test]
    fn reduced_motion_at_mount_skips() {
        let mut seq = PhaseSequencer::new(PhaseDurations::default());
        let mut store = Store::new();
        seq.mount(&mut store, true, 0.0);
        assert_eq!(store.phase(), Phase::Curriculum);
        assert!(seq.pending().is_none());
    }

    #[test]
    fn reduced_motion_mid_session_cancels_timer() {
        let (mut seq, mut store, mut clock) = mounted();
        seq.advance(&mut store, clock.advance(3500.0));
        assert_eq!(store.phase(), Phase::Convergence);
        assert!(seq.pending().is_some());

        seq.set_reduced_motion(&mut store, true, clock.now_ms());
        assert_eq!(store.phase(), Phase::Curriculum);
        assert!(seq.pending().is_none());
    }

    #[test]
    fn external_phase_change_rearms_single_timer() {
        let (mut seq, mut store, mut clock) = mounted();
        clock.advance(2500.0);
        // Someone jumps ahead directly through the store.
        store.set_phase(Phase::Explosion);
        seq.sync(&mut store, clock.now_ms());
        let pending = *seq.pending().unwrap();
        assert_eq!(pending.from, Phase::Explosion);
        assert_eq!(pending.due_ms, 3500.0);

        // The old emergence deadline (3000ms) must not advance anything.
        seq.advance(&mut store, clock.advance(600.0));
        assert_eq!(store.phase(), Phase::Explosion);
        seq.advance(&mut store, clock.advance(400.0));
        assert_eq!(store.phase(), Phase::Curriculum);
    }

    #[test]
    fn skip_goes_straight_to_curriculum() {
        let (mut seq, mut store, clock) = mounted();
        assert!(seq.skip(&mut store, clock.now_ms()));
        assert_eq!(store.phase(), Phase::Curriculum);
        assert!(seq.pending().is_none());
    }

    #[test]
    fn unmount_cancels_pending() {
        let (mut seq, mut store, mut clock) = mounted();
        seq.unmount();
        assert!(seq.pending().is_none());
        assert_eq!(seq.advance(&mut store, clock.advance(10_000.0)), None);
        assert_eq!(store.phase(), Phase::Emergence);
    }
}
