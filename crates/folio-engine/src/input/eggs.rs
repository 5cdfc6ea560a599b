//! Hidden triggers: a ten-key sequence, a typed word and repeated avatar clicks.
//!
//! Key matching is a pure reducer over `(state, key)` so it can be driven
//! without any browser events. Display timing lives in [`EasterEggs`].

use crate::api::config::EggConfig;
use crate::api::types::EggKind;
use super::keys::Key;

pub const KONAMI_SEQUENCE: [Key; 10] = [
    Key::ArrowUp,
    Key::ArrowUp,
    Key::ArrowDown,
    Key::ArrowDown,
    Key::ArrowLeft,
    Key::ArrowRight,
    Key::ArrowLeft,
    Key::ArrowRight,
    Key::Char('b'),
    Key::Char('a'),
];

pub const MATRIX_WORD: &str = "matrix";

/// Progress through both key triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySequenceState {
    /// Index of the next expected key in [`KONAMI_SEQUENCE`].
    pub match_index: usize,
    /// Last letters typed, at most `MATRIX_WORD.len()` of them.
    pub buffer: String,
}

/// What a single key press completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    pub konami: bool,
    pub matrix: bool,
}

impl KeyOutcome {
    pub fn fired(self) -> Option<EggKind> {
        if self.konami {
            Some(EggKind::Konami)
        } else if self.matrix {
            Some(EggKind::Matrix)
        } else {
            None
        }
    }
}

/// Feed one key press through both detectors.
pub fn reduce(state: &KeySequenceState, key: Key) -> (KeySequenceState, KeyOutcome) {
    let mut outcome = KeyOutcome::default();

    let match_index = if key == KONAMI_SEQUENCE[state.match_index] {
        let next = state.match_index + 1;
        if next == KONAMI_SEQUENCE.len() {
            outcome.konami = true;
            0
        } else {
            next
        }
    } else if key == KONAMI_SEQUENCE[0] {
        // A fresh first key restarts the sequence instead of discarding it.
        1
    } else {
        0
    };

    let mut buffer = state.buffer.clone();
    if let Some(letter) = key.letter() {
        buffer.push(letter);
        if buffer.len() > MATRIX_WORD.len() {
            buffer.remove(0);
        }
        if buffer == MATRIX_WORD {
            outcome.matrix = true;
            buffer.clear();
        }
    }

    (KeySequenceState { match_index, buffer }, outcome)
}

/// Egg currently on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEgg {
    pub kind: EggKind,
    pub until_ms: f64,
}

/// Detector state plus which egg is showing and for how long.
#[derive(Debug, Clone)]
pub struct EasterEggs {
    config: EggConfig,
    keys: KeySequenceState,
    active: Option<ActiveEgg>,
    konami_unlocked: bool,
    avatar_clicks: u32,
    last_avatar_click_ms: Option<f64>,
}

impl EasterEggs {
    pub fn new(config: EggConfig) -> Self {
        Self {
            config,
            keys: KeySequenceState::default(),
            active: None,
            konami_unlocked: false,
            avatar_clicks: 0,
            last_avatar_click_ms: None,
        }
    }

    pub fn keys(&self) -> &KeySequenceState {
        &self.keys
    }

    pub fn on_key(&mut self, key: Key, now_ms: f64) -> Option<EggKind> {
        let (keys, outcome) = reduce(&self.keys, key);
        self.keys = keys;
        let fired = outcome.fired()?;
        if fired == EggKind::Konami {
            self.konami_unlocked = true;
        }
        self.trigger(fired, now_ms);
        Some(fired)
    }

    /// Count an avatar click. Clicks further apart than the reset window start over.
    pub fn on_avatar_click(&mut self, now_ms: f64) -> Option<EggKind> {
        if let Some(last) = self.last_avatar_click_ms {
            if now_ms - last > self.config.avatar_reset_ms {
                self.avatar_clicks = 0;
            }
        }
        self.last_avatar_click_ms = Some(now_ms);
        self.avatar_clicks += 1;
        if self.avatar_clicks >= self.config.avatar_clicks {
            self.avatar_clicks = 0;
            self.trigger(EggKind::Avatar, now_ms);
            return Some(EggKind::Avatar);
        }
        None
    }

    /// Show `kind`, replacing whatever is showing.
    pub fn trigger(&mut self, kind: EggKind, now_ms: f64) {
        let duration = match kind {
            EggKind::Konami => self.config.konami_ms,
            EggKind::Matrix => self.config.matrix_ms,
            EggKind::Avatar => self.config.avatar_ms,
        };
        if let Some(previous) = self.active {
            log::debug!("egg {} replaces {}", kind.name(), previous.kind.name());
        }
        log::info!("easter egg: {}", kind.name());
        self.active = Some(ActiveEgg { kind, until_ms: now_ms + duration });
    }

    /// Clear the active egg once its time is up. Returns the egg that expired.
    pub fn tick(&mut self, now_ms: f64) -> Option<EggKind> {
        if let Some(last) = self.last_avatar_click_ms {
            if now_ms - last > self.config.avatar_reset_ms {
                self.avatar_clicks = 0;
                self.last_avatar_click_ms = None;
            }
        }
        let active = self.active?;
        if now_ms >= active.until_ms {
            self.active = None;
            return Some(active.kind);
        }
        None
    }

    pub fn active(&self) -> Option<EggKind> {
        self.active.map(|a| a.kind)
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        self.active.map_or(0.0, |a| (a.until_ms - now_ms).max(0.0))
    }

    /// Stays set for the rest of the session once the sequence has been entered.
    pub fn konami_unlocked(&self) -> bool {
        self.konami_unlocked
    }

    pub fn avatar_clicks(&self) -> u32 {
        self.avatar_clicks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(state: &KeySequenceState, keys: &[Key]) -> (KeySequenceState, u32, u32) {
        let mut state = state.clone();
        let (mut konami, mut matrix) = (0, 0);
        for &key in keys {
            let (next, outcome) = reduce(&state, key);
            state = next;
            konami += outcome.konami as u32;
            matrix += outcome.matrix as u32;
        }
        (state, konami, matrix)
    }

    fn typed(text: &str) -> Vec<Key> {
        text.chars().map(|c| Key::parse(&c.to_string())).collect()
    }

    #[test]
    fn full_sequence_fires_once_and_resets() {
        let (state, konami, _) = feed(&KeySequenceState::default(), &KONAMI_SEQUENCE);
        assert_eq!(konami, 1);
        assert_eq!(state.match_index, 0);
    }

    #[test]
    fn wrong_key_in_the_middle_does_not_fire() {
        let mut keys = KONAMI_SEQUENCE.to_vec();
        keys[5] = Key::Char('x');
        let (_, konami, _) = feed(&KeySequenceState::default(), &keys);
        assert_eq!(konami, 0);
    }

    #[test]
    fn first_key_restarts_at_one() {
        let (state, _, _) = feed(&KeySequenceState::default(), &KONAMI_SEQUENCE[..4]);
        assert_eq!(state.match_index, 4);
        let (state, _) = reduce(&state, Key::ArrowUp);
        assert_eq!(state.match_index, 1);
        // Completing from the restart fires.
        let (_, konami, _) = feed(&state, &KONAMI_SEQUENCE[1..]);
        assert_eq!(konami, 1);
    }

    #[test]
    fn other_mismatches_reset_to_zero() {
        let (state, _, _) = feed(&KeySequenceState::default(), &KONAMI_SEQUENCE[..6]);
        let (state, _) = reduce(&state, Key::ArrowDown);
        assert_eq!(state.match_index, 0);
    }

    #[test]
    fn third_up_keeps_partial_progress() {
        // Up, Up, Up: the third press mismatches "Down" but restarts at one.
        let (state, _, _) = feed(&KeySequenceState::default(), &[Key::ArrowUp; 3]);
        assert_eq!(state.match_index, 1);
    }

    #[test]
    fn uppercase_letters_complete_the_sequence() {
        let mut keys = KONAMI_SEQUENCE[..8].to_vec();
        keys.push(Key::parse("B"));
        keys.push(Key::parse("A"));
        let (_, konami, _) = feed(&KeySequenceState::default(), &keys);
        assert_eq!(konami, 1);
    }

    #[test]
    fn matrix_found_inside_longer_stream() {
        let (state, _, matrix) = feed(&KeySequenceState::default(), &typed("the MaTrIx has you"));
        assert_eq!(matrix, 1);
        assert!(state.buffer.len() <= 6);
    }

    #[test]
    fn matrix_fires_once_per_occurrence() {
        let (_, _, matrix) = feed(&KeySequenceState::default(), &typed("matrixmatrix"));
        assert_eq!(matrix, 2);
        let (_, _, matrix) = feed(&KeySequenceState::default(), &typed("matri"));
        assert_eq!(matrix, 0);
    }

    #[test]
    fn non_letters_do_not_touch_the_buffer() {
        let mut keys = typed("mat");
        keys.push(Key::ArrowLeft);
        keys.push(Key::parse("1"));
        keys.extend(typed("rix"));
        let (_, _, matrix) = feed(&KeySequenceState::default(), &keys);
        assert_eq!(matrix, 1);
    }

    #[test]
    fn last_trigger_wins_with_its_own_duration() {
        let mut eggs = EasterEggs::new(EggConfig::default());
        for key in typed("matrix") {
            eggs.on_key(key, 0.0);
        }
        assert_eq!(eggs.active(), Some(EggKind::Matrix));
        eggs.tick(1000.0);
        for key in KONAMI_SEQUENCE {
            eggs.on_key(key, 1000.0);
        }
        assert_eq!(eggs.active(), Some(EggKind::Konami));
        assert!(eggs.konami_unlocked());
        // The matrix deadline (10000) must not cut the konami display short.
        assert_eq!(eggs.tick(8999.0), None);
        assert_eq!(eggs.remaining_ms(8999.0), 1.0);
        assert_eq!(eggs.tick(9000.0), Some(EggKind::Konami));
        assert_eq!(eggs.active(), None);
        assert!(eggs.konami_unlocked());
    }

    #[test]
    fn avatar_needs_five_quick_clicks() {
        let mut eggs = EasterEggs::new(EggConfig::default());
        for i in 0..4 {
            assert_eq!(eggs.on_avatar_click(i as f64 * 500.0), None);
        }
        assert_eq!(eggs.on_avatar_click(2000.0), Some(EggKind::Avatar));
        assert_eq!(eggs.avatar_clicks(), 0);
        assert_eq!(eggs.tick(5999.0), None);
        assert_eq!(eggs.tick(6000.0), Some(EggKind::Avatar));
    }

    #[test]
    fn slow_avatar_clicks_start_over() {
        let mut eggs = EasterEggs::new(EggConfig::default());
        for i in 0..4 {
            eggs.on_avatar_click(i as f64 * 100.0);
        }
        eggs.tick(3000.0);
        assert_eq!(eggs.avatar_clicks(), 0);
        assert_eq!(eggs.on_avatar_click(3000.0), None);
        assert_eq!(eggs.avatar_clicks(), 1);
    }
}
