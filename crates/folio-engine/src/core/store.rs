//! Shared application state and its change notifications.
//!
//! One `Store` lives for the whole session and is handed by reference to
//! whatever needs it. Mutation only happens through the setters below; each
//! setter reports whether the value actually changed and, if so, notifies
//! subscribers synchronously before returning.

use serde::Serialize;

use crate::api::types::Phase;

/// Snapshot of everything the page shares between components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppState {
    pub phase: Phase,
    pub audio_enabled: bool,
    pub intro_complete: bool,
    pub prefers_reduced_motion: bool,
    /// Horizontal track progress in [0, 1].
    pub scroll_progress: f32,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            phase: Phase::INITIAL,
            audio_enabled: false,
            intro_complete: false,
            prefers_reduced_motion: false,
            scroll_progress: 0.0,
        }
    }
}

/// Which field a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateField {
    Phase,
    AudioEnabled,
    IntroComplete,
    PrefersReducedMotion,
    ScrollProgress,
}

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(&AppState, StateField)>;

pub struct Store {
    state: AppState,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u32,
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            state,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Register a listener called after every effective change.
    pub fn subscribe(&mut self, listener: impl FnMut(&AppState, StateField) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self, field: StateField) {
        let state = self.state;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&state, field);
        }
    }

    // -- Phase --

    /// Set the phase unconditionally. Callers are responsible for validity.
    pub fn set_phase(&mut self, phase: Phase) -> bool {
        if self.state.phase == phase {
            return false;
        }
        log::info!("phase: {} -> {}", self.state.phase.name(), phase.name());
        self.state.phase = phase;
        self.notify(StateField::Phase);
        true
    }

    /// Advance one phase. No-op at the terminal phase.
    pub fn next_phase(&mut self) -> bool {
        match self.state.phase.next() {
            Some(next) => self.set_phase(next),
            None => false,
        }
    }

    /// Jump straight to the curriculum from wherever the intro is.
    pub fn skip_intro(&mut self) -> bool {
        self.set_phase(Phase::Curriculum)
    }

    // -- Flags --

    pub fn set_audio_enabled(&mut self, enabled: bool) -> bool {
        if self.state.audio_enabled == enabled {
            return false;
        }
        self.state.audio_enabled = enabled;
        self.notify(StateField::AudioEnabled);
        true
    }

    pub fn set_intro_complete(&mut self, complete: bool) -> bool {
        if self.state.intro_complete == complete {
            return false;
        }
        self.state.intro_complete = complete;
        self.notify(StateField::IntroComplete);
        true
    }

    pub fn set_prefers_reduced_motion(&mut self, value: bool) -> bool {
        if self.state.prefers_reduced_motion == value {
            return false;
        }
        self.state.prefers_reduced_motion = value;
        self.notify(StateField::PrefersReducedMotion);
        true
    }

    pub fn set_scroll_progress(&mut self, progress: f32) -> bool {
        if self.state.scroll_progress == progress {
            return false;
        }
        self.state.scroll_progress = progress;
        self.notify(StateField::ScrollProgress);
        true
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
