pub mod api;
pub mod core;
pub mod sequencer;
pub mod effects;
pub mod renderer;
pub mod scroll;
pub mod input;
pub mod prefs;
pub mod extensions;
pub mod experience;

// Re-export key types at crate root for convenience
pub use api::config::{DustConfig, EggConfig, ExperienceConfig, IntroBubbleConfig, PhaseDurations, SeaConfig};
pub use api::types::{AudioCommand, EggKind, Phase, Sfx, Viewport};
pub use core::store::{AppState, ListenerId, StateField, Store};
pub use core::time::{FrameClock, VirtualClock};
pub use sequencer::{PendingTransition, PhaseSequencer, TransitionSlot};
pub use effects::{Backdrop, DigitalRain, GlassBubbles, IntroScene, RenderMode, Rng};
pub use renderer::instance::{DrawBuffer, DrawInstance, DrawLayer, Shape};
pub use renderer::palette::{BackgroundTransition, Gradient, Rgb};
pub use scroll::{NavRequest, Navigator, PageLayout, PanelLayout, ScrollController, Section, Span, TrackGeometry};
pub use input::{EasterEggs, InputEvent, InputQueue, Key, Modifiers};
pub use prefs::{MemoryPreferences, PreferenceStore, Theme};
pub use experience::{Experience, FrameSnapshot};

// Extensions: decoupled animation helpers
pub use extensions::{Easing, Tween, ease, lerp};
