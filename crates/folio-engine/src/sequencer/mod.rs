pub mod phase;
pub mod timer;

pub use phase::PhaseSequencer;
pub use timer::{PendingTransition, TransitionSlot};
