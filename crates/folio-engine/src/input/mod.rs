pub mod eggs;
pub mod keys;
pub mod queue;

pub use eggs::{EasterEggs, KeyOutcome, KeySequenceState, KONAMI_SEQUENCE, MATRIX_WORD};
pub use keys::{Key, Modifiers};
pub use queue::{InputEvent, InputQueue};
