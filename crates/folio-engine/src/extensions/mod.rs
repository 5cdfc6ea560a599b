// extensions/mod.rs
//
// Animation helpers shared by the scroll controller, the intro overlay and
// the background. No dependency on the store or the sequencer.

pub mod easing;
pub mod tween;

pub use easing::{Easing, ease, lerp, lerp_vec3, progress_between};
pub use tween::{Direction, Tween};
