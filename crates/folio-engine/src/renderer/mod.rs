pub mod instance;
pub mod palette;

pub use instance::{DrawBuffer, DrawInstance, DrawLayer, Shape};
pub use palette::{BackgroundTransition, Gradient, Rgb};
