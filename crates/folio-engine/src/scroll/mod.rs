pub mod controller;
pub mod geometry;
pub mod nav;
pub mod reveal;

pub use controller::ScrollController;
pub use geometry::{PageLayout, PanelLayout, Span, TrackGeometry};
pub use nav::{NavRequest, Navigator, Section};
pub use reveal::{PanelPose, PanelReveal, Pose, ScrubBinding};
