// effects/mod.rs
//
// Canvas-free particle simulation. Every scene is a fixed pool stepped in
// frames (1.0 = one 60 Hz frame) and drawn into a DrawBuffer.

pub mod bubbles;
pub mod dust;
pub mod eggs;
pub mod rng;
pub mod sea;

use glam::Vec2;

use crate::api::config::{DustConfig, SeaConfig};
use crate::api::types::Phase;
use crate::renderer::instance::{DrawBuffer, DrawLayer};

pub use bubbles::{Explosion, IntroBubble, IntroScene, MergedBubble};
pub use dust::{Particle, ParticleField};
pub use eggs::{DigitalRain, GlassBubbles};
pub use rng::Rng;
pub use sea::SeaScene;

/// Which backdrop the canvas shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Ambient,
    Underwater,
}

impl RenderMode {
    pub fn for_phase(phase: Phase) -> RenderMode {
        if phase == Phase::Curriculum {
            RenderMode::Ambient
        } else {
            RenderMode::Underwater
        }
    }
}

/// The full-screen canvas backdrop. Both pools are allocated at mount and
/// live until unmount; switching mode only changes which one is stepped.
#[derive(Debug, Clone)]
pub struct Backdrop {
    mode: RenderMode,
    dust: ParticleField,
    sea: SeaScene,
    rng: Rng,
    running: bool,
    frames: u64,
}

impl Backdrop {
    pub fn mount(dust: &DustConfig, sea: &SeaConfig, bounds: Vec2, mode: RenderMode, seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let dust = ParticleField::dust(dust.count, bounds, dust.wrap_margin, &mut rng);
        let sea = SeaScene::new(sea, bounds, &mut rng);
        log::debug!("backdrop mounted {}x{} in {:?} mode", bounds.x, bounds.y, mode);
        Self {
            mode,
            dust,
            sea,
            rng,
            running: true,
            frames: 0,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        if self.mode != mode {
            log::debug!("backdrop mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames stepped since mount.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn bounds(&self) -> Vec2 {
        self.dust.bounds()
    }

    pub fn resize(&mut self, bounds: Vec2) {
        self.dust.resize(bounds);
        self.sea.resize(bounds);
    }

    pub fn step(&mut self, frames: f32) {
        if !self.running {
            return;
        }
        match self.mode {
            RenderMode::Ambient => self.dust.step(frames),
            RenderMode::Underwater => self.sea.step(frames, &mut self.rng),
        }
        self.frames += 1;
    }

    pub fn draw(&self, buffer: &mut DrawBuffer) {
        if !self.running {
            return;
        }
        match self.mode {
            RenderMode::Ambient => self.dust.draw(buffer, DrawLayer::Backdrop),
            RenderMode::Underwater => self.sea.draw(buffer),
        }
    }

    /// Stop stepping and drawing. Further calls are no-ops.
    pub fn unmount(&mut self) {
        if self.running {
            log::debug!("backdrop unmounted after {} frames", self.frames);
        }
        self.running = false;
    }

    pub fn dust(&self) -> &ParticleField {
        &self.dust
    }

    pub fn sea(&self) -> &SeaScene {
        &self.sea
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backdrop(mode: RenderMode) -> Backdrop {
        Backdrop::mount(&DustConfig::default(), &SeaConfig::default(), Vec2::new(800.0, 600.0), mode, 7)
    }

    #[test]
    fn mode_follows_phase() {
        assert_eq!(RenderMode::for_phase(Phase::Emergence), RenderMode::Underwater);
        assert_eq!(RenderMode::for_phase(Phase::Explosion), RenderMode::Underwater);
        assert_eq!(RenderMode::for_phase(Phase::Curriculum), RenderMode::Ambient);
    }

    #[test]
    fn ambient_draws_one_dot_per_particle() {
        let mut b = backdrop(RenderMode::Ambient);
        b.step(1.0);
        let mut buffer = DrawBuffer::default();
        b.draw(&mut buffer);
        // Zero-alpha dots are skipped by the buffer.
        assert!(buffer.len() <= 80);
        assert!(buffer.len() > 40);
    }

    #[test]
    fn resize_keeps_pools() {
        let mut b = backdrop(RenderMode::Underwater);
        let sea_bubbles = b.sea().bubbles().len();
        b.resize(Vec2::new(320.0, 480.0));
        assert_eq!(b.bounds(), Vec2::new(320.0, 480.0));
        assert_eq!(b.dust().particles().len(), 80);
        assert_eq!(b.sea().bubbles().len(), sea_bubbles);
    }

    #[test]
    fn unmount_stops_the_loop() {
        let mut b = backdrop(RenderMode::Ambient);
        b.step(1.0);
        b.unmount();
        let before: Vec<_> = b.dust().particles().to_vec();
        b.step(1.0);
        assert_eq!(b.dust().particles(), &before[..]);
        let mut buffer = DrawBuffer::default();
        b.draw(&mut buffer);
        assert!(buffer.is_empty());
        assert_eq!(b.frames(), 1);
    }
}
