//! Underwater scene: light shafts from the surface, rising bubbles, drifting
//! plankton and slow caustic light patches.
//!
//! All pools are sized once. Bubbles that float off the top are recycled in
//! place with fresh parameters.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::api::config::SeaConfig;
use crate::renderer::instance::{DrawBuffer, DrawInstance, DrawLayer, Shape};
use super::dust::ParticleField;
use super::rng::Rng;

const RAY_RGB: [f32; 3] = [0.85, 0.95, 1.0];
const BUBBLE_RGB: [f32; 3] = [0.85, 0.93, 1.0];
const CAUSTIC_RGB: [f32; 3] = [0.7, 0.9, 1.0];
const PLANKTON_MARGIN: f32 = 10.0;

/// A shaft of light anchored to a fraction of the viewport width.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRay {
    /// Anchor as a fraction of viewport width; `x` is derived from it on resize.
    pub anchor: f32,
    pub x: f32,
    pub width: f32,
    /// Length as a fraction of viewport height.
    pub reach: f32,
    pub tilt: f32,
    pub opacity: f32,
    pub sway: f32,
    pub sway_speed: f32,
}

impl LightRay {
    fn random(rng: &mut Rng, bounds: Vec2) -> Self {
        let anchor = rng.range(0.05, 0.95);
        Self {
            anchor,
            x: anchor * bounds.x,
            width: rng.range(40.0, 140.0),
            reach: rng.range(0.6, 1.1),
            tilt: rng.range(-0.25, 0.25),
            opacity: rng.range(0.04, 0.12),
            sway: rng.angle(),
            sway_speed: rng.range(0.003, 0.008),
        }
    }

    fn step(&mut self, frames: f32) {
        self.sway = (self.sway + self.sway_speed * frames) % TAU;
    }

    pub fn alpha(&self) -> f32 {
        (self.opacity + self.sway.sin() * 0.04).max(0.0)
    }

    fn draw(&self, buffer: &mut DrawBuffer, bounds: Vec2) {
        let rotation = self.tilt + self.sway.sin() * 0.05;
        buffer.push(
            DrawInstance::new(Shape::Ray, DrawLayer::Backdrop, self.x, 0.0, self.width)
                .with_extent(self.reach * bounds.y)
                .with_rotation(rotation)
                .with_rgb(RAY_RGB)
                .with_alpha(self.alpha()),
        );
    }
}

/// A bubble rising from the sea floor with a side-to-side wobble.
#[derive(Debug, Clone, PartialEq)]
pub struct SeaBubble {
    /// Center line the wobble swings around.
    pub base_x: f32,
    pub y: f32,
    pub radius: f32,
    /// Pixels per frame, upward.
    pub speed: f32,
    pub wobble: f32,
    pub wobble_speed: f32,
    pub wobble_amount: f32,
    pub opacity: f32,
}

impl SeaBubble {
    /// New bubble somewhere in the water column (initial fill).
    fn scattered(rng: &mut Rng, bounds: Vec2) -> Self {
        let mut b = Self::at_floor(rng, bounds);
        b.y = rng.unit() * (bounds.y + b.radius * 2.0);
        b
    }

    /// New bubble just below the bottom edge.
    fn at_floor(rng: &mut Rng, bounds: Vec2) -> Self {
        let radius = rng.range(2.0, 9.0);
        Self {
            base_x: rng.unit() * bounds.x,
            y: bounds.y + radius + rng.unit() * 40.0,
            radius,
            speed: rng.range(0.4, 1.6),
            wobble: rng.angle(),
            wobble_speed: rng.range(0.02, 0.05),
            wobble_amount: rng.range(4.0, 16.0),
            opacity: rng.range(0.25, 0.6),
        }
    }

    pub fn x(&self) -> f32 {
        self.base_x + self.wobble.sin() * self.wobble_amount
    }

    /// Entirely above the top edge.
    pub fn is_gone(&self) -> bool {
        self.y + self.radius < 0.0
    }

    fn draw(&self, buffer: &mut DrawBuffer) {
        buffer.push(
            DrawInstance::new(Shape::Bubble, DrawLayer::Backdrop, self.x(), self.y, self.radius)
                .with_rgb(BUBBLE_RGB)
                .with_alpha(self.opacity),
        );
    }
}

/// Slowly drifting patch of refracted light.
#[derive(Debug, Clone, PartialEq)]
pub struct Caustic {
    /// Orbit center as fractions of the viewport.
    pub anchor: Vec2,
    pub radius: f32,
    pub orbit: Vec2,
    pub phase: f32,
    pub speed: f32,
    pub opacity: f32,
}

impl Caustic {
    fn random(rng: &mut Rng) -> Self {
        Self {
            anchor: Vec2::new(rng.unit(), rng.range(0.0, 0.6)),
            radius: rng.range(80.0, 220.0),
            orbit: Vec2::new(rng.range(20.0, 80.0), rng.range(10.0, 40.0)),
            phase: rng.angle(),
            speed: rng.range(0.002, 0.006),
            opacity: rng.range(0.03, 0.08),
        }
    }

    pub fn center(&self, bounds: Vec2) -> Vec2 {
        self.anchor * bounds
            + Vec2::new(self.phase.cos() * self.orbit.x, (self.phase * 1.3).sin() * self.orbit.y)
    }

    pub fn alpha(&self) -> f32 {
        (self.opacity + (self.phase * 2.0).sin() * 0.03).max(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct SeaScene {
    rays: Vec<LightRay>,
    bubbles: Vec<SeaBubble>,
    plankton: ParticleField,
    caustics: Vec<Caustic>,
    bounds: Vec2,
    respawned: u64,
}

impl SeaScene {
    pub fn new(config: &SeaConfig, bounds: Vec2, rng: &mut Rng) -> Self {
        Self {
            rays: (0..config.light_rays).map(|_| LightRay::random(rng, bounds)).collect(),
            bubbles: (0..config.bubbles).map(|_| SeaBubble::scattered(rng, bounds)).collect(),
            plankton: ParticleField::plankton(config.plankton, bounds, PLANKTON_MARGIN, rng),
            caustics: (0..config.caustics).map(|_| Caustic::random(rng)).collect(),
            bounds,
            respawned: 0,
        }
    }

    /// Re-measure. Ray anchors are re-derived; pools keep their size.
    pub fn resize(&mut self, bounds: Vec2) {
        self.bounds = bounds;
        for ray in self.rays.iter_mut() {
            ray.x = ray.anchor * bounds.x;
        }
        self.plankton.resize(bounds);
    }

    pub fn step(&mut self, frames: f32, rng: &mut Rng) {
        for ray in self.rays.iter_mut() {
            ray.step(frames);
        }
        for bubble in self.bubbles.iter_mut() {
            bubble.y -= bubble.speed * frames;
            bubble.wobble = (bubble.wobble + bubble.wobble_speed * frames) % TAU;
            if bubble.is_gone() {
                *bubble = SeaBubble::at_floor(rng, self.bounds);
                self.respawned += 1;
            }
        }
        self.plankton.step(frames);
        for caustic in self.caustics.iter_mut() {
            caustic.phase = (caustic.phase + caustic.speed * frames) % (TAU * 10.0);
        }
    }

    pub fn draw(&self, buffer: &mut DrawBuffer) {
        for caustic in &self.caustics {
            let c = caustic.center(self.bounds);
            buffer.push(
                DrawInstance::new(Shape::Glow, DrawLayer::Backdrop, c.x, c.y, caustic.radius)
                    .with_rgb(CAUSTIC_RGB)
                    .with_alpha(caustic.alpha()),
            );
        }
        for ray in &self.rays {
            ray.draw(buffer, self.bounds);
        }
        self.plankton.draw(buffer, DrawLayer::Backdrop);
        for bubble in &self.bubbles {
            bubble.draw(buffer);
        }
    }

    pub fn rays(&self) -> &[LightRay] {
        &self.rays
    }

    pub fn bubbles(&self) -> &[SeaBubble] {
        &self.bubbles
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    /// Bubbles recycled so far.
    pub fn respawned(&self) -> u64 {
        self.respawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> (SeaScene, Rng) {
        let mut rng = Rng::new(21);
        let scene = SeaScene::new(&SeaConfig::default(), Vec2::new(800.0, 600.0), &mut rng);
        (scene, rng)
    }

    #[test]
    fn bubbles_are_recycled_not_reallocated() {
        let (mut scene, mut rng) = scene();
        let count = scene.bubbles().len();
        for _ in 0..5000 {
            scene.step(1.0, &mut rng);
        }
        assert_eq!(scene.bubbles().len(), count);
        assert!(scene.respawned() > 0);
        for b in scene.bubbles() {
            assert!(!b.is_gone());
            assert!(b.y <= 600.0 + b.radius + 40.0);
        }
    }

    #[test]
    fn resize_moves_ray_anchors() {
        let (mut scene, _) = scene();
        let anchors: Vec<f32> = scene.rays().iter().map(|r| r.anchor).collect();
        scene.resize(Vec2::new(400.0, 300.0));
        for (ray, anchor) in scene.rays().iter().zip(anchors) {
            assert_eq!(ray.anchor, anchor);
            assert!((ray.x - anchor * 400.0).abs() < 1e-3);
        }
    }

    #[test]
    fn draw_emits_every_fixture_with_valid_alpha() {
        let (scene, _) = scene();
        let mut buffer = DrawBuffer::with_capacity(1024);
        scene.draw(&mut buffer);
        assert!(buffer.len() > 0);
        assert!(buffer.len() <= 30 + 6 + 60 + 5);
        for instance in buffer.instances() {
            assert!(instance.alpha > 0.0 && instance.alpha <= 1.0);
        }
    }
}
