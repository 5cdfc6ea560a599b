//! Ambient dust: small breathing dots drifting across a toroidal viewport.

use glam::Vec2;

use crate::renderer::instance::{DrawBuffer, DrawInstance, DrawLayer, Shape};
use super::rng::Rng;

/// How far the opacity swings around its base value.
pub const BREATH_AMPLITUDE: f32 = 0.08;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per frame.
    pub vel: Vec2,
    pub radius: f32,
    /// Base opacity before breathing.
    pub opacity: f32,
    /// Phase of the breathing sine, radians.
    pub pulse: f32,
    /// Radians per frame.
    pub pulse_speed: f32,
    pub rgb: [f32; 3],
}

impl Particle {
    /// White dust mote with a slight upward bias.
    pub fn dust(rng: &mut Rng, bounds: Vec2) -> Self {
        Self {
            pos: Vec2::new(rng.unit() * bounds.x, rng.unit() * bounds.y),
            vel: Vec2::new(rng.centered(0.15), rng.centered(0.1) - 0.1),
            radius: rng.range(0.5, 2.0),
            opacity: rng.range(0.05, 0.35),
            pulse: rng.angle(),
            pulse_speed: rng.range(0.005, 0.015),
            rgb: [1.0, 1.0, 1.0],
        }
    }

    /// Greenish plankton speck for the underwater scene. Slower, sinks a little.
    pub fn plankton(rng: &mut Rng, bounds: Vec2) -> Self {
        Self {
            pos: Vec2::new(rng.unit() * bounds.x, rng.unit() * bounds.y),
            vel: Vec2::new(rng.centered(0.2), rng.range(-0.02, 0.08)),
            radius: rng.range(0.6, 1.8),
            opacity: rng.range(0.1, 0.4),
            pulse: rng.angle(),
            pulse_speed: rng.range(0.01, 0.03),
            rgb: [0.75, 0.95, 0.85],
        }
    }

    /// Opacity after breathing, floored at zero so it is always a valid alpha.
    pub fn alpha(&self) -> f32 {
        (self.opacity + self.pulse.sin() * BREATH_AMPLITUDE).max(0.0)
    }

    /// The particle `frames` frames later. Pure: no allocation, no side effects.
    pub fn next_frame(&self, frames: f32, bounds: Vec2, margin: f32) -> Particle {
        let pos = self.pos + self.vel * frames;
        Particle {
            pos: Vec2::new(wrap(pos.x, bounds.x, margin), wrap(pos.y, bounds.y, margin)),
            pulse: (self.pulse + self.pulse_speed * frames) % std::f32::consts::TAU,
            ..self.clone()
        }
    }

    pub fn draw(&self, buffer: &mut DrawBuffer, layer: DrawLayer) {
        buffer.push(
            DrawInstance::new(Shape::Dot, layer, self.pos.x, self.pos.y, self.radius)
                .with_rgb(self.rgb)
                .with_alpha(self.alpha()),
        );
    }
}

/// Snap a coordinate that left `[-margin, extent + margin]` to the opposite edge.
#[inline]
pub fn wrap(v: f32, extent: f32, margin: f32) -> f32 {
    if v < -margin {
        extent + margin
    } else if v > extent + margin {
        -margin
    } else {
        v
    }
}

/// Fixed pool of particles. Resizing the viewport never reallocates it.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    bounds: Vec2,
    margin: f32,
}

impl ParticleField {
    pub fn dust(count: usize, bounds: Vec2, margin: f32, rng: &mut Rng) -> Self {
        Self::from_fn(count, bounds, margin, rng, Particle::dust)
    }

    pub fn plankton(count: usize, bounds: Vec2, margin: f32, rng: &mut Rng) -> Self {
        Self::from_fn(count, bounds, margin, rng, Particle::plankton)
    }

    fn from_fn(
        count: usize,
        bounds: Vec2,
        margin: f32,
        rng: &mut Rng,
        make: fn(&mut Rng, Vec2) -> Particle,
    ) -> Self {
        Self {
            particles: (0..count).map(|_| make(rng, bounds)).collect(),
            bounds,
            margin,
        }
    }

    pub fn resize(&mut self, bounds: Vec2) {
        self.bounds = bounds;
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn step(&mut self, frames: f32) {
        let (bounds, margin) = (self.bounds, self.margin);
        for p in self.particles.iter_mut() {
            *p = p.next_frame(frames, bounds, margin);
        }
    }

    pub fn draw(&self, buffer: &mut DrawBuffer, layer: DrawLayer) {
        for p in &self.particles {
            p.draw(buffer, layer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_snaps_to_opposite_edge() {
        assert_eq!(wrap(-10.5, 100.0, 10.0), 110.0);
        assert_eq!(wrap(110.5, 100.0, 10.0), -10.0);
        assert_eq!(wrap(-10.0, 100.0, 10.0), -10.0);
        assert_eq!(wrap(50.0, 100.0, 10.0), 50.0);
    }

    #[test]
    fn positions_stay_inside_wrap_envelope() {
        let mut rng = Rng::new(3);
        let bounds = Vec2::new(320.0, 200.0);
        let mut field = ParticleField::dust(80, bounds, 10.0, &mut rng);
        for frame in 0..20_000 {
            field.step(if frame % 7 == 0 { 3.0 } else { 1.0 });
            for p in field.particles() {
                assert!(p.pos.x >= -10.0 && p.pos.x <= bounds.x + 10.0, "x={}", p.pos.x);
                assert!(p.pos.y >= -10.0 && p.pos.y <= bounds.y + 10.0, "y={}", p.pos.y);
            }
        }
    }

    #[test]
    fn shrinking_viewport_pulls_particles_back_in() {
        let mut rng = Rng::new(11);
        let mut field = ParticleField::dust(40, Vec2::new(1000.0, 1000.0), 10.0, &mut rng);
        field.resize(Vec2::new(100.0, 100.0));
        field.step(1.0);
        assert_eq!(field.particles().len(), 40);
        for p in field.particles() {
            assert!(p.pos.x <= 110.0 && p.pos.y <= 110.0);
        }
    }

    #[test]
    fn alpha_breathes_and_never_goes_negative() {
        let mut p = Particle::dust(&mut Rng::new(5), Vec2::splat(100.0));
        p.opacity = 0.02;
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..2000 {
            p = p.next_frame(1.0, Vec2::splat(100.0), 10.0);
            min = min.min(p.alpha());
            max = max.max(p.alpha());
        }
        assert_eq!(min, 0.0);
        assert!(max > 0.02);
    }

    #[test]
    fn next_frame_leaves_source_untouched() {
        let p = Particle::dust(&mut Rng::new(9), Vec2::splat(100.0));
        let before = p.clone();
        let _ = p.next_frame(1.0, Vec2::splat(100.0), 10.0);
        assert_eq!(p, before);
    }
}
