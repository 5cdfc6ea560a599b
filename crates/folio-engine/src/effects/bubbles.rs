//! Intro bubbles: a fixed set of glass spheres that rise, converge on the
//! center, merge into one clickable bubble and finally burst.
//!
//! Positions live in a small 3D world seen by a perspective camera at
//! `z = 8` with a 50° vertical field of view, then get projected to pixels.

use glam::{Vec2, Vec3};

use crate::api::config::IntroBubbleConfig;
use crate::api::types::{Phase, Viewport};
use crate::extensions::easing::{Easing, lerp_vec3};
use crate::renderer::instance::{DrawBuffer, DrawInstance, DrawLayer, Shape};
use super::rng::Rng;

const CAMERA_Z: f32 = 8.0;
const HALF_FOV_TAN: f32 = 0.466_307_66; // tan(25°)
/// Fraction of the remaining distance covered per frame while converging.
const CONVERGE_RATE: f32 = 0.03;
const BUBBLE_RGB: [f32; 3] = [0.7, 0.85, 1.0];
const MERGED_RGB: [f32; 3] = [0.75, 0.88, 1.0];
/// Viewport width under which the merged bubble uses its compact scale.
const COMPACT_BREAKPOINT: f32 = 768.0;

#[derive(Debug, Clone, PartialEq)]
pub struct IntroBubble {
    /// Spawn point below the screen.
    pub origin: Vec3,
    pub position: Vec3,
    /// Radius in world units.
    pub size: f32,
    pub speed: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl IntroBubble {
    fn random(rng: &mut Rng, config: &IntroBubbleConfig) -> Self {
        let size = config.min_size / 100.0 + rng.unit() * ((config.max_size - config.min_size) / 100.0);
        let origin = Vec3::new(rng.centered(4.0), -5.0 - rng.unit() * 3.0, rng.centered(1.0));
        Self {
            origin,
            position: origin,
            size,
            speed: rng.range(config.rise_speed_min, config.rise_speed_max),
            scale: 1.0,
            opacity: 1.0,
        }
    }

    /// Rise with a sine sway, as a function of time since mount.
    fn emerge(&mut self, elapsed: f32) {
        self.position = Vec3::new(
            self.origin.x + (elapsed * 0.8 + self.origin.x).sin() * 0.3,
            self.origin.y + elapsed * self.speed * 0.5,
            self.origin.z,
        );
        self.scale = 1.0;
        self.opacity = 1.0;
    }

    /// Ease toward the target, shrinking as it closes in.
    fn converge(&mut self, target: Vec3, frames: f32) {
        let rate = 1.0 - (1.0 - CONVERGE_RATE).powf(frames);
        self.position = lerp_vec3(self.position, target, rate);
        let dist = self.position.distance(target);
        self.scale = (dist / 5.0).clamp(0.1, 1.0);
        self.opacity = 0.6;
    }
}

/// World → pixel projection for the intro camera.
pub fn project(world: Vec3, viewport: &Viewport) -> Option<(Vec2, f32)> {
    let depth = CAMERA_Z - world.z;
    if depth <= 0.01 {
        return None;
    }
    let half_h = depth * HALF_FOV_TAN;
    let aspect = viewport.width / viewport.height.max(1.0);
    let half_w = half_h * aspect;
    let px_per_unit = viewport.height * 0.5 / half_h;
    let x = viewport.width * 0.5 * (1.0 + world.x / half_w);
    let y = viewport.height * 0.5 * (1.0 - world.y / half_h);
    Some((Vec2::new(x, y), px_per_unit))
}

/// The single large bubble of CENTRAL_BUBBLE.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedBubble {
    pub visible: bool,
    pub opacity: f32,
    pub hover: f32,
    pub hovered: bool,
    pub time: f32,
    /// Diameter in pixels at the desktop scale.
    pub size: f32,
    pub base_scale: f32,
}

impl MergedBubble {
    fn new(size: f32, viewport: &Viewport) -> Self {
        Self {
            visible: false,
            opacity: 0.0,
            hover: 0.0,
            hovered: false,
            time: 0.0,
            size,
            base_scale: Self::base_scale_for(viewport),
        }
    }

    pub fn base_scale_for(viewport: &Viewport) -> f32 {
        if viewport.width < COMPACT_BREAKPOINT { 1.5 } else { 2.5 }
    }

    /// On-screen radius in pixels, including pulse and hover swell.
    pub fn radius(&self) -> f32 {
        let pulse = 1.0 + (self.time * 1.5).sin() * 0.03;
        let swell = 1.0 + self.hover * 0.08;
        self.size * 0.5 * (self.base_scale / 2.5) * pulse * swell
    }

    pub fn contains(&self, point: Vec2, viewport: &Viewport) -> bool {
        self.visible && point.distance(viewport.center()) <= self.radius()
    }

    fn step(&mut self, dt: f32, frames: f32) {
        self.time += dt;
        let target = if self.visible { 1.0 } else { 0.0 };
        self.opacity += (target - self.opacity) * (1.0 - 0.95_f32.powf(frames));
        let hover_target = if self.hovered { 1.0 } else { 0.0 };
        self.hover += (hover_target - self.hover) * (1.0 - 0.9_f32.powf(frames));
    }
}

/// Full-screen burst of EXPLOSION: scale 0 → 3 over the explosion duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub elapsed: f32,
    pub duration: f32,
    pub finished: bool,
}

impl Explosion {
    pub const MAX_SCALE: f32 = 3.0;
    pub const EASING: Easing = Easing::ExpoInOut;

    pub fn new(duration: f32) -> Self {
        Self { elapsed: 0.0, duration: duration.max(1e-3), finished: false }
    }

    /// Advance. Returns true exactly once, on the tick the burst completes.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.finished {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.finished = true;
            return true;
        }
        false
    }

    pub fn scale(&self) -> f32 {
        Self::EASING.apply(self.elapsed / self.duration) * Self::MAX_SCALE
    }

    /// Corner radius as a fraction: fully round at the start, square at the end.
    pub fn roundness(&self) -> f32 {
        1.0 - Self::EASING.apply(self.elapsed / self.duration)
    }
}

#[derive(Debug, Clone)]
pub struct IntroScene {
    bubbles: Vec<IntroBubble>,
    target: Vec3,
    elapsed: f32,
    merged: MergedBubble,
    explosion: Option<Explosion>,
    explosion_secs: f32,
    viewport: Viewport,
}

impl IntroScene {
    pub fn new(config: &IntroBubbleConfig, explosion_ms: f64, viewport: Viewport, rng: &mut Rng) -> Self {
        Self {
            bubbles: (0..config.count).map(|_| IntroBubble::random(rng, config)).collect(),
            target: Vec3::ZERO,
            elapsed: 0.0,
            merged: MergedBubble::new(config.merged_size, &viewport),
            explosion: None,
            explosion_secs: (explosion_ms / 1000.0) as f32,
            viewport,
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.merged.base_scale = MergedBubble::base_scale_for(&viewport);
    }

    /// React to a phase change.
    pub fn enter(&mut self, phase: Phase) {
        self.merged.visible = phase == Phase::CentralBubble;
        if phase == Phase::Explosion && self.explosion.is_none() {
            self.explosion = Some(Explosion::new(self.explosion_secs));
        }
    }

    /// Advance by `dt` seconds (`frames` fixed frames). Returns true on the
    /// tick the explosion finishes.
    pub fn step(&mut self, phase: Phase, dt: f32, frames: f32) -> bool {
        self.elapsed += dt;
        match phase {
            Phase::Entry | Phase::Emergence => {
                for b in self.bubbles.iter_mut() {
                    b.emerge(self.elapsed);
                }
            }
            Phase::Convergence => {
                for b in self.bubbles.iter_mut() {
                    b.converge(self.target, frames);
                }
            }
            _ => {}
        }
        self.merged.step(dt, frames);
        match self.explosion.as_mut() {
            Some(explosion) => explosion.tick(dt),
            None => false,
        }
    }

    pub fn set_hover(&mut self, point: Vec2) -> bool {
        let inside = self.merged.contains(point, &self.viewport);
        let entered = inside && !self.merged.hovered;
        self.merged.hovered = inside;
        entered
    }

    pub fn hit_merged(&self, point: Vec2) -> bool {
        self.merged.contains(point, &self.viewport)
    }

    pub fn bubbles(&self) -> &[IntroBubble] {
        &self.bubbles
    }

    pub fn merged(&self) -> &MergedBubble {
        &self.merged
    }

    pub fn explosion(&self) -> Option<&Explosion> {
        self.explosion.as_ref()
    }

    pub fn draw(&self, phase: Phase, buffer: &mut DrawBuffer) {
        if matches!(phase, Phase::Emergence | Phase::Convergence) {
            for b in &self.bubbles {
                if let Some((screen, px)) = project(b.position, &self.viewport) {
                    buffer.push(
                        DrawInstance::new(Shape::Bubble, DrawLayer::Intro, screen.x, screen.y, b.size * b.scale * px)
                            .with_rgb(BUBBLE_RGB)
                            .with_alpha(b.opacity),
                    );
                }
            }
        }
        if self.merged.opacity > 0.01 {
            let c = self.viewport.center();
            buffer.push(
                DrawInstance::new(Shape::Bubble, DrawLayer::Intro, c.x, c.y, self.merged.radius())
                    .with_rgb(MERGED_RGB)
                    .with_alpha(self.merged.opacity),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> IntroScene {
        let mut rng = Rng::new(1);
        IntroScene::new(&IntroBubbleConfig::default(), 1000.0, Viewport::new(1280.0, 720.0), &mut rng)
    }

    #[test]
    fn fixed_pool_with_configured_sizes() {
        let s = scene();
        assert_eq!(s.bubbles().len(), 18);
        for b in s.bubbles() {
            assert!(b.size >= 0.2 && b.size <= 0.8);
            assert!(b.origin.y <= -5.0 && b.origin.y >= -8.0);
        }
    }

    #[test]
    fn emergence_rises() {
        let mut s = scene();
        let start: Vec<f32> = s.bubbles().iter().map(|b| b.origin.y).collect();
        for _ in 0..60 {
            s.step(Phase::Emergence, 1.0 / 60.0, 1.0);
        }
        for (b, y0) in s.bubbles().iter().zip(start) {
            assert!(b.position.y > y0);
        }
    }

    #[test]
    fn convergence_pulls_toward_center_and_shrinks() {
        let mut s = scene();
        for _ in 0..60 {
            s.step(Phase::Emergence, 1.0 / 60.0, 1.0);
        }
        let before: Vec<f32> = s.bubbles().iter().map(|b| b.position.length()).collect();
        for _ in 0..120 {
            s.step(Phase::Convergence, 1.0 / 60.0, 1.0);
        }
        for (b, d) in s.bubbles().iter().zip(before) {
            assert!(b.position.length() < d);
            assert!(b.scale >= 0.1 && b.scale <= 1.0);
            assert_eq!(b.opacity, 0.6);
        }
    }

    #[test]
    fn merged_bubble_is_clickable_only_when_visible() {
        let mut s = scene();
        let center = Vec2::new(640.0, 360.0);
        assert!(!s.hit_merged(center));
        s.enter(Phase::CentralBubble);
        assert!(s.hit_merged(center));
        assert!(!s.hit_merged(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn merged_bubble_compacts_on_narrow_viewports() {
        let mut s = scene();
        s.enter(Phase::CentralBubble);
        let wide = s.merged().radius();
        s.resize(Viewport::new(600.0, 900.0));
        assert!(s.merged().radius() < wide);
    }

    #[test]
    fn explosion_completes_once() {
        let mut s = scene();
        s.enter(Phase::Explosion);
        let mut completions = 0;
        for _ in 0..120 {
            if s.step(Phase::Explosion, 1.0 / 60.0, 1.0) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        let e = s.explosion().unwrap();
        assert!((e.scale() - Explosion::MAX_SCALE).abs() < 1e-4);
        assert_eq!(e.roundness(), 0.0);
    }

    #[test]
    fn projection_centers_origin() {
        let vp = Viewport::new(1000.0, 500.0);
        let (p, px) = project(Vec3::ZERO, &vp).unwrap();
        assert!((p.x - 500.0).abs() < 1e-3 && (p.y - 250.0).abs() < 1e-3);
        assert!(px > 0.0);
        assert!(project(Vec3::new(0.0, 0.0, 9.0), &vp).is_none());
    }
}
