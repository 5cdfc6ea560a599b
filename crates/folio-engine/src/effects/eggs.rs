//! Overlay effects for the easter eggs: digital rain and the glass bubbles
//! that keep rising once the long key sequence has been entered.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::renderer::instance::{DrawBuffer, DrawInstance, DrawLayer, Shape};
use super::rng::Rng;

/// Katakana followed by digits. Glyph indices in the draw buffer point here.
pub const RAIN_GLYPHS: &str = "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン0123456789";
const RAIN_FONT_PX: f32 = 14.0;
/// Rain advances on its own cadence, independent of the frame rate.
const RAIN_INTERVAL: f32 = 0.033;
const RAIN_TRAIL: usize = 12;
const RAIN_RGB: [f32; 3] = [0.0, 1.0, 0.0];

pub fn rain_glyph_count() -> u32 {
    RAIN_GLYPHS.chars().count() as u32
}

/// Column-based falling glyphs.
#[derive(Debug, Clone)]
pub struct DigitalRain {
    /// Head row of each column.
    drops: Vec<u32>,
    /// Glyph index per column, reshuffled every rain step.
    glyphs: Vec<u32>,
    bounds: Vec2,
    accumulator: f32,
}

impl DigitalRain {
    pub fn new(bounds: Vec2) -> Self {
        let columns = (bounds.x / RAIN_FONT_PX).floor().max(0.0) as usize;
        Self {
            drops: vec![1; columns],
            glyphs: vec![0; columns],
            bounds,
            accumulator: 0.0,
        }
    }

    /// Most glyphs a rain over `bounds` can draw in one frame.
    pub fn max_instances(bounds: Vec2) -> usize {
        (bounds.x / RAIN_FONT_PX).floor().max(0.0) as usize * RAIN_TRAIL
    }

    pub fn columns(&self) -> usize {
        self.drops.len()
    }

    pub fn drops(&self) -> &[u32] {
        &self.drops
    }

    pub fn step(&mut self, dt: f32, rng: &mut Rng) {
        self.accumulator += dt;
        while self.accumulator >= RAIN_INTERVAL {
            self.accumulator -= RAIN_INTERVAL;
            let glyph_count = rain_glyph_count();
            for (drop, glyph) in self.drops.iter_mut().zip(self.glyphs.iter_mut()) {
                *glyph = rng.next_int(glyph_count);
                if *drop as f32 * RAIN_FONT_PX > self.bounds.y && rng.unit() > 0.975 {
                    *drop = 0;
                }
                *drop += 1;
            }
        }
    }

    pub fn draw(&self, buffer: &mut DrawBuffer) {
        for (col, (&drop, &glyph)) in self.drops.iter().zip(self.glyphs.iter()).enumerate() {
            let x = col as f32 * RAIN_FONT_PX;
            // Fading trail above the head stands in for the translucent repaint.
            for i in 0..RAIN_TRAIL.min(drop as usize) {
                let row = drop - i as u32;
                let y = row as f32 * RAIN_FONT_PX;
                if y > self.bounds.y + RAIN_FONT_PX {
                    continue;
                }
                let fade = 1.0 - i as f32 / RAIN_TRAIL as f32;
                let index = (glyph + i as u32 * 7) % rain_glyph_count();
                buffer.push(
                    DrawInstance::new(Shape::Glyph, DrawLayer::Overlay, x, y, RAIN_FONT_PX)
                        .with_extent(index as f32)
                        .with_rgb(RAIN_RGB)
                        .with_alpha(0.8 * fade),
                );
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct GlassBubble {
    /// Horizontal anchor as a fraction of width.
    anchor: f32,
    y: f32,
    size: f32,
    speed: f32,
    wobble_speed: f32,
    wobble_amount: f32,
    wobble_offset: f32,
    time: f32,
}

impl GlassBubble {
    fn spawn(rng: &mut Rng, bounds: Vec2) -> Self {
        let size = rng.range(20.0, 80.0);
        Self {
            anchor: rng.unit(),
            y: bounds.y + size,
            size,
            speed: rng.range(1.5, 3.5),
            wobble_speed: rng.range(0.02, 0.05),
            wobble_amount: rng.range(10.0, 40.0),
            wobble_offset: rng.angle(),
            time: 0.0,
        }
    }

    fn x(&self, bounds: Vec2) -> f32 {
        self.anchor * bounds.x + (self.time * self.wobble_speed + self.wobble_offset).sin() * self.wobble_amount
    }
}

/// Fragment or ring left behind by a popped bubble.
#[derive(Debug, Clone, PartialEq)]
struct PopFragment {
    pos: Vec2,
    vel: Vec2,
    size: f32,
    opacity: f32,
    ring: bool,
}

/// Bubbles that rise and pop at the top. Runs for the rest of the session once unlocked.
#[derive(Debug, Clone)]
pub struct GlassBubbles {
    bubbles: Vec<GlassBubble>,
    fragments: Vec<PopFragment>,
    bounds: Vec2,
    pops: u64,
}

impl GlassBubbles {
    pub const COUNT: usize = 40;
    const FRAGMENTS_PER_POP: usize = 8;
    /// Every bubble plus up to two fading bursts (dots and ring) per bubble.
    pub const MAX_INSTANCES: usize = Self::COUNT * (1 + 2 * (Self::FRAGMENTS_PER_POP + 1));

    pub fn new(bounds: Vec2, rng: &mut Rng) -> Self {
        Self {
            bubbles: (0..Self::COUNT).map(|_| GlassBubble::spawn(rng, bounds)).collect(),
            fragments: Vec::with_capacity(Self::COUNT * (Self::FRAGMENTS_PER_POP + 1)),
            bounds,
            pops: 0,
        }
    }

    pub fn resize(&mut self, bounds: Vec2) {
        self.bounds = bounds;
    }

    pub fn pops(&self) -> u64 {
        self.pops
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn step(&mut self, frames: f32, rng: &mut Rng) {
        for bubble in self.bubbles.iter_mut() {
            bubble.time += frames;
            bubble.y -= bubble.speed * frames;
            if bubble.y < bubble.size {
                let center = Vec2::new(bubble.x(self.bounds), bubble.y);
                burst(&mut self.fragments, center, bubble.size, rng);
                *bubble = GlassBubble::spawn(rng, self.bounds);
                self.pops += 1;
            }
        }
        for frag in self.fragments.iter_mut() {
            if frag.ring {
                frag.size += frag.size * 0.08 * frames;
                frag.opacity -= 0.03 * frames;
            } else {
                frag.pos += frag.vel * frames;
                frag.opacity -= 0.05 * frames;
            }
        }
        self.fragments.retain(|f| f.opacity > 0.0);
    }

    pub fn draw(&self, buffer: &mut DrawBuffer) {
        for bubble in &self.bubbles {
            let pulse = 1.0 + (bubble.time * 0.05).sin() * 0.05;
            buffer.push(
                DrawInstance::new(Shape::Bubble, DrawLayer::Overlay, bubble.x(self.bounds), bubble.y, bubble.size * 0.5 * pulse)
                    .with_alpha(0.4),
            );
        }
        for frag in &self.fragments {
            let instance = if frag.ring {
                DrawInstance::new(Shape::Ring, DrawLayer::Overlay, frag.pos.x, frag.pos.y, frag.size * 0.5).with_extent(2.0)
            } else {
                DrawInstance::new(Shape::Dot, DrawLayer::Overlay, frag.pos.x, frag.pos.y, frag.size * 0.5 * frag.opacity)
            };
            buffer.push(instance.with_alpha(frag.opacity));
        }
    }
}

fn burst(fragments: &mut Vec<PopFragment>, center: Vec2, size: f32, rng: &mut Rng) {
    for i in 0..GlassBubbles::FRAGMENTS_PER_POP {
        let angle = i as f32 / GlassBubbles::FRAGMENTS_PER_POP as f32 * TAU;
        let speed = rng.range(3.0, 5.0);
        fragments.push(PopFragment {
            pos: center,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            size: size * 0.15,
            opacity: 1.0,
            ring: false,
        });
    }
    fragments.push(PopFragment {
        pos: center,
        vel: Vec2::ZERO,
        size,
        opacity: 0.5,
        ring: true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rain_has_one_column_per_glyph_width() {
        let rain = DigitalRain::new(Vec2::new(140.0, 300.0));
        assert_eq!(rain.columns(), 10);
    }

    #[test]
    fn rain_steps_on_its_own_cadence() {
        let mut rng = Rng::new(2);
        let mut rain = DigitalRain::new(Vec2::new(140.0, 300.0));
        rain.step(0.02, &mut rng);
        assert!(rain.drops().iter().all(|&d| d == 1));
        rain.step(0.02, &mut rng);
        assert!(rain.drops().iter().all(|&d| d == 2));
    }

    #[test]
    fn rain_columns_restart_after_leaving_screen() {
        let mut rng = Rng::new(4);
        let mut rain = DigitalRain::new(Vec2::new(140.0, 100.0));
        for _ in 0..2000 {
            rain.step(RAIN_INTERVAL, &mut rng);
        }
        // Rows past the bottom restart with a small chance each step,
        // so after many steps every column has wrapped at least once.
        assert!(rain.drops().iter().all(|&d| d < 2000));
    }

    #[test]
    fn glass_bubbles_pop_and_recycle() {
        let mut rng = Rng::new(8);
        let mut bubbles = GlassBubbles::new(Vec2::new(800.0, 600.0), &mut rng);
        for _ in 0..600 {
            bubbles.step(1.0, &mut rng);
        }
        assert_eq!(bubbles.len(), GlassBubbles::COUNT);
        assert!(bubbles.pops() > 0);
        // Fragments fade out, so the pool stays bounded.
        assert!(bubbles.fragment_count() <= GlassBubbles::COUNT * 9 * 2);
    }

    #[test]
    fn rain_stays_within_its_instance_budget() {
        let bounds = Vec2::new(2560.0, 1440.0);
        let mut rng = Rng::new(6);
        let mut rain = DigitalRain::new(bounds);
        let mut buf = DrawBuffer::with_capacity(DigitalRain::max_instances(bounds));
        for _ in 0..400 {
            rain.step(RAIN_INTERVAL, &mut rng);
            buf.clear();
            rain.draw(&mut buf);
            assert_eq!(buf.dropped(), 0);
        }
        assert_eq!(DigitalRain::max_instances(bounds), 182 * 12);
    }

    #[test]
    fn glass_bubbles_stay_within_their_instance_budget() {
        let mut rng = Rng::new(12);
        let mut bubbles = GlassBubbles::new(Vec2::new(1280.0, 200.0), &mut rng);
        let mut buf = DrawBuffer::with_capacity(GlassBubbles::MAX_INSTANCES);
        for _ in 0..1200 {
            bubbles.step(1.0, &mut rng);
            buf.clear();
            bubbles.draw(&mut buf);
            assert_eq!(buf.dropped(), 0);
        }
    }

    #[test]
    fn glyph_table_size() {
        assert_eq!(rain_glyph_count(), 56);
    }
}
