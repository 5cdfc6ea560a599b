//! Phase-dependent background gradient and its cross-fade.

use serde::Serialize;

use crate::api::types::Phase;
use crate::extensions::easing::{Easing, lerp};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: lerp(self.r, other.r, t),
            g: lerp(self.g, other.g, t),
            b: lerp(self.b, other.b, t),
        }
    }

    /// `#rrggbb`, rounding each channel.
    pub fn to_css(self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

/// Two-stop 135° linear gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gradient {
    pub start: Rgb,
    pub end: Rgb,
}

impl Gradient {
    pub const fn new(start: u32, end: u32) -> Self {
        Self {
            start: Rgb::from_hex(start),
            end: Rgb::from_hex(end),
        }
    }

    pub fn for_phase(phase: Phase) -> Gradient {
        match phase {
            Phase::Entry | Phase::Curriculum => Gradient::new(0x121212, 0x121212),
            Phase::Emergence | Phase::Convergence => Gradient::new(0xA8C4E5, 0x7BA3D0),
            Phase::CentralBubble => Gradient::new(0x9BBCDE, 0x6F97C4),
            Phase::Explosion => Gradient::new(0x8AADD4, 0x5E88B5),
        }
    }

    pub fn lerp(self, other: Gradient, t: f32) -> Gradient {
        Gradient {
            start: self.start.lerp(other.start, t),
            end: self.end.lerp(other.end, t),
        }
    }

    pub fn to_css(self) -> String {
        format!(
            "linear-gradient(135deg, {} 0%, {} 100%)",
            self.start.to_css(),
            self.end.to_css()
        )
    }
}

/// Cross-fades the page background whenever the phase changes.
#[derive(Debug, Clone)]
pub struct BackgroundTransition {
    from: Gradient,
    to: Gradient,
    elapsed: f32,
    duration: f32,
}

impl BackgroundTransition {
    pub const DURATION: f32 = 1.2;
    pub const EASING: Easing = Easing::Power2InOut;

    /// The page mounts with the dark gradient and fades into `phase`.
    pub fn new(phase: Phase) -> Self {
        let dark = Gradient::for_phase(Phase::Entry);
        let mut t = Self {
            from: dark,
            to: dark,
            elapsed: 0.0,
            duration: 0.0,
        };
        t.retarget(phase);
        t
    }

    /// Start fading from whatever is on screen now toward the phase's gradient.
    pub fn retarget(&mut self, phase: Phase) {
        self.from = self.current();
        self.to = Gradient::for_phase(phase);
        self.elapsed = 0.0;
        self.duration = if phase == Phase::Entry { 0.0 } else { Self::DURATION };
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    pub fn is_settled(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn current(&self) -> Gradient {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = Self::EASING.apply(self.elapsed / self.duration);
        self.from.lerp(self.to, t)
    }
}
