//! Seedable xorshift64 generator.
//! Every randomized fixture draws from one of these so a seed reproduces a scene.

use std::f32::consts::TAU;

#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in [0, upper_bound).
    pub fn next_int(&mut self, upper_bound: u32) -> u32 {
        if upper_bound == 0 {
            return 0;
        }
        (self.next_u64() % upper_bound as u64) as u32
    }

    /// Uniform in [0, 1).
    pub fn unit(&mut self) -> f32 {
        // Top 24 bits fill an f32 mantissa exactly.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform in [lo, hi).
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.unit() * (hi - lo)
    }

    /// Uniform in [-half, half).
    pub fn centered(&mut self, half: f32) -> f32 {
        (self.unit() - 0.5) * 2.0 * half
    }

    /// Random angle in [0, TAU).
    pub fn angle(&mut self) -> f32 {
        self.unit() * TAU
    }
}
