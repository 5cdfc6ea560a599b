/// Fixed-step frame accumulator.
/// Particle motion is expressed per frame, so the simulation always steps in
/// whole frames of `step` seconds no matter how irregular `requestAnimationFrame` is.
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: f32,
    accumulator: f32,
    frames: u64,
}

impl FrameClock {
    /// Frames simulated at most per call. A tab returning from the background
    /// would otherwise replay minutes of drift in one go.
    pub const MAX_CATCH_UP: u32 = 10;

    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            frames: 0,
        }
    }

    /// Feed wall time in seconds. Returns how many fixed frames to simulate.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        if dt <= 0.0 || !dt.is_finite() {
            return 0;
        }
        self.accumulator = (self.accumulator + dt).min(self.step * Self::MAX_CATCH_UP as f32);
        let steps = (self.accumulator / self.step) as u32;
        self.accumulator -= steps as f32 * self.step;
        self.frames += steps as u64;
        steps
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Total frames simulated since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Monotonic millisecond clock driven by the host.
/// Timers compare against it, so tests can move time forward by hand.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VirtualClock {
    now_ms: f64,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Move time forward. Negative or non-finite deltas are ignored.
    pub fn advance(&mut self, dt_ms: f64) -> f64 {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.now_ms += dt_ms;
        }
        self.now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_frame_yields_one_step() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        assert_eq!(clock.accumulate(1.0 / 60.0), 1);
        assert_eq!(clock.frames(), 1);
    }

    #[test]
    fn partial_frames_carry_over() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        assert_eq!(clock.accumulate(0.010), 0);
        assert_eq!(clock.accumulate(0.010), 1);
    }

    #[test]
    fn long_stall_is_capped() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        assert_eq!(clock.accumulate(5.0), FrameClock::MAX_CATCH_UP);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        assert_eq!(clock.accumulate(-1.0), 0);
        let mut virt = VirtualClock::new();
        virt.advance(100.0);
        virt.advance(-50.0);
        virt.advance(f64::NAN);
        assert_eq!(virt.now_ms(), 100.0);
    }
}
