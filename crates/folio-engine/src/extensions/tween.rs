// extensions/tween.rs
//
// Reversible playhead for time-based animations.
//
// Usage:
//   let mut tween = Tween::new(0.8, Easing::Power3Out);
//   tween.play();
//   tween.tick(dt);
//   let y = tween.lerp(40.0, 0.0);   // eased value at the current time
//   tween.reverse();                 // runs back toward the start from where it is

use super::easing::{Easing, lerp};

/// Which way the playhead is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Idle,
    Forward,
    Backward,
}

/// Zero-length tweens still need a finite slope.
const MIN_DURATION: f32 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    /// Duration in seconds.
    pub duration: f32,
    /// Delay in seconds before the forward run starts moving (stagger).
    pub delay: f32,
    pub easing: Easing,
    /// Elapsed seconds, including delay, in [0, delay + duration].
    elapsed: f32,
    direction: Direction,
}

impl Tween {
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            duration: duration.max(MIN_DURATION),
            delay: 0.0,
            easing,
            elapsed: 0.0,
            direction: Direction::Idle,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    fn total(&self) -> f32 {
        self.delay + self.duration
    }

    /// Run toward the end from the current position.
    pub fn play(&mut self) {
        self.direction = Direction::Forward;
    }

    /// Run back toward the start from the current position.
    /// The delay is skipped on the way back.
    pub fn reverse(&mut self) {
        if self.elapsed > self.delay {
            self.direction = Direction::Backward;
        } else {
            self.elapsed = 0.0;
            self.direction = Direction::Idle;
        }
    }

    /// Jump to the end without animating.
    pub fn finish(&mut self) {
        self.elapsed = self.total();
        self.direction = Direction::Idle;
    }

    /// Jump to the start without animating.
    pub fn rewind(&mut self) {
        self.elapsed = 0.0;
        self.direction = Direction::Idle;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_active(&self) -> bool {
        self.direction != Direction::Idle
    }

    /// Advance by `dt` seconds. Returns true when the playhead reached an end this tick.
    pub fn tick(&mut self, dt: f32) -> bool {
        match self.direction {
            Direction::Idle => false,
            Direction::Forward => {
                self.elapsed += dt;
                if self.elapsed >= self.total() {
                    self.elapsed = self.total();
                    self.direction = Direction::Idle;
                    true
                } else {
                    false
                }
            }
            Direction::Backward => {
                // Skip straight out of the delay window when running back.
                self.elapsed = self.elapsed.min(self.total()) - dt;
                if self.elapsed <= self.delay {
                    self.elapsed = 0.0;
                    self.direction = Direction::Idle;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Linear progress in [0, 1], ignoring the delay.
    pub fn progress(&self) -> f32 {
        ((self.elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
    }

    /// Eased progress.
    pub fn value(&self) -> f32 {
        self.easing.apply(self.progress())
    }

    /// Interpolate between two values at the eased progress.
    pub fn lerp(&self, from: f32, to: f32) -> f32 {
        lerp(from, to, self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_to_completion() {
        let mut tween = Tween::new(1.0, Easing::Linear);
        tween.play();
        assert!(!tween.tick(0.5));
        assert!((tween.lerp(0.0, 100.0) - 50.0).abs() < 0.01);
        assert!(tween.tick(0.6));
        assert_eq!(tween.progress(), 1.0);
        assert!(!tween.is_active());
    }

    #[test]
    fn reverse_runs_back_from_midway() {
        let mut tween = Tween::new(1.0, Easing::Linear);
        tween.play();
        tween.tick(0.4);
        tween.reverse();
        assert_eq!(tween.direction(), Direction::Backward);
        tween.tick(0.2);
        assert!((tween.progress() - 0.2).abs() < 1e-4);
        assert!(tween.tick(0.5));
        assert_eq!(tween.progress(), 0.0);
    }

    #[test]
    fn delay_holds_forward_start() {
        let mut tween = Tween::new(1.0, Easing::Linear).with_delay(0.3);
        tween.play();
        tween.tick(0.2);
        assert_eq!(tween.progress(), 0.0);
        tween.tick(0.6);
        assert!((tween.progress() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn reverse_inside_delay_snaps_to_start() {
        let mut tween = Tween::new(1.0, Easing::Linear).with_delay(0.5);
        tween.play();
        tween.tick(0.2);
        tween.reverse();
        assert!(!tween.is_active());
        assert_eq!(tween.progress(), 0.0);
    }
}
