//! Scroll-bound entrance animations.
//!
//! Two kinds of binding:
//! - [`ScrubBinding`]: pose is a direct function of scroll position (no time).
//! - [`PanelReveal`]: crossing a threshold plays timed tweens forward, crossing
//!   back reverses them. Toggle, not one-shot.

use serde::Serialize;

use crate::extensions::easing::{Easing, lerp, progress_between};
use crate::extensions::tween::Tween;

/// Transform and opacity applied to one animated element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    pub y: f32,
    pub opacity: f32,
    pub scale: f32,
}

impl Pose {
    pub const REST: Pose = Pose { y: 0.0, opacity: 1.0, scale: 1.0 };

    pub const fn new(y: f32, opacity: f32, scale: f32) -> Self {
        Self { y, opacity, scale }
    }

    pub fn lerp(self, other: Pose, t: f32) -> Pose {
        Pose {
            y: lerp(self.y, other.y, t),
            opacity: lerp(self.opacity, other.opacity, t),
            scale: lerp(self.scale, other.scale, t),
        }
    }
}

/// Pose scrubbed between two scroll offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrubBinding {
    pub start: f32,
    pub end: f32,
    pub from: Pose,
    pub to: Pose,
    pub easing: Easing,
}

impl ScrubBinding {
    pub fn pose(&self, scroll_y: f32) -> Pose {
        let t = progress_between(scroll_y, self.start, self.end);
        self.from.lerp(self.to, self.easing.apply(t))
    }
}

/// Viewport fraction the panel's left edge must reach before the heading plays.
pub const HEADING_TRIGGER: f32 = 0.8;
/// Viewport fraction for the staggered items.
pub const ITEMS_TRIGGER: f32 = 0.7;

const HEADING_FROM: Pose = Pose::new(40.0, 0.0, 1.0);
const HEADING_SECS: f32 = 0.8;
const ITEM_FROM: Pose = Pose::new(50.0, 0.0, 0.95);
const ITEM_SECS: f32 = 0.7;
const ITEM_STAGGER: f32 = 0.1;
const REVEAL_EASING: Easing = Easing::Power3Out;

/// A threshold that plays its tweens when crossed forward and reverses them
/// when crossed back.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleTrigger {
    pub threshold: f32,
    active: bool,
    tweens: Vec<Tween>,
}

impl ToggleTrigger {
    fn new(threshold: f32, tweens: Vec<Tween>) -> Self {
        Self { threshold, active: false, tweens }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns true on a forward crossing.
    fn update(&mut self, raw_progress: f32) -> bool {
        let now = raw_progress >= self.threshold;
        if now == self.active {
            return false;
        }
        self.active = now;
        for tween in self.tweens.iter_mut() {
            if now {
                tween.play();
            } else {
                tween.reverse();
            }
        }
        now
    }

    fn tick(&mut self, dt: f32) {
        for tween in self.tweens.iter_mut() {
            tween.tick(dt);
        }
    }

    /// Jump to the resting state matching the current side of the threshold.
    fn settle(&mut self) {
        for tween in self.tweens.iter_mut() {
            if self.active {
                tween.finish();
            } else {
                tween.rewind();
            }
        }
    }

    fn is_animating(&self) -> bool {
        self.tweens.iter().any(Tween::is_active)
    }
}

/// Heading and item entrance for one horizontal panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelReveal {
    pub heading: ToggleTrigger,
    pub items: ToggleTrigger,
}

/// Poses for one panel, ready to apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelPose {
    pub heading: Pose,
    pub items: Vec<Pose>,
}

impl PanelReveal {
    pub fn new(heading_threshold: f32, items_threshold: f32, item_count: usize) -> Self {
        let items = (0..item_count)
            .map(|i| Tween::new(ITEM_SECS, REVEAL_EASING).with_delay(i as f32 * ITEM_STAGGER))
            .collect();
        Self {
            heading: ToggleTrigger::new(heading_threshold, vec![Tween::new(HEADING_SECS, REVEAL_EASING)]),
            items: ToggleTrigger::new(items_threshold, items),
        }
    }

    /// Move thresholds after a re-measure. Tweens keep their playheads.
    pub fn set_thresholds(&mut self, heading: f32, items: f32) {
        self.heading.threshold = heading;
        self.items.threshold = items;
    }

    pub fn item_count(&self) -> usize {
        self.items.tweens.len()
    }

    /// Returns true when the panel enters on a forward crossing of the heading threshold.
    pub fn update(&mut self, raw_progress: f32) -> bool {
        let entered = self.heading.update(raw_progress);
        self.items.update(raw_progress);
        entered
    }

    /// Align with the current scroll position without animating or reporting entries.
    pub fn sync(&mut self, raw_progress: f32) {
        self.heading.active = raw_progress >= self.heading.threshold;
        self.items.active = raw_progress >= self.items.threshold;
        self.heading.settle();
        self.items.settle();
    }

    pub fn tick(&mut self, dt: f32) {
        self.heading.tick(dt);
        self.items.tick(dt);
    }

    pub fn is_animating(&self) -> bool {
        self.heading.is_animating() || self.items.is_animating()
    }

    pub fn pose(&self) -> PanelPose {
        let heading = self.heading.tweens.first().map_or(HEADING_FROM, |t| HEADING_FROM.lerp(Pose::REST, t.value()));
        PanelPose {
            heading,
            items: self
                .items
                .tweens
                .iter()
                .map(|t| ITEM_FROM.lerp(Pose::REST, t.value()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_follows_scroll_both_ways() {
        let hero = ScrubBinding {
            start: 0.0,
            end: 800.0,
            from: Pose::REST,
            to: Pose::new(-80.0, 0.0, 1.0),
            easing: Easing::Linear,
        };
        assert_eq!(hero.pose(-50.0), Pose::REST);
        let mid = hero.pose(400.0);
        assert!((mid.y + 40.0).abs() < 1e-4);
        assert!((mid.opacity - 0.5).abs() < 1e-4);
        assert_eq!(hero.pose(2000.0).opacity, 0.0);
        assert_eq!(hero.pose(400.0), mid);
    }

    #[test]
    fn crossing_forward_plays_and_back_reverses() {
        let mut panel = PanelReveal::new(0.4, 0.5, 3);
        assert!(!panel.update(0.3));
        assert_eq!(panel.pose().heading.opacity, 0.0);

        assert!(panel.update(0.45));
        assert!(panel.heading.is_active());
        assert!(!panel.items.is_active());
        for _ in 0..60 {
            panel.tick(1.0 / 60.0);
        }
        assert_eq!(panel.pose().heading, Pose::REST);

        assert!(!panel.update(0.2));
        assert!(!panel.heading.is_active());
        for _ in 0..60 {
            panel.tick(1.0 / 60.0);
        }
        assert_eq!(panel.pose().heading.opacity, 0.0);
    }

    #[test]
    fn items_stagger() {
        let mut panel = PanelReveal::new(0.0, 0.0, 3);
        panel.update(1.0);
        panel.tick(0.15);
        let pose = panel.pose();
        assert!(pose.items[0].opacity > pose.items[1].opacity);
        assert_eq!(pose.items[2].opacity, 0.0);
        for _ in 0..120 {
            panel.tick(1.0 / 60.0);
        }
        for item in panel.pose().items {
            assert_eq!(item.opacity, 1.0);
            assert_eq!(item.y, 0.0);
            assert!((item.scale - 1.0).abs() < 1e-6);
        }
        assert!(!panel.is_animating());
    }

    #[test]
    fn repeated_updates_on_same_side_do_nothing() {
        let mut panel = PanelReveal::new(0.4, 0.5, 1);
        assert!(panel.update(0.6));
        assert!(!panel.update(0.7));
        assert!(!panel.update(0.9));
    }

    #[test]
    fn sync_settles_without_entry() {
        let mut panel = PanelReveal::new(0.1, 0.2, 2);
        panel.sync(0.5);
        assert!(!panel.is_animating());
        assert_eq!(panel.pose().heading, Pose::REST);
        assert!(!panel.update(0.6));
    }
}
