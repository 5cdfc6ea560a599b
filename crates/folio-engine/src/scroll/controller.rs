//! Maps vertical page scroll onto the pinned horizontal track.
//!
//! The controller is the only writer of the track translation. Scroll events
//! move the target; [`ScrollController::tick`] moves the rendered value toward
//! it. Resize only swaps the layout and re-derives geometry.

use crate::core::store::Store;
use crate::extensions::easing::Easing;
use super::geometry::{PageLayout, TrackGeometry};
use super::nav::{Section, active_section};
use super::reveal::{HEADING_TRIGGER, ITEMS_TRIGGER, PanelPose, PanelReveal, Pose, ScrubBinding};

/// Seconds the rendered track needs to catch up with the scroll position.
pub const SCRUB_SECS: f32 = 1.0;
/// Rendered translation closer than this to the target snaps onto it.
const SNAP_PX: f32 = 0.01;
const PARALLAX_STEP: f32 = 0.05;

#[derive(Debug, Clone)]
pub struct ScrollController {
    layout: PageLayout,
    geometry: Option<TrackGeometry>,
    scroll_y: f32,
    progress: f32,
    target_x: f32,
    rendered_x: f32,
    hero: ScrubBinding,
    about: ScrubBinding,
    panels: Vec<PanelReveal>,
}

impl ScrollController {
    pub fn new(layout: PageLayout) -> Self {
        let mut controller = Self {
            layout: PageLayout::default(),
            geometry: None,
            scroll_y: 0.0,
            progress: 0.0,
            target_x: 0.0,
            rendered_x: 0.0,
            hero: hero_binding(&PageLayout::default()),
            about: about_binding(&PageLayout::default()),
            panels: Vec::new(),
        };
        controller.rebuild(layout);
        controller
    }

    /// Swap in a freshly measured layout and re-derive every distance and
    /// threshold. Reveal playheads survive when the panel structure is unchanged.
    pub fn set_layout(&mut self, layout: PageLayout, store: &mut Store) {
        self.rebuild(layout);
        self.publish(store);
    }

    fn rebuild(&mut self, layout: PageLayout) {
        self.geometry = TrackGeometry::measure(&layout);
        self.hero = hero_binding(&layout);
        self.about = about_binding(&layout);

        let same_shape = self.panels.len() == layout.panels.len()
            && self.panels.iter().zip(&layout.panels).all(|(r, p)| r.item_count() == p.items);

        match self.geometry {
            Some(geometry) => {
                log::debug!("track pinned: distance {} from {}", geometry.distance, geometry.pin_top);
                let thresholds = layout.panels.iter().map(|p| {
                    (geometry.threshold_for(p, HEADING_TRIGGER), geometry.threshold_for(p, ITEMS_TRIGGER))
                });
                if same_shape {
                    for (reveal, (heading, items)) in self.panels.iter_mut().zip(thresholds) {
                        reveal.set_thresholds(heading, items);
                    }
                } else {
                    self.panels = thresholds.zip(&layout.panels).map(|((h, i), p)| PanelReveal::new(h, i, p.items)).collect();
                    let raw = geometry.raw_progress(self.scroll_y);
                    for reveal in self.panels.iter_mut() {
                        reveal.sync(raw);
                    }
                }
            }
            None => {
                if layout.track_width > 0.0 {
                    log::warn!(
                        "track ({}px) fits the viewport ({}px); horizontal scroll disabled",
                        layout.track_width,
                        layout.viewport.width
                    );
                }
                // Plain vertical flow: panels show in their resting state.
                if !same_shape {
                    self.panels = layout.panels.iter().map(|p| PanelReveal::new(0.0, 0.0, p.items)).collect();
                }
                for reveal in self.panels.iter_mut() {
                    reveal.sync(f32::INFINITY);
                }
            }
        }
        self.layout = layout;
        self.recompute();
        if self.geometry.is_some() {
            let raw = self.raw_progress();
            for reveal in self.panels.iter_mut() {
                reveal.update(raw);
            }
        } else {
            self.rendered_x = 0.0;
        }
    }

    fn recompute(&mut self) {
        match self.geometry {
            Some(geometry) => {
                self.progress = geometry.progress(self.scroll_y);
                self.target_x = geometry.translate_x(self.progress);
            }
            None => {
                self.progress = 0.0;
                self.target_x = 0.0;
            }
        }
    }

    fn raw_progress(&self) -> f32 {
        self.geometry.map_or(0.0, |g| g.raw_progress(self.scroll_y))
    }

    fn publish(&self, store: &mut Store) {
        store.set_scroll_progress(self.progress);
    }

    /// Record a new scroll offset. Returns the panels that entered on a
    /// forward crossing.
    pub fn on_scroll(&mut self, scroll_y: f32, store: &mut Store) -> Vec<usize> {
        if !scroll_y.is_finite() {
            return Vec::new();
        }
        self.scroll_y = scroll_y;
        self.recompute();
        self.publish(store);
        if self.geometry.is_none() {
            return Vec::new();
        }
        let raw = self.raw_progress();
        self.panels
            .iter_mut()
            .enumerate()
            .filter_map(|(i, reveal)| reveal.update(raw).then_some(i))
            .collect()
    }

    /// Advance the scrub smoothing and the reveal tweens by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if dt > 0.0 {
            let rate = 100f32.ln() / SCRUB_SECS;
            let follow = 1.0 - (-rate * dt).exp();
            self.rendered_x += (self.target_x - self.rendered_x) * follow;
            if (self.target_x - self.rendered_x).abs() < SNAP_PX {
                self.rendered_x = self.target_x;
            }
            for reveal in self.panels.iter_mut() {
                reveal.tick(dt);
            }
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn geometry(&self) -> Option<&TrackGeometry> {
        self.geometry.as_ref()
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    /// Horizontal progress in [0, 1].
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Track translation to render this frame.
    pub fn translate_x(&self) -> f32 {
        self.rendered_x
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    pub fn hero_pose(&self) -> Pose {
        self.hero.pose(self.scroll_y)
    }

    pub fn about_pose(&self) -> Pose {
        self.about.pose(self.scroll_y)
    }

    pub fn panel_poses(&self) -> Vec<PanelPose> {
        self.panels.iter().map(PanelReveal::pose).collect()
    }

    pub fn panels(&self) -> &[PanelReveal] {
        &self.panels
    }

    /// Vertical offset per background layer; deeper layers move faster.
    pub fn parallax_offsets(&self) -> Vec<f32> {
        (0..self.layout.parallax_layers)
            .map(|i| self.scroll_y * (i as f32 + 1.0) * PARALLAX_STEP)
            .collect()
    }

    /// Progress bar width in percent, hidden at zero.
    pub fn progress_bar_percent(&self) -> Option<f32> {
        (self.progress > 0.0).then(|| self.progress * 100.0)
    }

    pub fn active_section(&self) -> Section {
        active_section(&self.layout, self.scroll_y, self.progress)
    }
}

/// Hero content floats up and fades out while the hero scrolls off the top.
fn hero_binding(layout: &PageLayout) -> ScrubBinding {
    ScrubBinding {
        start: layout.hero.top,
        end: layout.hero.bottom(),
        from: Pose::REST,
        to: Pose::new(-80.0, 0.0, 1.0),
        easing: Easing::Linear,
    }
}

/// About content slides in while its top moves from 80% to 30% of the viewport.
fn about_binding(layout: &PageLayout) -> ScrubBinding {
    let vh = layout.viewport.height;
    ScrubBinding {
        start: layout.about.top - 0.8 * vh,
        end: layout.about.top - 0.3 * vh,
        from: Pose::new(100.0, 0.0, 1.0),
        to: Pose::REST,
        easing: Easing::Power2Out,
    }
}
