//! Page measurements handed over by the DOM, and everything derived from them.
//!
//! Nothing here is cached across a resize: the controller rebuilds its
//! [`TrackGeometry`] from whatever layout it is handed.

use serde::{Deserialize, Serialize};

use crate::api::types::Viewport;

/// Vertical extent of a block in document coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Span {
    pub top: f32,
    pub height: f32,
}

impl Span {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// One panel inside the horizontal track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelLayout {
    /// Left edge relative to the track's left edge.
    pub left: f32,
    pub width: f32,
    /// Number of staggered items in the panel.
    pub items: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub viewport: Viewport,
    pub document_height: f32,
    pub hero: Span,
    pub about: Span,
    /// Document tops of the vertical sections, in navigation order.
    pub vertical_sections: Vec<f32>,
    /// Document top of the pinned wrapper.
    pub pin_top: f32,
    /// Full scroll width of the horizontal track.
    pub track_width: f32,
    pub panels: Vec<PanelLayout>,
    pub parallax_layers: usize,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            document_height: 0.0,
            hero: Span::default(),
            about: Span::default(),
            vertical_sections: Vec::new(),
            pin_top: 0.0,
            track_width: 0.0,
            panels: Vec::new(),
            parallax_layers: 0,
        }
    }
}

impl PageLayout {
    /// Parse a layout measured by the page.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Stand-in until the page re-measures after a resize. Panels are
    /// viewport-wide, so horizontal extents scale with the width. Vertical
    /// offsets are kept as they were.
    pub fn rescaled(&self, viewport: Viewport) -> PageLayout {
        let mut layout = self.clone();
        layout.viewport = viewport;
        if self.viewport.width > 0.0 && viewport.width > 0.0 {
            let ratio = viewport.width / self.viewport.width;
            layout.track_width *= ratio;
            for panel in &mut layout.panels {
                panel.left *= ratio;
                panel.width *= ratio;
            }
        }
        layout
    }
}

/// Derived pinning geometry for the horizontal track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    /// Horizontal distance the track travels. Also the pinned scroll length.
    pub distance: f32,
    pub pin_top: f32,
    pub viewport_width: f32,
}

impl TrackGeometry {
    /// `None` when the track fits inside the viewport: nothing is pinned.
    pub fn measure(layout: &PageLayout) -> Option<TrackGeometry> {
        let distance = layout.track_width - layout.viewport.width;
        if distance.is_nan() || distance <= 0.0 {
            return None;
        }
        Some(TrackGeometry {
            distance,
            pin_top: layout.pin_top,
            viewport_width: layout.viewport.width,
        })
    }

    pub fn pin_end(&self) -> f32 {
        self.pin_top + self.distance
    }

    /// Position within the pinned region as a fraction, unclamped.
    /// Negative before the pin starts, above 1 after it ends.
    pub fn raw_progress(&self, scroll_y: f32) -> f32 {
        (scroll_y - self.pin_top) / self.distance
    }

    pub fn progress(&self, scroll_y: f32) -> f32 {
        self.raw_progress(scroll_y).clamp(0.0, 1.0)
    }

    /// Track translation for a progress value.
    pub fn translate_x(&self, progress: f32) -> f32 {
        -self.distance * progress
    }

    /// Raw progress at which a panel's left edge reaches `viewport_fraction`
    /// of the viewport width.
    pub fn threshold_for(&self, panel: &PanelLayout, viewport_fraction: f32) -> f32 {
        (panel.left - viewport_fraction * self.viewport_width) / self.distance
    }

    /// Document scroll offset that brings horizontal panel `index` into view.
    pub fn scroll_for_panel(&self, index: usize) -> f32 {
        self.pin_top + index as f32 * self.viewport_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(track_width: f32) -> PageLayout {
        PageLayout {
            viewport: Viewport::new(1000.0, 800.0),
            pin_top: 2000.0,
            track_width,
            ..PageLayout::default()
        }
    }

    #[test]
    fn rescaling_follows_the_viewport_width() {
        let mut l = layout(4000.0);
        l.panels = (0..4).map(|i| PanelLayout { left: i as f32 * 1000.0, width: 1000.0, items: 2 }).collect();
        let narrow = l.rescaled(Viewport::new(500.0, 900.0));
        assert_eq!(narrow.viewport, Viewport::new(500.0, 900.0));
        assert_eq!(narrow.track_width, 2000.0);
        assert_eq!(narrow.panels[3], PanelLayout { left: 1500.0, width: 500.0, items: 2 });
        assert_eq!(narrow.pin_top, 2000.0);
        assert_eq!(TrackGeometry::measure(&narrow).map(|g| g.distance), Some(1500.0));
    }

    #[test]
    fn rescaling_from_a_zero_width_keeps_extents() {
        let l = PageLayout { viewport: Viewport::new(0.0, 0.0), track_width: 3000.0, ..PageLayout::default() };
        let r = l.rescaled(Viewport::new(640.0, 480.0));
        assert_eq!(r.track_width, 3000.0);
        assert_eq!(r.viewport, Viewport::new(640.0, 480.0));
    }

    #[test]
    fn no_pinning_when_track_fits() {
        assert!(TrackGeometry::measure(&layout(1000.0)).is_none());
        assert!(TrackGeometry::measure(&layout(600.0)).is_none());
        assert!(TrackGeometry::measure(&layout(f32::NAN)).is_none());
    }

    #[test]
    fn progress_is_linear_and_clamped() {
        let g = TrackGeometry::measure(&layout(4000.0)).unwrap();
        assert_eq!(g.distance, 3000.0);
        assert_eq!(g.progress(1000.0), 0.0);
        assert_eq!(g.progress(2000.0), 0.0);
        assert_eq!(g.progress(3500.0), 0.5);
        assert_eq!(g.progress(5000.0), 1.0);
        assert_eq!(g.progress(9000.0), 1.0);
        assert_eq!(g.translate_x(0.5), -1500.0);
    }

    #[test]
    fn panel_thresholds() {
        let g = TrackGeometry::measure(&layout(4000.0)).unwrap();
        let panel = PanelLayout { left: 2000.0, width: 1000.0, items: 3 };
        // Left edge at 80% of a 1000px viewport once the track moved 1200px.
        assert!((g.threshold_for(&panel, 0.8) - 0.4).abs() < 1e-6);
        assert_eq!(g.scroll_for_panel(2), 4000.0);
    }

    #[test]
    fn layout_json_fills_missing_fields() {
        let parsed = PageLayout::from_json(r#"{"track_width": 3000, "panels": [{"left": 0, "width": 800, "items": 2}]}"#)
            .unwrap();
        assert_eq!(parsed.track_width, 3000.0);
        assert_eq!(parsed.panels.len(), 1);
        assert_eq!(parsed.viewport, Viewport::default());
    }
}
