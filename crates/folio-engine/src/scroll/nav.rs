//! Keyboard section navigation and active-section detection.

use serde::Serialize;

use crate::input::keys::{Key, Modifiers};
use super::geometry::PageLayout;

/// Curriculum sections in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Hero,
    About,
    Skills,
    Affiliations,
    Experience,
    Projects,
    Recommendations,
    Contact,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Hero,
        Section::About,
        Section::Skills,
        Section::Affiliations,
        Section::Experience,
        Section::Projects,
        Section::Recommendations,
        Section::Contact,
    ];

    /// DOM id of the section element.
    pub fn id(self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::About => "about",
            Section::Skills => "skills",
            Section::Affiliations => "affiliations",
            Section::Experience => "experience",
            Section::Projects => "projects",
            Section::Recommendations => "recommendations",
            Section::Contact => "contact",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Position inside the horizontal track, for sections that live there.
    pub fn horizontal_index(self) -> Option<usize> {
        match self {
            Section::Experience => Some(0),
            Section::Projects => Some(1),
            Section::Recommendations => Some(2),
            Section::Contact => Some(3),
            _ => None,
        }
    }

    fn horizontal() -> &'static [Section] {
        &Section::ALL[4..]
    }
}

/// Document scroll offset that brings `section` to the top of the viewport.
/// `None` when the page has not reported where that section is.
pub fn scroll_target(section: Section, layout: &PageLayout) -> Option<f32> {
    match section.horizontal_index() {
        Some(h) => Some(layout.pin_top + h as f32 * layout.viewport.width),
        None => layout.vertical_sections.get(section.index()).copied(),
    }
}

/// Section the reader is looking at.
///
/// Inside the pinned track the horizontal progress picks the panel; above it,
/// the last vertical section whose top has crossed the middle of the viewport.
pub fn active_section(layout: &PageLayout, scroll_y: f32, progress: f32) -> Section {
    let half = layout.viewport.height / 2.0;
    let horizontal = Section::horizontal();
    if layout.track_width > 0.0 && layout.pin_top - scroll_y <= half && progress > 0.0 {
        let i = ((progress * horizontal.len() as f32).floor() as usize).min(horizontal.len() - 1);
        return horizontal[i];
    }
    layout
        .vertical_sections
        .iter()
        .take(4)
        .rposition(|&top| top - scroll_y <= half)
        .map_or(Section::Hero, |i| Section::ALL[i])
}

/// Where a key press asks the page to scroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavRequest {
    pub section: Section,
    pub scroll_y: f32,
}

/// Tracks the section last jumped to and turns key presses into scroll requests.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: usize,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Section {
        Section::ALL[self.current]
    }

    /// Whether `key` is a navigation shortcut, so the page should suppress
    /// the browser's own handling of it.
    pub fn owns(key: Key, modifiers: Modifiers) -> bool {
        match key {
            Key::Home | Key::End => true,
            Key::ArrowDown | Key::ArrowUp | Key::Char('j') | Key::Char('k') => !modifiers.any(),
            _ => key.digit().is_some_and(|n| (1..=8).contains(&n)),
        }
    }

    /// `None` for keys the navigator does not own, or when there is nowhere to go.
    pub fn handle_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        layout: &PageLayout,
        scroll_y: f32,
        progress: f32,
    ) -> Option<NavRequest> {
        if let Some(n) = key.digit() {
            if (1..=8).contains(&n) {
                self.current = n as usize - 1;
                return self.request(layout);
            }
            return None;
        }
        let last = Section::ALL.len() - 1;
        match key {
            Key::Home => {
                self.current = 0;
                Some(NavRequest { section: Section::Hero, scroll_y: 0.0 })
            }
            Key::End => {
                self.current = last;
                Some(NavRequest { section: Section::ALL[last], scroll_y: layout.document_height })
            }
            Key::ArrowDown | Key::Char('j') => {
                if modifiers.any() {
                    return None;
                }
                self.current = active_section(layout, scroll_y, progress).index();
                if self.current >= last {
                    return None;
                }
                self.current += 1;
                self.request(layout)
            }
            Key::ArrowUp | Key::Char('k') => {
                if modifiers.any() {
                    return None;
                }
                self.current = active_section(layout, scroll_y, progress).index();
                if self.current == 0 {
                    return None;
                }
                self.current -= 1;
                self.request(layout)
            }
            _ => None,
        }
    }

    fn request(&self, layout: &PageLayout) -> Option<NavRequest> {
        let section = self.current();
        let scroll_y = scroll_target(section, layout)?;
        log::debug!("navigate to {} at {}", section.id(), scroll_y);
        Some(NavRequest { section, scroll_y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Viewport;

    fn layout() -> PageLayout {
        PageLayout {
            viewport: Viewport::new(1000.0, 800.0),
            document_height: 9000.0,
            vertical_sections: vec![0.0, 800.0, 1600.0, 2400.0],
            pin_top: 3200.0,
            track_width: 4000.0,
            ..PageLayout::default()
        }
    }

    #[test]
    fn digits_jump_to_sections() {
        let mut nav = Navigator::new();
        let l = layout();
        let req = nav.handle_key(Key::Char('3'), Modifiers::NONE, &l, 0.0, 0.0).unwrap();
        assert_eq!(req.section, Section::Skills);
        assert_eq!(req.scroll_y, 1600.0);
        let req = nav.handle_key(Key::Char('7'), Modifiers::NONE, &l, 0.0, 0.0).unwrap();
        assert_eq!(req.section, Section::Recommendations);
        assert_eq!(req.scroll_y, 3200.0 + 2.0 * 1000.0);
        assert!(nav.handle_key(Key::Char('9'), Modifiers::NONE, &l, 0.0, 0.0).is_none());
        assert!(nav.handle_key(Key::Char('0'), Modifiers::NONE, &l, 0.0, 0.0).is_none());
    }

    #[test]
    fn home_and_end() {
        let mut nav = Navigator::new();
        let l = layout();
        assert_eq!(nav.handle_key(Key::End, Modifiers::NONE, &l, 0.0, 0.0).unwrap().scroll_y, 9000.0);
        assert_eq!(nav.current(), Section::Contact);
        assert_eq!(nav.handle_key(Key::Home, Modifiers::NONE, &l, 500.0, 0.0).unwrap().scroll_y, 0.0);
        assert_eq!(nav.current(), Section::Hero);
    }

    #[test]
    fn next_and_previous_start_from_visible_section() {
        let mut nav = Navigator::new();
        let l = layout();
        // About's top is above the middle of the viewport at 500.
        let req = nav.handle_key(Key::Char('j'), Modifiers::NONE, &l, 500.0, 0.0).unwrap();
        assert_eq!(req.section, Section::Skills);
        let req = nav.handle_key(Key::ArrowUp, Modifiers::NONE, &l, 500.0, 0.0).unwrap();
        assert_eq!(req.section, Section::Hero);
        assert!(nav.handle_key(Key::Char('k'), Modifiers::NONE, &l, 0.0, 0.0).is_none());
    }

    #[test]
    fn owned_keys_match_the_shortcuts() {
        let ctrl = Modifiers { ctrl: true, meta: false };
        assert!(Navigator::owns(Key::Char('1'), Modifiers::NONE));
        assert!(Navigator::owns(Key::Char('8'), Modifiers::NONE));
        assert!(Navigator::owns(Key::End, ctrl));
        assert!(Navigator::owns(Key::Char('j'), Modifiers::NONE));
        assert!(!Navigator::owns(Key::Char('j'), ctrl));
        assert!(!Navigator::owns(Key::ArrowDown, ctrl));
        assert!(!Navigator::owns(Key::Char('9'), Modifiers::NONE));
        assert!(!Navigator::owns(Key::Char('m'), Modifiers::NONE));
        assert!(!Navigator::owns(Key::ArrowLeft, Modifiers::NONE));
    }

    #[test]
    fn modified_arrows_are_left_to_the_browser() {
        let mut nav = Navigator::new();
        let ctrl = Modifiers { ctrl: true, meta: false };
        assert!(nav.handle_key(Key::ArrowDown, ctrl, &layout(), 0.0, 0.0).is_none());
    }

    #[test]
    fn active_section_uses_progress_inside_track() {
        let l = layout();
        assert_eq!(active_section(&l, 0.0, 0.0), Section::Hero);
        assert_eq!(active_section(&l, 2100.0, 0.0), Section::Affiliations);
        assert_eq!(active_section(&l, 4000.0, 0.3), Section::Projects);
        assert_eq!(active_section(&l, 6500.0, 1.0), Section::Contact);
    }
}
