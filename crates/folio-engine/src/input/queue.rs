use crate::scroll::geometry::PageLayout;
use super::keys::{Key, Modifiers};

/// Input the page forwards to the engine.
/// Browser listeners push these; the experience drains them once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A click/tap at viewport coordinates (x, y).
    PointerDown { x: f32, y: f32 },
    /// The cursor moved to viewport coordinates (x, y).
    PointerMove { x: f32, y: f32 },
    /// A key was pressed.
    KeyDown { key: Key, modifiers: Modifiers },
    /// The document scrolled to offset `y`.
    Scroll { y: f32 },
    /// The viewport changed size.
    Resize { width: f32, height: f32 },
    /// The `prefers-reduced-motion` media query changed (or was read at mount).
    ReducedMotion { matches: bool },
    /// The avatar image was clicked.
    AvatarClick,
    /// The skip button was pressed.
    SkipIntro,
    /// The sound toggle was flipped.
    SetAudio { enabled: bool },
    /// The page re-measured its sections.
    Layout(Box<PageLayout>),
}

/// A queue of input events.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events in arrival order.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain_in_order() {
        let mut q = InputQueue::new();
        q.push(InputEvent::PointerDown { x: 10.0, y: 20.0 });
        q.push(InputEvent::KeyDown { key: Key::parse("B"), modifiers: Modifiers::NONE });
        q.push(InputEvent::Scroll { y: 300.0 });
        assert_eq!(q.len(), 3);
        let events = q.drain();
        assert_eq!(events.len(), 3);
        assert!(q.is_empty());
        assert_eq!(events[1], InputEvent::KeyDown { key: Key::Char('b'), modifiers: Modifiers::NONE });
    }

    #[test]
    fn layout_event_carries_measurements() {
        let mut q = InputQueue::new();
        let layout = PageLayout { track_width: 3000.0, ..PageLayout::default() };
        q.push(InputEvent::Layout(Box::new(layout.clone())));
        let first = q.iter().next().cloned();
        match first {
            Some(InputEvent::Layout(l)) => assert_eq!(*l, layout),
            other => panic!("Expected Layout event, got {:?}", other),
        }
    }
}
