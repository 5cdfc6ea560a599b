use serde::{Deserialize, Serialize};

/// Stages of the scripted experience, in the order they are played.
///
/// The discriminants are stable and cross the wasm boundary as plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Phase {
    /// Dark placeholder stage. Never entered by the normal flow.
    Entry = 0,
    /// Bubbles rise from the bottom of the screen.
    Emergence = 1,
    /// Bubbles drift toward the center and shrink.
    Convergence = 2,
    /// One large bubble waits for a click.
    CentralBubble = 3,
    /// The bubble bursts and fills the screen.
    Explosion = 4,
    /// Scrollable résumé layout. Terminal.
    Curriculum = 5,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Entry,
        Phase::Emergence,
        Phase::Convergence,
        Phase::CentralBubble,
        Phase::Explosion,
        Phase::Curriculum,
    ];

    /// Phase the application starts in.
    pub const INITIAL: Phase = Phase::Emergence;

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Phase> {
        Self::ALL.get(value as usize).copied()
    }

    /// The following phase, or `None` at the terminal phase.
    pub fn next(self) -> Option<Phase> {
        Phase::from_u8(self.as_u8() + 1)
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Curriculum
    }

    /// Whether the intro overlay (bubbles, skip button) is mounted.
    pub fn is_intro(self) -> bool {
        self < Phase::Curriculum
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Entry => "entry",
            Phase::Emergence => "emergence",
            Phase::Convergence => "convergence",
            Phase::CentralBubble => "central_bubble",
            Phase::Explosion => "explosion",
            Phase::Curriculum => "curriculum",
        }
    }
}

/// Named one-shot sound effects. The page maps each name to `/audio/<name>.mp3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sfx {
    Glass,
    Pop,
    Whoosh,
    HoverBubble,
}

impl Sfx {
    pub fn name(self) -> &'static str {
        match self {
            Sfx::Glass => "glass",
            Sfx::Pop => "pop",
            Sfx::Whoosh => "whoosh",
            Sfx::HoverBubble => "hoverBubble",
        }
    }
}

/// Fire-and-forget request for the audio collaborator.
/// Queued by the engine and drained by the bridge once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioCommand {
    StartAmbient,
    StopAmbient,
    PlaySfx { sfx: Sfx, volume: f32 },
}

/// Hidden triggers the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EggKind {
    /// Full ten-key sequence.
    Konami,
    /// Typed word.
    Matrix,
    /// Repeated clicks on the avatar.
    Avatar,
}

impl EggKind {
    pub fn name(self) -> &'static str {
        match self {
            EggKind::Konami => "konami",
            EggKind::Matrix => "matrix",
            EggKind::Avatar => "avatar",
        }
    }
}

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> glam::Vec2 {
        self.size() * 0.5
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_in_order_and_stops() {
        let mut phase = Phase::Entry;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(next > phase);
            phase = next;
            seen.push(phase);
        }
        assert_eq!(seen, Phase::ALL.to_vec());
        assert!(phase.is_terminal());
    }

    #[test]
    fn from_u8_rejects_out_of_range() {
        assert_eq!(Phase::from_u8(3), Some(Phase::CentralBubble));
        assert_eq!(Phase::from_u8(6), None);
    }

    #[test]
    fn audio_command_serializes_tagged() {
        let json = serde_json::to_string(&AudioCommand::PlaySfx { sfx: Sfx::HoverBubble, volume: 0.3 }).unwrap();
        assert_eq!(json, r#"{"kind":"play_sfx","sfx":"hoverBubble","volume":0.3}"#);
    }
}
