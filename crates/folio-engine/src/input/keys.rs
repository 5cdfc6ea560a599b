/// A key as reported by `KeyboardEvent.key`, reduced to what the page reacts to.
///
/// Single characters are lowercased on parse, so `"B"` and `"b"` are the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    /// Any named key we do not care about (Shift, Tab, F5, ...).
    Other,
}

impl Key {
    pub fn parse(key: &str) -> Key {
        let mut chars = key.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Key::Char(c.to_lowercase().next().unwrap_or(c));
        }
        match key {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Home" => Key::Home,
            "End" => Key::End,
            _ => Key::Other,
        }
    }

    /// The lowercase ASCII letter this key types, if any.
    pub fn letter(self) -> Option<char> {
        match self {
            Key::Char(c) if c.is_ascii_alphabetic() => Some(c),
            _ => None,
        }
    }

    /// `1`..`9` as a number.
    pub fn digit(self) -> Option<u32> {
        match self {
            Key::Char(c) => c.to_digit(10),
            _ => None,
        }
    }
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false, meta: false };

    pub fn any(self) -> bool {
        self.ctrl || self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lowercases_single_chars() {
        assert_eq!(Key::parse("B"), Key::Char('b'));
        assert_eq!(Key::parse("a"), Key::Char('a'));
        assert_eq!(Key::parse("7"), Key::Char('7'));
        assert_eq!(Key::parse(" "), Key::Char(' '));
    }

    #[test]
    fn parse_named_keys() {
        assert_eq!(Key::parse("ArrowUp"), Key::ArrowUp);
        assert_eq!(Key::parse("End"), Key::End);
        assert_eq!(Key::parse("Shift"), Key::Other);
        assert_eq!(Key::parse(""), Key::Other);
    }

    #[test]
    fn letters_and_digits() {
        assert_eq!(Key::parse("M").letter(), Some('m'));
        assert_eq!(Key::parse("4").letter(), None);
        assert_eq!(Key::parse("4").digit(), Some(4));
        assert_eq!(Key::ArrowLeft.digit(), None);
    }
}
