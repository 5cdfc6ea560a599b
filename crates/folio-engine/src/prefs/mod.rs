//! Persisted user preferences. Only the colour theme is stored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key under which the theme is saved.
pub const THEME_KEY: &str = "theme";

/// String key-value storage that outlives the page (browser `localStorage`).
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-process store for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Theme> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Saved theme if there is a valid one, else light when the OS asks for it, else dark.
    pub fn load(store: &dyn PreferenceStore, os_prefers_light: bool) -> Theme {
        match store.get(THEME_KEY).as_deref().and_then(Theme::parse) {
            Some(theme) => theme,
            None if os_prefers_light => Theme::Light,
            None => Theme::Dark,
        }
    }

    pub fn save(self, store: &mut dyn PreferenceStore) {
        store.set(THEME_KEY, self.as_str());
    }

    /// Flip, persist and return the new theme.
    pub fn toggle(self, store: &mut dyn PreferenceStore) -> Theme {
        let next = self.toggled();
        next.save(store);
        log::debug!("theme -> {}", next.as_str());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_dark_without_saved_value() {
        let store = MemoryPreferences::new();
        assert_eq!(Theme::load(&store, false), Theme::Dark);
        assert_eq!(Theme::load(&store, true), Theme::Light);
    }

    #[test]
    fn saved_value_beats_os_preference() {
        let mut store = MemoryPreferences::new();
        Theme::Dark.save(&mut store);
        assert_eq!(Theme::load(&store, true), Theme::Dark);
    }

    #[test]
    fn garbage_falls_back() {
        let mut store = MemoryPreferences::new();
        store.set(THEME_KEY, "sepia");
        assert_eq!(Theme::load(&store, false), Theme::Dark);
    }

    #[test]
    fn toggle_persists() {
        let mut store = MemoryPreferences::new();
        let theme = Theme::load(&store, false).toggle(&mut store);
        assert_eq!(theme, Theme::Light);
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(Theme::load(&store, false), Theme::Light);
    }
}
