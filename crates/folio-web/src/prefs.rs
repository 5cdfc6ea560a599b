use folio_engine::PreferenceStore;
use web_sys::Storage;

/// `localStorage`, when the browser allows it. Private windows and sandboxed
/// frames may refuse, in which case reads miss and writes are dropped.
pub struct LocalStoragePreferences {
    storage: Option<Storage>,
}

impl LocalStoragePreferences {
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage unavailable, preferences will not persist");
        }
        Self { storage }
    }
}

impl PreferenceStore for LocalStoragePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = self.storage.as_ref() {
            if storage.set_item(key, value).is_err() {
                log::warn!("could not persist {}", key);
            }
        }
    }
}

/// Whether the OS asks for a light colour scheme.
pub fn os_prefers_light() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: light)").ok().flatten())
        .is_some_and(|mq| mq.matches())
}
