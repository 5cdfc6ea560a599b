use std::collections::HashMap;

use folio_engine::{AudioCommand, Sfx};
use web_sys::HtmlAudioElement;

const AMBIENT_VOLUME: f64 = 0.3;
const FADE_IN_SECS: f64 = 2.0;
const FADE_OUT_SECS: f64 = 1.0;

/// Plays engine audio commands through `<audio>` elements loaded from `base`.
/// Elements are created lazily, on the first command that needs them.
pub struct AudioPlayer {
    base: String,
    ambient: Option<HtmlAudioElement>,
    /// Volume the ambient loop is fading toward.
    ambient_target: f64,
    sfx: HashMap<Sfx, HtmlAudioElement>,
}

impl AudioPlayer {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_owned(),
            ambient: None,
            ambient_target: 0.0,
            sfx: HashMap::new(),
        }
    }

    fn load(&self, name: &str) -> Option<HtmlAudioElement> {
        match HtmlAudioElement::new_with_src(&format!("{}/{}.mp3", self.base, name)) {
            Ok(el) => Some(el),
            Err(e) => {
                log::warn!("cannot load audio {}: {:?}", name, e);
                None
            }
        }
    }

    pub fn apply(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::StartAmbient => self.start_ambient(),
            AudioCommand::StopAmbient => self.ambient_target = 0.0,
            AudioCommand::PlaySfx { sfx, volume } => self.play(sfx, volume),
        }
    }

    fn start_ambient(&mut self) {
        if self.ambient.is_none() {
            self.ambient = self.load("ambient");
            if let Some(el) = self.ambient.as_ref() {
                el.set_loop(true);
                el.set_volume(0.0);
            }
        }
        if let Some(el) = self.ambient.as_ref() {
            if el.paused() {
                // Autoplay rejections surface as a rejected promise; nothing to retry.
                let _ = el.play();
            }
            self.ambient_target = AMBIENT_VOLUME;
        }
    }

    fn play(&mut self, sfx: Sfx, volume: f32) {
        if !self.sfx.contains_key(&sfx) {
            let Some(el) = self.load(sfx.name()) else { return };
            self.sfx.insert(sfx, el);
        }
        if let Some(el) = self.sfx.get(&sfx) {
            el.set_volume(volume.clamp(0.0, 1.0) as f64);
            el.set_current_time(0.0);
            let _ = el.play();
        }
    }

    /// Ramp the ambient loop toward its target; pause it once silent.
    pub fn tick(&mut self, dt: f64) {
        let Some(el) = self.ambient.as_ref() else { return };
        if el.paused() {
            return;
        }
        let volume = el.volume();
        let next = if volume < self.ambient_target {
            (volume + dt * AMBIENT_VOLUME / FADE_IN_SECS).min(self.ambient_target)
        } else {
            (volume - dt * AMBIENT_VOLUME / FADE_OUT_SECS).max(self.ambient_target)
        };
        el.set_volume(next.clamp(0.0, 1.0));
        if next <= 0.0 && self.ambient_target <= 0.0 {
            let _ = el.pause();
        }
    }

    /// Silence everything immediately.
    pub fn stop_all(&mut self) {
        if let Some(el) = self.ambient.as_ref() {
            let _ = el.pause();
        }
        for el in self.sfx.values() {
            let _ = el.pause();
        }
        self.ambient_target = 0.0;
    }
}
