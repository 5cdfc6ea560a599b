use folio_engine::{
    AudioCommand, Experience, ExperienceConfig, InputEvent, Key, Modifiers, NavRequest, PageLayout,
    Viewport,
};

/// Owns the experience and the per-frame output the page polls.
///
/// The wasm exports keep one runner in a `thread_local!`, because wasm-bindgen
/// cannot hand a Rust struct with borrowed buffers across the boundary.
pub struct ExperienceRunner {
    experience: Experience,
    /// Audio commands from every tick since the page last asked.
    audio: Vec<AudioCommand>,
    nav: Option<NavRequest>,
}

impl ExperienceRunner {
    pub fn new(config: ExperienceConfig, viewport: Viewport, reduced_motion: bool) -> Self {
        let mut experience = Experience::new(config, viewport, reduced_motion);
        let audio = experience.drain_audio();
        Self {
            experience,
            audio,
            nav: None,
        }
    }

    /// Parse a JSON config. Anything unreadable falls back to the defaults.
    pub fn from_json(config_json: &str, viewport: Viewport, reduced_motion: bool) -> Self {
        let config = if config_json.trim().is_empty() {
            ExperienceConfig::default()
        } else {
            ExperienceConfig::from_json(config_json).unwrap_or_else(|e| {
                log::warn!("invalid config, using defaults: {}", e);
                ExperienceConfig::default()
            })
        };
        Self::new(config, viewport, reduced_motion)
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.experience.push_input(event);
    }

    /// Queue a key press. Returns `true` when navigation will act on it and
    /// the browser's default scrolling should be cancelled.
    pub fn push_key(&mut self, key: &str, ctrl: bool, meta: bool) -> bool {
        let key = Key::parse(key);
        let modifiers = Modifiers { ctrl, meta };
        let consumed = self.experience.consumes_key(key, modifiers);
        self.push_input(InputEvent::KeyDown { key, modifiers });
        consumed
    }

    /// Queue a re-measured layout. Malformed JSON is logged and dropped.
    pub fn push_layout(&mut self, layout_json: &str) {
        match PageLayout::from_json(layout_json) {
            Ok(layout) => self.push_input(InputEvent::Layout(Box::new(layout))),
            Err(e) => log::warn!("ignoring layout: {}", e),
        }
    }

    /// Run one animation frame and collect its side effects.
    pub fn tick(&mut self, dt: f32) {
        self.experience.tick(dt);
        self.audio.extend(self.experience.drain_audio());
        if let Some(request) = self.experience.take_nav_request() {
            self.nav = Some(request);
        }
    }

    pub fn shutdown(&mut self) {
        self.experience.shutdown();
        self.audio.extend(self.experience.drain_audio());
    }

    pub fn experience(&self) -> &Experience {
        &self.experience
    }

    pub fn take_audio(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.audio)
    }

    pub fn take_nav(&mut self) -> Option<NavRequest> {
        self.nav.take()
    }

    // ---- JSON accessors for the page ----

    pub fn snapshot_json(&self) -> String {
        self.experience.snapshot().to_json().unwrap_or_else(|e| {
            log::error!("snapshot serialization failed: {}", e);
            String::from("null")
        })
    }

    pub fn take_audio_json(&mut self) -> String {
        let audio = self.take_audio();
        serde_json::to_string(&audio).unwrap_or_else(|_| String::from("[]"))
    }

    pub fn take_nav_json(&mut self) -> String {
        match self.take_nav() {
            Some(request) => serde_json::to_string(&request).unwrap_or_else(|_| String::from("null")),
            None => String::from("null"),
        }
    }

    // ---- Pointer accessors for zero-copy reads ----

    pub fn draw_ptr(&self) -> *const f32 {
        self.experience.draw_buffer().ptr()
    }

    pub fn draw_count(&self) -> u32 {
        self.experience.draw_buffer().len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_engine::{Phase, Sfx};

    fn runner() -> ExperienceRunner {
        ExperienceRunner::from_json("", Viewport::new(1280.0, 720.0), false)
    }

    #[test]
    fn bad_config_falls_back_to_defaults() {
        let r = ExperienceRunner::from_json("{not json", Viewport::new(800.0, 600.0), false);
        assert_eq!(r.experience().state().phase, Phase::Emergence);
    }

    #[test]
    fn partial_config_overrides_durations() {
        let json = r#"{"phases":{"emergence_ms":500.0}}"#;
        let mut r = ExperienceRunner::from_json(json, Viewport::new(1280.0, 720.0), false);
        for _ in 0..4 {
            r.tick(0.125);
        }
        assert_eq!(r.experience().state().phase, Phase::Convergence);
    }

    #[test]
    fn audio_accumulates_until_taken() {
        let mut r = runner();
        r.push_input(InputEvent::SetAudio { enabled: true });
        r.tick(0.0);
        r.tick(0.0);
        let audio = r.take_audio();
        assert_eq!(audio[0], AudioCommand::StartAmbient);
        assert_eq!(audio[1], AudioCommand::PlaySfx { sfx: Sfx::Glass, volume: 0.3 });
        assert!(r.take_audio().is_empty());
        assert_eq!(r.take_audio_json(), "[]");
    }

    #[test]
    fn audio_json_is_tagged() {
        let mut r = runner();
        r.push_input(InputEvent::SetAudio { enabled: true });
        r.tick(0.0);
        let json = r.take_audio_json();
        assert!(json.contains(r#""kind":"start_ambient""#));
        assert!(json.contains(r#""sfx":"glass""#));
    }

    #[test]
    fn keys_are_parsed_from_dom_names() {
        let mut r = runner();
        r.push_input(InputEvent::SkipIntro);
        r.push_key("End", false, false);
        r.tick(0.0);
        let json = r.take_nav_json();
        assert!(json.contains(r#""section":"contact""#));
        assert_eq!(r.take_nav_json(), "null");
    }

    #[test]
    fn navigation_keys_report_consumption() {
        let mut r = runner();
        assert!(!r.push_key("ArrowDown", false, false));
        r.push_input(InputEvent::SkipIntro);
        r.tick(0.0);
        assert!(r.push_key("ArrowDown", false, false));
        assert!(r.push_key("5", false, false));
        assert!(!r.push_key("ArrowDown", true, false));
        assert!(!r.push_key("Tab", false, false));
    }

    #[test]
    fn malformed_layout_is_dropped() {
        let mut r = runner();
        r.push_layout("[1, 2");
        r.tick(0.0);
        assert!(!r.experience().scroll().is_pinned());

        r.push_layout(r#"{"viewport":{"width":1280.0,"height":720.0},"track_width":4000.0,"pin_top":1000.0}"#);
        r.tick(0.0);
        assert!(r.experience().scroll().is_pinned());
    }

    #[test]
    fn snapshot_and_draw_buffer_are_readable() {
        let mut r = runner();
        r.tick(1.0 / 60.0);
        assert!(r.draw_count() > 0);
        assert!(!r.draw_ptr().is_null());
        assert!(r.snapshot_json().starts_with('{'));
    }

    #[test]
    fn shutdown_flushes_stop_command() {
        let mut r = runner();
        r.push_input(InputEvent::SetAudio { enabled: true });
        r.tick(0.0);
        r.take_audio();
        r.shutdown();
        assert_eq!(r.take_audio(), vec![AudioCommand::StopAmbient]);
    }
}
