//! The whole page as one deterministic state machine.
//!
//! `Experience` owns the shared store and every component that reads or
//! writes it. The host pushes [`InputEvent`]s, calls [`Experience::tick`] once
//! per animation frame, then reads the draw buffer, the snapshot and the
//! queued audio commands.

use glam::Vec2;
use serde::Serialize;

use crate::api::config::ExperienceConfig;
use crate::api::types::{AudioCommand, EggKind, Phase, Sfx, Viewport};
use crate::core::store::{AppState, Store};
use crate::core::time::{FrameClock, VirtualClock};
use crate::effects::{Backdrop, DigitalRain, GlassBubbles, IntroScene, RenderMode, Rng};
use crate::input::eggs::EasterEggs;
use crate::input::keys::{Key, Modifiers};
use crate::input::queue::{InputEvent, InputQueue};
use crate::renderer::instance::DrawBuffer;
use crate::renderer::palette::BackgroundTransition;
use crate::scroll::controller::ScrollController;
use crate::scroll::geometry::PageLayout;
use crate::scroll::nav::{NavRequest, Navigator, Section};
use crate::scroll::reveal::{PanelPose, Pose};
use crate::sequencer::PhaseSequencer;

const GLASS_VOLUME: f32 = 0.3;
const POP_VOLUME: f32 = 0.6;
const WHOOSH_VOLUME: f32 = 0.2;
const HOVER_VOLUME: f32 = 0.3;

/// Draw slots for one frame: the configured backdrop/intro budget plus room
/// for both overlay effects at this viewport size.
fn draw_capacity(config: &ExperienceConfig, viewport: Viewport) -> usize {
    config.max_draw_instances + DigitalRain::max_instances(viewport.size()) + GlassBubbles::MAX_INSTANCES
}

pub struct Experience {
    config: ExperienceConfig,
    store: Store,
    clock: VirtualClock,
    frames: FrameClock,
    sequencer: PhaseSequencer,
    viewport: Viewport,
    background: BackgroundTransition,
    backdrop: Backdrop,
    intro: Option<IntroScene>,
    scroll: ScrollController,
    navigator: Navigator,
    eggs: EasterEggs,
    rain: Option<DigitalRain>,
    glass: Option<GlassBubbles>,
    rng: Rng,
    input: InputQueue,
    audio: Vec<AudioCommand>,
    nav: Option<NavRequest>,
    draw: DrawBuffer,
    /// Phase the components were last told about.
    phase: Phase,
    ambient_playing: bool,
    last_hover_sound_ms: Option<f64>,
    running: bool,
}

impl Experience {
    /// Mount everything. `reduced_motion` is the media query's value at load.
    pub fn new(config: ExperienceConfig, viewport: Viewport, reduced_motion: bool) -> Self {
        let mut rng = Rng::new(config.seed);
        let mut store = Store::new();
        let phase = store.phase();
        let bounds = viewport.size();
        let intro = IntroScene::new(&config.intro, config.phases.explosion_ms, viewport, &mut rng);
        let backdrop = Backdrop::mount(
            &config.dust,
            &config.sea,
            bounds,
            RenderMode::for_phase(phase),
            config.seed.wrapping_add(1),
        );
        let mut sequencer = PhaseSequencer::new(config.phases);
        sequencer.mount(&mut store, reduced_motion, 0.0);

        let mut experience = Self {
            frames: FrameClock::new(config.fixed_dt),
            eggs: EasterEggs::new(config.eggs),
            draw: DrawBuffer::with_capacity(draw_capacity(&config, viewport)),
            scroll: ScrollController::new(PageLayout { viewport, ..PageLayout::default() }),
            config,
            store,
            clock: VirtualClock::new(),
            sequencer,
            viewport,
            background: BackgroundTransition::new(phase),
            backdrop,
            intro: Some(intro),
            navigator: Navigator::new(),
            rain: None,
            glass: None,
            rng,
            input: InputQueue::new(),
            audio: Vec::new(),
            nav: None,
            phase,
            ambient_playing: false,
            last_hover_sound_ms: None,
            running: true,
        };
        experience.observe_phase();
        experience.rebuild_draw_buffer();
        log::info!("experience mounted at {}x{}", viewport.width, viewport.height);
        experience
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// One animation frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        for event in self.input.drain() {
            self.handle(event);
        }

        let now = self.clock.advance(dt as f64 * 1000.0);
        self.sequencer.advance(&mut self.store, now);
        self.observe_phase();

        let steps = self.frames.accumulate(dt);
        let step = self.frames.step();
        for _ in 0..steps {
            self.step(step);
        }
        // Scroll smoothing and tweens run on wall time, not fixed frames.
        if dt.is_finite() && dt > 0.0 {
            self.scroll.tick(dt);
            self.background.tick(dt);
            if let Some(rain) = self.rain.as_mut() {
                rain.step(dt, &mut self.rng);
            }
        }

        if let Some(expired) = self.eggs.tick(now) {
            log::debug!("easter egg {} expired", expired.name());
        }
        // Rain only shows while it is the active egg; a newer trigger replaces it.
        if self.eggs.active() != Some(EggKind::Matrix) {
            self.rain = None;
        }
        self.rebuild_draw_buffer();
    }

    fn step(&mut self, dt: f32) {
        self.backdrop.step(1.0);
        let phase = self.store.phase();
        let burst_done = match self.intro.as_mut() {
            Some(intro) => intro.step(phase, dt, 1.0),
            None => false,
        };
        if burst_done {
            self.complete_intro();
        }
        if let Some(glass) = self.glass.as_mut() {
            glass.step(1.0, &mut self.rng);
        }
    }

    fn handle(&mut self, event: InputEvent) {
        let now = self.clock.now_ms();
        match event {
            InputEvent::PointerDown { x, y } => {
                let hit = self.intro.as_ref().is_some_and(|intro| intro.hit_merged(Vec2::new(x, y)));
                if hit {
                    self.sequencer.click_central_bubble(&mut self.store, now);
                }
            }
            InputEvent::PointerMove { x, y } => {
                let entered = self.intro.as_mut().is_some_and(|intro| intro.set_hover(Vec2::new(x, y)));
                if entered {
                    self.hover_sound(now);
                }
            }
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, modifiers, now),
            InputEvent::Scroll { y } => {
                if self.store.phase() == Phase::Curriculum {
                    for _ in self.scroll.on_scroll(y, &mut self.store) {
                        self.play(Sfx::Whoosh, WHOOSH_VOLUME);
                    }
                }
            }
            InputEvent::Resize { width, height } => self.resize(Viewport::new(width, height)),
            InputEvent::ReducedMotion { matches } => {
                self.sequencer.set_reduced_motion(&mut self.store, matches, now);
            }
            InputEvent::AvatarClick => {
                self.eggs.on_avatar_click(now);
            }
            InputEvent::SkipIntro => {
                self.sequencer.skip(&mut self.store, now);
            }
            InputEvent::SetAudio { enabled } => self.set_audio(enabled),
            InputEvent::Layout(layout) => {
                let mut layout = *layout;
                layout.viewport = self.viewport;
                self.scroll.set_layout(layout, &mut self.store);
            }
        }
        self.observe_phase();
    }

    fn key_down(&mut self, key: Key, modifiers: Modifiers, now: f64) {
        match self.eggs.on_key(key, now) {
            Some(EggKind::Matrix) => self.rain = Some(DigitalRain::new(self.viewport.size())),
            Some(EggKind::Konami) if self.glass.is_none() => {
                self.glass = Some(GlassBubbles::new(self.viewport.size(), &mut self.rng));
            }
            _ => {}
        }
        if self.store.phase() == Phase::Curriculum {
            let layout = self.scroll.layout();
            if let Some(request) =
                self.navigator
                    .handle_key(key, modifiers, layout, self.scroll.scroll_y(), self.scroll.progress())
            {
                self.nav = Some(request);
            }
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.draw.ensure_capacity(draw_capacity(&self.config, viewport));
        self.backdrop.resize(viewport.size());
        if let Some(intro) = self.intro.as_mut() {
            intro.resize(viewport);
        }
        if let Some(glass) = self.glass.as_mut() {
            glass.resize(viewport.size());
        }
        if self.rain.is_some() {
            self.rain = Some(DigitalRain::new(viewport.size()));
        }
        let layout = self.scroll.layout().rescaled(viewport);
        self.scroll.set_layout(layout, &mut self.store);
    }

    fn set_audio(&mut self, enabled: bool) {
        if !self.store.set_audio_enabled(enabled) {
            return;
        }
        if enabled {
            self.intro_audio();
        } else {
            self.stop_ambient();
        }
    }

    /// Ambient loop plus a glass chime, while the intro is still playing.
    fn intro_audio(&mut self) {
        let state = *self.store.state();
        if !state.audio_enabled || state.intro_complete || !self.phase.is_intro() || self.phase == Phase::Entry {
            return;
        }
        if !self.ambient_playing {
            self.queue(AudioCommand::StartAmbient);
        }
        self.play(Sfx::Glass, GLASS_VOLUME);
    }

    fn hover_sound(&mut self, now: f64) {
        let ready = self
            .last_hover_sound_ms
            .map_or(true, |last| now - last >= self.config.intro.hover_sound_debounce_ms);
        if ready && self.store.state().audio_enabled {
            self.last_hover_sound_ms = Some(now);
            self.play(Sfx::HoverBubble, HOVER_VOLUME);
        }
    }

    fn play(&mut self, sfx: Sfx, volume: f32) {
        self.queue(AudioCommand::PlaySfx { sfx, volume });
    }

    fn stop_ambient(&mut self) {
        if self.ambient_playing {
            self.queue(AudioCommand::StopAmbient);
        }
    }

    /// Gate on the audio flag. Stopping is always allowed.
    fn queue(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::StopAmbient => self.ambient_playing = false,
            _ if !self.store.state().audio_enabled => return,
            AudioCommand::StartAmbient => self.ambient_playing = true,
            AudioCommand::PlaySfx { .. } => {}
        }
        self.audio.push(command);
    }

    /// Tell every component about a phase change, once per change.
    fn observe_phase(&mut self) {
        let phase = self.store.phase();
        if phase == self.phase && self.intro.is_some() == phase.is_intro() {
            return;
        }
        let changed = phase != self.phase;
        self.phase = phase;
        if changed {
            self.background.retarget(phase);
        }
        self.backdrop.set_mode(RenderMode::for_phase(phase));
        if let Some(intro) = self.intro.as_mut() {
            intro.enter(phase);
        }
        if phase == Phase::Explosion && changed {
            self.play(Sfx::Pop, POP_VOLUME);
        }
        if phase == Phase::Curriculum {
            self.complete_intro();
            if self.intro.take().is_some() {
                log::debug!("intro scene released");
            }
        } else if changed {
            self.intro_audio();
        }
    }

    fn complete_intro(&mut self) {
        if self.store.set_intro_complete(true) {
            log::info!("intro complete");
            self.stop_ambient();
        }
    }

    fn rebuild_draw_buffer(&mut self) {
        self.draw.clear();
        self.backdrop.draw(&mut self.draw);
        if let Some(intro) = self.intro.as_ref() {
            intro.draw(self.phase, &mut self.draw);
        }
        if let Some(rain) = self.rain.as_ref() {
            rain.draw(&mut self.draw);
        }
        if let Some(glass) = self.glass.as_ref() {
            glass.draw(&mut self.draw);
        }
        self.draw.sort_by_layer();
    }

    /// Tear down: cancel the pending timer, stop the backdrop and the ambient loop.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.sequencer.unmount();
        self.backdrop.unmount();
        self.stop_ambient();
        self.running = false;
        self.draw.clear();
        log::info!("experience unmounted");
    }

    // ---- Accessors ----

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn sequencer(&self) -> &PhaseSequencer {
        &self.sequencer
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    pub fn intro(&self) -> Option<&IntroScene> {
        self.intro.as_ref()
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn eggs(&self) -> &EasterEggs {
        &self.eggs
    }

    pub fn draw_buffer(&self) -> &DrawBuffer {
        &self.draw
    }

    /// Audio commands queued since the last drain, in order.
    pub fn drain_audio(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.audio)
    }

    /// Whether a key press would be taken over by section navigation in the
    /// current phase. Lets the page cancel scrolling before the next tick.
    pub fn consumes_key(&self, key: Key, modifiers: Modifiers) -> bool {
        self.store.phase() == Phase::Curriculum && Navigator::owns(key, modifiers)
    }

    /// Scroll request from keyboard navigation, if one is pending.
    pub fn take_nav_request(&mut self) -> Option<NavRequest> {
        self.nav.take()
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let now = self.clock.now_ms();
        FrameSnapshot {
            time_ms: now,
            state: *self.store.state(),
            phase_id: self.phase.as_u8(),
            background: self.background.current().to_css(),
            render_mode: self.backdrop.mode(),
            intro: self.intro.as_ref().map(|intro| IntroSnapshot {
                merged_visible: intro.merged().visible,
                merged_hovered: intro.merged().hovered,
                merged_radius: intro.merged().radius(),
                explosion_scale: intro.explosion().map(|e| e.scale()),
                explosion_roundness: intro.explosion().map(|e| e.roundness()),
            }),
            scroll: ScrollSnapshot {
                pinned: self.scroll.is_pinned(),
                progress: self.scroll.progress(),
                translate_x: self.scroll.translate_x(),
                progress_bar_percent: self.scroll.progress_bar_percent(),
                hero: self.scroll.hero_pose(),
                about: self.scroll.about_pose(),
                panels: self.scroll.panel_poses(),
                parallax: self.scroll.parallax_offsets(),
                active_section: self.scroll.active_section(),
            },
            active_egg: self.eggs.active(),
            egg_remaining_ms: self.eggs.remaining_ms(now),
            konami_unlocked: self.eggs.konami_unlocked(),
            draw_count: self.draw.len(),
        }
    }
}

impl std::fmt::Debug for Experience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Experience")
            .field("phase", &self.phase)
            .field("now_ms", &self.clock.now_ms())
            .field("running", &self.running)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntroSnapshot {
    pub merged_visible: bool,
    pub merged_hovered: bool,
    pub merged_radius: f32,
    pub explosion_scale: Option<f32>,
    pub explosion_roundness: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollSnapshot {
    pub pinned: bool,
    pub progress: f32,
    pub translate_x: f32,
    pub progress_bar_percent: Option<f32>,
    pub hero: Pose,
    pub about: Pose,
    pub panels: Vec<PanelPose>,
    pub parallax: Vec<f32>,
    pub active_section: Section,
}

/// Everything the DOM layer needs for one frame, as plain data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub time_ms: f64,
    pub state: AppState,
    pub phase_id: u8,
    /// CSS `background` value.
    pub background: String,
    pub render_mode: RenderMode,
    pub intro: Option<IntroSnapshot>,
    pub scroll: ScrollSnapshot,
    pub active_egg: Option<EggKind>,
    pub egg_remaining_ms: f64,
    pub konami_unlocked: bool,
    pub draw_count: usize,
}

impl FrameSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
