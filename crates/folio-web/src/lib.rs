pub mod audio;
pub mod canvas;
pub mod dom;
pub mod prefs;
pub mod runner;

use std::cell::RefCell;

use folio_engine::{DrawInstance, InputEvent, Theme, Viewport};
use wasm_bindgen::prelude::*;

pub use runner::ExperienceRunner;

thread_local! {
    static RUNNER: RefCell<Option<ExperienceRunner>> = const { RefCell::new(None) };
    static PAGE: RefCell<Option<dom::BrowserLoop>> = const { RefCell::new(None) };
}

/// Run `f` against the live runner. `None` before `folio_init()`.
pub(crate) fn with_runner<R>(f: impl FnOnce(&mut ExperienceRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(runner) => Some(f(runner)),
        None => {
            log::warn!("folio not initialized, call folio_init() first");
            None
        }
    })
}

#[wasm_bindgen]
pub fn folio_init(config_json: &str, width: f32, height: f32, reduced_motion: bool) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let runner = ExperienceRunner::from_json(config_json, Viewport::new(width, height), reduced_motion);
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("folio: initialized");
}

#[wasm_bindgen]
pub fn folio_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

#[wasm_bindgen]
pub fn folio_pointer_down(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerDown { x, y }));
}

#[wasm_bindgen]
pub fn folio_pointer_move(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
}

/// Returns `true` when the page should call `preventDefault()` on the event.
#[wasm_bindgen]
pub fn folio_key_down(key: &str, ctrl: bool, meta: bool) -> bool {
    with_runner(|r| r.push_key(key, ctrl, meta)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn folio_scroll(y: f32) {
    with_runner(|r| r.push_input(InputEvent::Scroll { y }));
}

#[wasm_bindgen]
pub fn folio_resize(width: f32, height: f32) {
    with_runner(|r| r.push_input(InputEvent::Resize { width, height }));
}

#[wasm_bindgen]
pub fn folio_reduced_motion(matches: bool) {
    with_runner(|r| r.push_input(InputEvent::ReducedMotion { matches }));
}

#[wasm_bindgen]
pub fn folio_skip_intro() {
    with_runner(|r| r.push_input(InputEvent::SkipIntro));
}

#[wasm_bindgen]
pub fn folio_set_audio(enabled: bool) {
    with_runner(|r| r.push_input(InputEvent::SetAudio { enabled }));
}

#[wasm_bindgen]
pub fn folio_avatar_click() {
    with_runner(|r| r.push_input(InputEvent::AvatarClick));
}

/// Hand over freshly measured section geometry as JSON.
#[wasm_bindgen]
pub fn folio_layout(layout_json: &str) {
    with_runner(|r| r.push_layout(layout_json));
}

// ---- Frame output ----

#[wasm_bindgen]
pub fn folio_snapshot() -> String {
    with_runner(|r| r.snapshot_json()).unwrap_or_else(|| String::from("null"))
}

#[wasm_bindgen]
pub fn folio_take_audio() -> String {
    with_runner(|r| r.take_audio_json()).unwrap_or_else(|| String::from("[]"))
}

#[wasm_bindgen]
pub fn folio_take_nav() -> String {
    with_runner(|r| r.take_nav_json()).unwrap_or_else(|| String::from("null"))
}

#[wasm_bindgen]
pub fn get_draw_ptr() -> *const f32 {
    with_runner(|r| r.draw_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_draw_count() -> u32 {
    with_runner(|r| r.draw_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_draw_stride_floats() -> u32 {
    DrawInstance::FLOATS as u32
}

// ---- Self-driving mode ----

/// Start the built-in animation loop and listeners. Replaces a running loop.
#[wasm_bindgen]
pub fn folio_start(canvas_id: &str, audio_base: &str) -> Result<(), JsValue> {
    folio_stop();
    let page = dom::BrowserLoop::start(canvas_id, audio_base)?;
    PAGE.with(|cell| *cell.borrow_mut() = Some(page));
    Ok(())
}

#[wasm_bindgen]
pub fn folio_stop() {
    if let Some(page) = PAGE.with(|cell| cell.borrow_mut().take()) {
        page.stop();
    }
}

/// Stop everything and release the runner.
#[wasm_bindgen]
pub fn folio_shutdown() {
    folio_stop();
    with_runner(|r| r.shutdown());
    RUNNER.with(|cell| cell.borrow_mut().take());
}

// ---- Theme ----

#[wasm_bindgen]
pub fn folio_theme() -> String {
    let store = prefs::LocalStoragePreferences::open();
    Theme::load(&store, prefs::os_prefers_light()).as_str().to_owned()
}

/// Flip the persisted theme and return the new value.
#[wasm_bindgen]
pub fn folio_toggle_theme() -> String {
    let mut store = prefs::LocalStoragePreferences::open();
    let current = Theme::load(&store, prefs::os_prefers_light());
    current.toggle(&mut store).as_str().to_owned()
}
