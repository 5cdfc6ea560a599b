//! Self-driving mode: the crate owns the animation loop and the listeners.
//!
//! Pages that prefer to drive the engine from JavaScript can ignore this
//! module and call the `folio_*` exports directly.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use folio_engine::experience::ScrollSnapshot;
use folio_engine::scroll::Pose;
use folio_engine::{FrameSnapshot, InputEvent, NavRequest, PageLayout, PanelLayout, Section, Span, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlCanvasElement, HtmlElement, KeyboardEvent,
    MediaQueryListEvent, MouseEvent, NodeList, ScrollBehavior, ScrollToOptions, Window,
};

use crate::audio::AudioPlayer;
use crate::canvas::CanvasPainter;

/// Element ids the loop writes to. Missing elements are skipped.
pub const TRACK_ID: &str = "horizontal-track";
pub const PROGRESS_ID: &str = "scroll-progress";
/// Wrapper around the track. Its height is set to the pinned scroll length.
pub const PIN_ID: &str = "horizontal-pin";

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

fn listen(
    target: &EventTarget,
    kind: &'static str,
    handler: impl FnMut(Event) + 'static,
) -> Result<Listener, JsValue> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
    Ok(Listener {
        target: target.clone(),
        kind,
        closure,
    })
}

fn push(event: InputEvent) {
    crate::with_runner(|r| r.push_input(event));
}

fn viewport_of(window: &Window) -> (f32, f32) {
    let px = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    (px(window.inner_width()), px(window.inner_height()))
}

fn is_text_field(event: &Event) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA"))
}

/// What a frame hands back to the DOM once the runner borrow is released.
struct FrameOutput {
    snapshot: FrameSnapshot,
    audio: Vec<folio_engine::AudioCommand>,
    nav: Option<NavRequest>,
}

/// Running loop plus every listener it installed. [`BrowserLoop::stop`] undoes all of it.
pub struct BrowserLoop {
    window: Window,
    listeners: Vec<Listener>,
    frame: FrameCallback,
    raf_id: Rc<Cell<Option<i32>>>,
    running: Rc<Cell<bool>>,
    audio: Rc<RefCell<AudioPlayer>>,
}

impl BrowserLoop {
    pub fn start(canvas_id: &str, audio_base: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let painter = document
            .get_element_by_id(canvas_id)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            .and_then(CanvasPainter::attach);
        if painter.is_none() {
            log::warn!("no usable canvas #{}, running without backdrop", canvas_id);
        }

        let audio = Rc::new(RefCell::new(AudioPlayer::new(audio_base)));
        let running = Rc::new(Cell::new(true));
        let raf_id = Rc::new(Cell::new(None));
        let mut listeners = Vec::new();

        let target: &EventTarget = window.as_ref();
        {
            let w = window.clone();
            listeners.push(listen(target, "scroll", move |_| {
                push(InputEvent::Scroll { y: w.scroll_y().unwrap_or(0.0) as f32 });
            })?);
        }
        let elements = Rc::new(RefCell::new(PageElements::default()));
        {
            let w = window.clone();
            let els = elements.clone();
            listeners.push(listen(target, "resize", move |_| {
                let (width, height) = viewport_of(&w);
                push(InputEvent::Resize { width, height });
                remeasure(&w, &els);
            })?);
        }
        {
            // Fonts and images can move sections after the first measurement.
            let w = window.clone();
            let els = elements.clone();
            listeners.push(listen(target, "load", move |_| remeasure(&w, &els))?);
        }
        listeners.push(listen(target, "keydown", |e| {
            if is_text_field(&e) {
                return;
            }
            if let Some(k) = e.dyn_ref::<KeyboardEvent>() {
                let consumed = crate::with_runner(|r| r.push_key(&k.key(), k.ctrl_key(), k.meta_key()));
                if consumed == Some(true) {
                    e.prevent_default();
                }
            }
        })?);
        listeners.push(listen(target, "pointermove", |e| {
            if let Some(m) = e.dyn_ref::<MouseEvent>() {
                push(InputEvent::PointerMove { x: m.client_x() as f32, y: m.client_y() as f32 });
            }
        })?);
        listeners.push(listen(target, "click", |e| {
            if let Some(m) = e.dyn_ref::<MouseEvent>() {
                push(InputEvent::PointerDown { x: m.client_x() as f32, y: m.client_y() as f32 });
            }
        })?);
        if let Ok(Some(query)) = window.match_media("(prefers-reduced-motion: reduce)") {
            push(InputEvent::ReducedMotion { matches: query.matches() });
            listeners.push(listen(query.as_ref(), "change", |e| {
                if let Some(q) = e.dyn_ref::<MediaQueryListEvent>() {
                    push(InputEvent::ReducedMotion { matches: q.matches() });
                }
            })?);
        }

        let (width, height) = viewport_of(&window);
        push(InputEvent::Resize { width, height });
        remeasure(&window, &elements);
        push(InputEvent::Scroll { y: window.scroll_y().unwrap_or(0.0) as f32 });

        let frame: FrameCallback = Rc::new(RefCell::new(None));
        {
            let next = frame.clone();
            let w = window.clone();
            let raf = raf_id.clone();
            let alive = running.clone();
            let player = audio.clone();
            let els = elements.clone();
            let mut painter = painter;
            let mut last_ts: Option<f64> = None;
            *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
                if !alive.get() {
                    return;
                }
                let dt = last_ts.map_or(0.0, |prev| ((ts - prev) / 1000.0).max(0.0));
                last_ts = Some(ts);

                let output = crate::with_runner(|r| {
                    r.tick(dt as f32);
                    if let Some(p) = painter.as_mut() {
                        let vp = r.experience().viewport();
                        p.resize(vp.width as f64, vp.height as f64);
                        if let Err(e) = p.paint(r.experience().draw_buffer().instances()) {
                            log::debug!("paint failed: {:?}", e);
                        }
                    }
                    FrameOutput {
                        snapshot: r.experience().snapshot(),
                        audio: r.take_audio(),
                        nav: r.take_nav(),
                    }
                });

                if let Some(output) = output {
                    let mut player = player.borrow_mut();
                    for command in output.audio {
                        player.apply(command);
                    }
                    player.tick(dt);
                    if let Some(document) = w.document() {
                        apply_snapshot(&document, &output.snapshot, &els.borrow());
                    }
                    if let Some(request) = output.nav {
                        scroll_to(&w, request);
                    }
                }

                if let Some(cb) = next.borrow().as_ref() {
                    if let Ok(id) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        raf.set(Some(id));
                    }
                }
            }) as Box<dyn FnMut(f64)>));
        }
        if let Some(cb) = frame.borrow().as_ref() {
            raf_id.set(Some(window.request_animation_frame(cb.as_ref().unchecked_ref())?));
        }

        log::info!("browser loop started with {} listeners", listeners.len());
        Ok(Self {
            window,
            listeners,
            frame,
            raf_id,
            running,
            audio,
        })
    }

    /// Cancel the pending frame, remove every listener and silence audio.
    pub fn stop(self) {
        self.running.set(false);
        if let Some(id) = self.raf_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        for l in &self.listeners {
            let _ = l
                .target
                .remove_event_listener_with_callback(l.kind, l.closure.as_ref().unchecked_ref());
        }
        self.frame.borrow_mut().take();
        self.audio.borrow_mut().stop_all();
        log::info!("browser loop stopped");
    }
}

fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
    document.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
}

fn html_elements(list: Result<NodeList, JsValue>) -> Vec<HtmlElement> {
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

/// Elements the loop animates, looked up once per measurement.
#[derive(Default)]
struct PanelElements {
    heading: Option<HtmlElement>,
    items: Vec<HtmlElement>,
}

#[derive(Default)]
struct PageElements {
    hero: Vec<HtmlElement>,
    about: Vec<HtmlElement>,
    panels: Vec<PanelElements>,
    parallax: Vec<HtmlElement>,
}

impl PageElements {
    fn apply(&self, scroll: &ScrollSnapshot) {
        for el in &self.hero {
            set_pose(el, &scroll.hero);
        }
        for el in &self.about {
            set_pose(el, &scroll.about);
        }
        for (panel, pose) in self.panels.iter().zip(&scroll.panels) {
            if let Some(heading) = panel.heading.as_ref() {
                set_pose(heading, &pose.heading);
            }
            for (item, item_pose) in panel.items.iter().zip(&pose.items) {
                set_pose(item, item_pose);
            }
        }
        for (layer, offset) in self.parallax.iter().zip(&scroll.parallax) {
            let _ = layer
                .style()
                .set_property("transform", &format!("translate3d(0, {:.2}px, 0)", offset));
        }
    }
}

fn set_pose(el: &HtmlElement, pose: &Pose) {
    let style = el.style();
    let _ = style.set_property(
        "transform",
        &format!("translate3d(0, {:.2}px, 0) scale({:.4})", pose.y, pose.scale),
    );
    let _ = style.set_property("opacity", &format!("{:.3}", pose.opacity));
}

/// Read section geometry off the live page.
///
/// Panel offsets are taken relative to the track's own rect, so a track
/// transform already applied by an earlier frame does not skew them.
fn measure(window: &Window, document: &Document) -> (PageLayout, PageElements) {
    let (width, height) = viewport_of(window);
    let scroll_y = window.scroll_y().unwrap_or(0.0) as f32;
    let span_of = |id: &str| {
        document.get_element_by_id(id).map_or(Span::default(), |el| {
            let rect = el.get_bounding_client_rect();
            Span::new(rect.top() as f32 + scroll_y, rect.height() as f32)
        })
    };

    let mut vertical_sections = Vec::new();
    let mut last_top = 0.0;
    for section in Section::ALL.iter().filter(|s| s.horizontal_index().is_none()) {
        if let Some(el) = document.get_element_by_id(section.id()) {
            last_top = el.get_bounding_client_rect().top() as f32 + scroll_y;
        }
        vertical_sections.push(last_top);
    }

    let mut layout = PageLayout {
        viewport: Viewport::new(width, height),
        hero: span_of("hero"),
        about: span_of("about"),
        vertical_sections,
        ..PageLayout::default()
    };
    let mut elements = PageElements {
        hero: html_elements(document.query_selector_all("[data-anim=\"hero\"]")),
        about: html_elements(document.query_selector_all("[data-anim=\"about\"]")),
        parallax: html_elements(document.query_selector_all("[data-parallax]")),
        ..PageElements::default()
    };
    layout.parallax_layers = elements.parallax.len();

    if let Some(track) = html_element(document, TRACK_ID) {
        layout.track_width = track.scroll_width() as f32;
        let track_left = track.get_bounding_client_rect().left() as f32;
        for section in html_elements(track.query_selector_all("[data-h-section]")) {
            let rect = section.get_bounding_client_rect();
            let heading = section
                .query_selector("[data-h-heading]")
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok());
            let items = html_elements(section.query_selector_all("[data-h-item]"));
            layout.panels.push(PanelLayout {
                left: rect.left() as f32 - track_left,
                width: rect.width() as f32,
                items: items.len(),
            });
            elements.panels.push(PanelElements { heading, items });
        }

        let distance = layout.track_width - width;
        match html_element(document, PIN_ID) {
            Some(pin) => {
                let style = pin.style();
                let _ = if distance > 0.0 {
                    style.set_property("height", &format!("{:.0}px", distance + height))
                } else {
                    style.remove_property("height").map(|_| ())
                };
                layout.pin_top = pin.get_bounding_client_rect().top() as f32 + scroll_y;
            }
            None => {
                if let Some(parent) = track.parent_element() {
                    layout.pin_top = parent.get_bounding_client_rect().top() as f32 + scroll_y;
                }
            }
        }
    }

    layout.document_height = document
        .document_element()
        .map_or(0.0, |root| root.scroll_height() as f32);
    (layout, elements)
}

/// Measure the page and hand the result to the runner.
fn remeasure(window: &Window, elements: &RefCell<PageElements>) {
    let Some(document) = window.document() else {
        return;
    };
    let (layout, found) = measure(window, &document);
    log::debug!(
        "measured track {}px, {} panels, {} parallax layers",
        layout.track_width,
        layout.panels.len(),
        layout.parallax_layers
    );
    *elements.borrow_mut() = found;
    push(InputEvent::Layout(Box::new(layout)));
}

/// Write the frame to the page. The track transform has no other writer.
fn apply_snapshot(document: &Document, snapshot: &FrameSnapshot, elements: &PageElements) {
    elements.apply(&snapshot.scroll);
    if let Some(body) = document.body() {
        let _ = body.style().set_property("background", &snapshot.background);
        let _ = body.set_attribute("data-phase", snapshot.state.phase.name());
        match snapshot.active_egg {
            Some(egg) => {
                let _ = body.set_attribute("data-egg", egg.name());
            }
            None => {
                let _ = body.remove_attribute("data-egg");
            }
        }
    }
    if let Some(track) = html_element(document, TRACK_ID) {
        let style = track.style();
        if snapshot.scroll.pinned {
            let _ = style.set_property(
                "transform",
                &format!("translate3d({:.2}px, 0, 0)", snapshot.scroll.translate_x),
            );
        } else {
            let _ = style.remove_property("transform");
        }
    }
    if let Some(bar) = html_element(document, PROGRESS_ID) {
        let style = bar.style();
        match snapshot.scroll.progress_bar_percent {
            Some(percent) => {
                let _ = style.set_property("display", "block");
                let _ = style.set_property("width", &format!("{:.2}%", percent));
            }
            None => {
                let _ = style.set_property("display", "none");
            }
        }
    }
}

fn scroll_to(window: &Window, request: NavRequest) {
    let options = ScrollToOptions::new();
    options.set_top(request.scroll_y as f64);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
    log::debug!("navigate to {}", request.section.id());
}
