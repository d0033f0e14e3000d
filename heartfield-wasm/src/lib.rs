use heartfield_core::{FieldConfig, Scene, ThreadRandom};
use heartfield_shared::{FieldSettings, PhraseSequence, SceneMode, TargetLabel};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, MouseEvent, Window};

pub mod canvas;

use canvas::{CanvasSurface, OffscreenTextRasterizer};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

/// Forwards `log` records from the engine to the browser console
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            console_log!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Route engine logs to the console. Later calls only change the level.
#[wasm_bindgen]
pub fn init_logging(debug: bool) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
}

type BrowserScene = Scene<OffscreenTextRasterizer, ThreadRandom>;

/// State shared between the exported handle and the event/frame callbacks
struct Shared {
    scene: BrowserScene,
    sequence: Option<PhraseSequence>,
    /// Animation timestamp the running sequence counts from
    sequence_origin: Option<f64>,
}

impl Shared {
    fn advance_sequence(&mut self, timestamp: f64) {
        let Some(sequence) = &self.sequence else {
            return;
        };
        let origin = *self.sequence_origin.get_or_insert(timestamp);
        let label = sequence.label_at(timestamp - origin);
        self.scene.set_label(label);
    }

    /// Back to the first phrase; the clock restarts on the next frame
    fn rewind_sequence(&mut self) {
        self.sequence_origin = None;
        if let Some(sequence) = &self.sequence {
            let initial = sequence.initial_label();
            self.scene.set_label(initial);
        }
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Callbacks registered while running; dropped on stop
struct Session {
    frame_id: Rc<Cell<i32>>,
    frame_callback: FrameCallback,
    on_mouse_move: Closure<dyn FnMut(MouseEvent)>,
    on_mouse_leave: Closure<dyn FnMut(MouseEvent)>,
    on_resize: Closure<dyn FnMut(Event)>,
}

#[wasm_bindgen]
pub struct ParticleScene {
    window: Window,
    canvas: HtmlCanvasElement,
    shared: Rc<RefCell<Shared>>,
    session: Option<Session>,
}

fn listen(target: &EventTarget, event: &str, callback: &JsValue) -> Result<(), JsValue> {
    target.add_event_listener_with_callback(event, callback.unchecked_ref())
}

fn unlisten(target: &EventTarget, event: &str, callback: &JsValue) {
    let _ = target.remove_event_listener_with_callback(event, callback.unchecked_ref());
}

fn viewport_size(window: &Window) -> Result<(u32, u32), JsValue> {
    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let height = window.inner_height()?.as_f64().unwrap_or(0.0);
    Ok((width.max(0.0) as u32, height.max(0.0) as u32))
}

#[wasm_bindgen]
impl ParticleScene {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<ParticleScene, JsValue> {
        init_logging(false);

        let window = web_sys::window().ok_or("no global window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let scene = Scene::new(
            FieldConfig::default(),
            OffscreenTextRasterizer::new(Some(document)),
            ThreadRandom::new(),
        );

        Ok(ParticleScene {
            window,
            canvas,
            shared: Rc::new(RefCell::new(Shared {
                scene,
                sequence: None,
                sequence_origin: None,
            })),
            session: None,
        })
    }

    /// Size the canvas to the window and begin animating. Restarts if already
    /// running. Without a 2D context this does nothing.
    pub fn start(&mut self) -> Result<(), JsValue> {
        self.stop();

        let context = match self.canvas.get_context("2d") {
            Ok(Some(context)) => context.dyn_into::<CanvasRenderingContext2d>()?,
            _ => {
                console_log!("2d context unavailable, particle scene not started");
                return Ok(());
            }
        };

        let (width, height) = viewport_size(&self.window)?;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.shared
            .borrow_mut()
            .scene
            .start(width as f32, height as f32);
        if !self.shared.borrow().scene.is_running() {
            return Ok(());
        }

        let on_mouse_move = {
            let shared = self.shared.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                shared
                    .borrow_mut()
                    .scene
                    .pointer_moved(event.client_x() as f32, event.client_y() as f32);
            })
        };
        let on_mouse_leave = {
            let shared = self.shared.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
                shared.borrow_mut().scene.pointer_left();
            })
        };
        let on_resize = {
            let shared = self.shared.clone();
            let window = self.window.clone();
            let canvas = self.canvas.clone();
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                if let Ok((width, height)) = viewport_size(&window) {
                    canvas.set_width(width);
                    canvas.set_height(height);
                    shared
                        .borrow_mut()
                        .scene
                        .resize(width as f32, height as f32);
                }
            })
        };

        listen(&self.window, "mousemove", on_mouse_move.as_ref())?;
        listen(&self.canvas, "mouseleave", on_mouse_leave.as_ref())?;
        listen(&self.window, "resize", on_resize.as_ref())?;

        let frame_id = Rc::new(Cell::new(0));
        let frame_callback: FrameCallback = Rc::new(RefCell::new(None));
        {
            let shared = self.shared.clone();
            let window = self.window.clone();
            let canvas = self.canvas.clone();
            let next_frame = frame_callback.clone();
            let frame_id = frame_id.clone();
            let frame = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
                {
                    let mut shared = shared.borrow_mut();
                    shared.advance_sequence(timestamp);
                    let (width, height) = (canvas.width() as f64, canvas.height() as f64);
                    let mut surface = CanvasSurface::new(&context, width, height);
                    shared.scene.frame(&mut surface);
                }

                if let Some(callback) = next_frame.borrow().as_ref() {
                    let request = window.request_animation_frame(callback.as_ref().unchecked_ref());
                    if let Ok(id) = request {
                        frame_id.set(id);
                    }
                }
            });
            *frame_callback.borrow_mut() = Some(frame);
        }

        if let Some(callback) = frame_callback.borrow().as_ref() {
            frame_id.set(
                self.window
                    .request_animation_frame(callback.as_ref().unchecked_ref())?,
            );
        }

        self.session = Some(Session {
            frame_id,
            frame_callback,
            on_mouse_move,
            on_mouse_leave,
            on_resize,
        });
        console_log!("Particle scene started at {}x{}", width, height);
        Ok(())
    }

    /// Cancel the frame loop and remove every listener. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            let _ = self.window.cancel_animation_frame(session.frame_id.get());
            unlisten(&self.window, "mousemove", session.on_mouse_move.as_ref());
            unlisten(&self.canvas, "mouseleave", session.on_mouse_leave.as_ref());
            unlisten(&self.window, "resize", session.on_resize.as_ref());
            // breaks the closure's reference to itself
            session.frame_callback.borrow_mut().take();
            console_log!("Particle scene stopped");
        }
        let mut shared = self.shared.borrow_mut();
        shared.scene.stop();
        shared.rewind_sequence();
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some() && self.shared.borrow().scene.is_running()
    }

    /// Show a phrase, or the heart for `"__heart__"`. Stops any playing sequence.
    pub fn set_label(&mut self, label: &str) {
        let mut shared = self.shared.borrow_mut();
        shared.sequence = None;
        shared.sequence_origin = None;
        shared.scene.set_label(TargetLabel::parse(label));
    }

    pub fn label(&self) -> String {
        self.shared.borrow().scene.label().as_str().to_string()
    }

    /// Walk the default phrases, then settle on the heart. The clock starts on the next frame.
    pub fn play_sequence(&mut self, interval_ms: Option<u32>) {
        let mut sequence = PhraseSequence::default();
        if let Some(interval_ms) = interval_ms {
            sequence.interval_ms = interval_ms;
        }

        let mut shared = self.shared.borrow_mut();
        shared.sequence = Some(sequence);
        shared.rewind_sequence();
    }

    /// Caption for the phrase on screen; `undefined` once the heart shows or when no sequence plays
    pub fn overlay_text(&self, timestamp: f64) -> Option<String> {
        let shared = self.shared.borrow();
        let sequence = shared.sequence.as_ref()?;
        let elapsed = shared
            .sequence_origin
            .map(|origin| timestamp - origin)
            .unwrap_or(0.0);
        sequence.overlay_text_at(elapsed).map(str::to_string)
    }

    /// "attract" or "repel"
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: SceneMode = mode
            .parse()
            .map_err(|err: heartfield_shared::UnknownMode| JsValue::from_str(&err.to_string()))?;
        self.shared.borrow_mut().scene.set_mode(mode);
        Ok(())
    }

    pub fn mode(&self) -> String {
        self.shared.borrow().scene.mode().as_str().to_string()
    }

    /// Apply JSON field settings over the default preset. Takes effect on the next start or resize.
    pub fn configure(&mut self, settings_json: &str) -> Result<(), JsValue> {
        let settings = FieldSettings::from_json(settings_json)
            .map_err(|err| JsValue::from_str(&format!("invalid settings: {}", err)))?;
        let config = FieldConfig::default().with_settings(&settings);
        self.shared.borrow_mut().scene.set_config(config);
        console_log!("Field settings updated");
        Ok(())
    }

    pub fn particle_count(&self) -> usize {
        self.shared
            .borrow()
            .scene
            .field()
            .map(|field| field.len())
            .unwrap_or(0)
    }
}

impl Drop for ParticleScene {
    fn drop(&mut self) {
        self.stop();
    }
}
