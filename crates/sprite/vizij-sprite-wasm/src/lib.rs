use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_sprite_core::{
    EventKind, FrameSink, FrameSource, ListenerId, Player, PlayerConfig, PlayerEvent, SpriteError,
};

/// One frame handed over from JS, kept with its position so the render
/// callback receives both.
struct JsFrame {
    index: usize,
    value: JsValue,
}

struct JsFrames {
    frames: Vec<JsFrame>,
}

impl FrameSource for JsFrames {
    type Frame = JsFrame;

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, index: usize) -> Option<&JsFrame> {
        self.frames.get(index)
    }
}

struct JsSink {
    f: Function,
}

impl FrameSink<JsFrame> for JsSink {
    fn render(&mut self, frame: &JsFrame) -> Result<(), SpriteError> {
        let index = JsValue::from_f64(frame.index as f64);
        self.f
            .call2(&JsValue::UNDEFINED, &frame.value, &index)
            .map(|_| ())
            .map_err(|e| SpriteError::render(describe_js_error(&e)))
    }
}

fn describe_js_error(e: &JsValue) -> String {
    if let Some(s) = e.as_string() {
        return s;
    }
    if let Some(err) = e.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", e)
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn to_js_error(e: SpriteError) -> JsError {
    JsError::new(&e.to_string())
}

/// Seek targets arrive as JS numbers; negatives and NaN land on frame 0 and the
/// core clamps anything past the end.
fn frame_arg(frame: f64) -> usize {
    if frame.is_finite() && frame > 0.0 {
        frame as usize
    } else {
        0
    }
}

#[wasm_bindgen]
pub struct WasmSpritePlayer {
    core: Option<Player<JsFrames, JsSink>>,
    /// First failure raised by a listener during the current call.
    listener_fault: Rc<RefCell<Option<String>>>,
}

impl WasmSpritePlayer {
    fn core(&mut self) -> Result<&mut Player<JsFrames, JsSink>, JsError> {
        self.core
            .as_mut()
            .ok_or_else(|| JsError::new("sprite player has been disposed"))
    }

    fn core_ref(&self) -> Option<&Player<JsFrames, JsSink>> {
        self.core.as_ref()
    }

    /// Surface the step's own error first, then any listener failure it caused.
    fn finish<T>(&self, result: Result<T, SpriteError>) -> Result<T, JsError> {
        let fault = self.listener_fault.borrow_mut().take();
        let value = result.map_err(to_js_error)?;
        match fault {
            Some(message) => Err(JsError::new(&message)),
            None => Ok(value),
        }
    }
}

#[wasm_bindgen]
impl WasmSpritePlayer {
    /// Create a player over `frames` (any JS values), rendering through
    /// `render(frame, index)`. `options` is an optional object:
    ///   { manualUpdate, frameRate, loop, yoyo, frameCount }
    #[wasm_bindgen(constructor)]
    pub fn new(
        frames: Array,
        render: Function,
        options: JsValue,
    ) -> Result<WasmSpritePlayer, JsError> {
        console_error_panic_hook::set_once();

        let cfg: PlayerConfig = if jsvalue_is_undefined_or_null(&options) {
            PlayerConfig::default()
        } else {
            swb::from_value(options).map_err(|e| JsError::new(&format!("options error: {e}")))?
        };

        let frames = frames
            .iter()
            .enumerate()
            .map(|(index, value)| JsFrame { index, value })
            .collect();
        let core = Player::new(JsFrames { frames }, JsSink { f: render }, cfg)
            .map_err(to_js_error)?;
        Ok(WasmSpritePlayer {
            core: Some(core),
            listener_fault: Rc::new(RefCell::new(None)),
        })
    }

    pub fn play(&mut self) -> Result<(), JsError> {
        let result = self.core()?.play();
        self.finish(result)
    }

    pub fn pause(&mut self) -> Result<(), JsError> {
        self.core()?.pause();
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), JsError> {
        self.core()?.stop();
        Ok(())
    }

    #[wasm_bindgen(js_name = gotoAndPlay)]
    pub fn goto_and_play(&mut self, frame: f64) -> Result<(), JsError> {
        let result = self.core()?.goto_and_play(frame_arg(frame));
        self.finish(result)
    }

    #[wasm_bindgen(js_name = gotoAndStop)]
    pub fn goto_and_stop(&mut self, frame: f64) -> Result<(), JsError> {
        let result = self.core()?.goto_and_stop(frame_arg(frame));
        self.finish(result)
    }

    /// Advance by `elapsed` milliseconds. Manual players require it; others
    /// fall back to the wall clock when it is omitted.
    pub fn tick(&mut self, elapsed: Option<f64>) -> Result<(), JsError> {
        let result = self.core()?.tick(elapsed);
        self.finish(result)
    }

    /// Deliver the pending frame request. Call from `requestAnimationFrame`
    /// while `hasPendingFrame()` is true. Returns whether a step ran.
    pub fn frame(&mut self) -> Result<bool, JsError> {
        let result = self.core()?.service_frame();
        self.finish(result)
    }

    #[wasm_bindgen(js_name = hasPendingFrame)]
    pub fn has_pending_frame(&self) -> bool {
        self.core_ref().is_some_and(|p| p.has_pending_frame())
    }

    /// Register `callback(event)` for `frame_entered`/`enterFrame` or
    /// `completed`/`complete`. Returns an id for `off`.
    ///
    /// Listeners run while the player is mid-step, so they cannot call back
    /// into this player synchronously (wasm-bindgen rejects the recursive
    /// borrow); defer such calls, e.g. with `queueMicrotask`. An exception
    /// thrown by a listener is returned as the error of the `play`, `tick`,
    /// `frame` or `goto*` call that emitted the event, after the step has run.
    pub fn on(&mut self, name: &str, callback: Function) -> Result<u32, JsError> {
        let kind = EventKind::from_name(name)
            .ok_or_else(|| JsError::new(&format!("unknown event: {name}")))?;
        let fault = Rc::clone(&self.listener_fault);
        let id = self.core()?.subscribe(kind, move |event: &PlayerEvent| {
            let outcome = swb::to_value(event)
                .map_err(|e| format!("failed to serialize {} event: {e}", kind.name()))
                .and_then(|payload| {
                    callback
                        .call1(&JsValue::UNDEFINED, &payload)
                        .map(|_| ())
                        .map_err(|e| {
                            format!("{} listener threw: {}", kind.name(), describe_js_error(&e))
                        })
                });
            if let Err(message) = outcome {
                fault.borrow_mut().get_or_insert(message);
            }
        });
        Ok(id.0)
    }

    pub fn off(&mut self, id: u32) -> Result<bool, JsError> {
        Ok(self.core()?.unsubscribe(ListenerId(id)))
    }

    /// Stop playback and release frames, renderer and listeners.
    pub fn dispose(&mut self) {
        if let Some(core) = self.core.take() {
            drop(core.dispose());
        }
    }

    #[wasm_bindgen(getter, js_name = currentFrame)]
    pub fn current_frame(&self) -> u32 {
        self.core_ref().map_or(0, |p| p.current_frame() as u32)
    }

    #[wasm_bindgen(getter, js_name = frameCount)]
    pub fn frame_count(&self) -> u32 {
        self.core_ref().map_or(0, |p| p.frame_count() as u32)
    }

    #[wasm_bindgen(getter, js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.core_ref().is_some_and(|p| p.is_playing())
    }

    #[wasm_bindgen(getter, js_name = isReversed)]
    pub fn is_reversed(&self) -> bool {
        self.core_ref().is_some_and(|p| p.is_reversed())
    }

    #[wasm_bindgen(getter, js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.core_ref().is_some_and(|p| p.is_complete())
    }

    /// "stopped" | "playing" | "paused" | "ended", or "disposed".
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.core_ref()
            .map_or("disposed", |p| p.state().name())
            .to_string()
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
