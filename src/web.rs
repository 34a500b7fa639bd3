//! Browser runtime: the JS-facing handle, the animation-frame loop and auto-save.
//!
//! The page creates one `LibraryHandle`. It restores the save (crediting
//! offline progress), starts ticking on `requestAnimationFrame` and saves on a
//! `setInterval`. `stop()` or dropping the handle cancels both callbacks.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, info, warn, LevelFilter};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::config::EngineConfig;
use crate::decimal::Decimal;
use crate::format::{format_number, format_time};
use crate::library::save::{self, LocalStorageSlot};
use crate::library::{offline, Action, LibraryGame};
use crate::logging;
use crate::time::{self, AutoSave, FrameScheduler, IntervalScheduler, SimulationLoop};

type FrameCallback = Closure<dyn FnMut(f64)>;
type IntervalCallback = Closure<dyn FnMut()>;

/// Panic hook and console logger. Safe to call more than once.
pub fn init_runtime() {
    console_error_panic_hook::set_once();
    if let Err(e) = logging::init(LevelFilter::Info) {
        debug!("console logger already installed: {e}");
    }
}

struct AnimationFrames<'a> {
    window: &'a Window,
    callback: &'a RefCell<Option<FrameCallback>>,
}

impl FrameScheduler for AnimationFrames<'_> {
    fn request_frame(&mut self) -> Option<i32> {
        let callback = self.callback.borrow();
        let function = callback.as_ref()?.as_ref().unchecked_ref();
        match self.window.request_animation_frame(function) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("requestAnimationFrame failed: {e:?}");
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: i32) {
        if let Err(e) = self.window.cancel_animation_frame(handle) {
            debug!("cancelAnimationFrame failed: {e:?}");
        }
    }
}

struct BrowserIntervals<'a> {
    window: &'a Window,
    callback: &'a RefCell<Option<IntervalCallback>>,
}

impl IntervalScheduler for BrowserIntervals<'_> {
    fn set_interval(&mut self, every_ms: u32) -> Option<i32> {
        let callback = self.callback.borrow();
        let function = callback.as_ref()?.as_ref().unchecked_ref();
        let timeout = every_ms.min(i32::MAX as u32) as i32;
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(function, timeout)
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("setInterval failed: {e:?}");
                None
            }
        }
    }

    fn clear_interval(&mut self, handle: i32) {
        self.window.clear_interval_with_handle(handle);
    }
}

struct Runtime {
    window: Window,
    config: EngineConfig,
    game: RefCell<LibraryGame>,
    sim: RefCell<SimulationLoop>,
    slot: Option<LocalStorageSlot>,
    frame_callback: RefCell<Option<FrameCallback>>,
    autosave_callback: RefCell<Option<IntervalCallback>>,
    autosave: RefCell<AutoSave>,
}

impl Runtime {
    fn frames(&self) -> AnimationFrames<'_> {
        AnimationFrames {
            window: &self.window,
            callback: &self.frame_callback,
        }
    }

    fn intervals(&self) -> BrowserIntervals<'_> {
        BrowserIntervals {
            window: &self.window,
            callback: &self.autosave_callback,
        }
    }

    fn on_frame(&self, now_ms: f64) {
        let mut game = self.game.borrow_mut();
        self.sim
            .borrow_mut()
            .frame(&mut game.state, now_ms, &mut self.frames());
    }

    fn save(&self) -> bool {
        let Some(slot) = &self.slot else {
            return false;
        };
        let mut game = self.game.borrow_mut();
        match save::save_game(&mut game.state, slot, &self.config.storage_key, time::now_ms()) {
            Ok(()) => true,
            Err(e) => {
                warn!("save failed: {e}");
                false
            }
        }
    }

    fn on_autosave(&self) {
        let Some(slot) = &self.slot else {
            return;
        };
        let mut game = self.game.borrow_mut();
        self.autosave.borrow().fire(
            &mut game.state,
            slot,
            &self.config.storage_key,
            time::now_ms(),
        );
    }

    fn start_autosave(self: &Rc<Self>) {
        if self.slot.is_none() {
            return;
        }
        let weak: Weak<Self> = Rc::downgrade(self);
        *self.autosave_callback.borrow_mut() = Some(IntervalCallback::new(move || {
            if let Some(runtime) = weak.upgrade() {
                runtime.on_autosave();
            }
        }));
        self.autosave.borrow_mut().start(&mut self.intervals());
    }

    fn start_frames(self: &Rc<Self>) {
        let weak: Weak<Self> = Rc::downgrade(self);
        *self.frame_callback.borrow_mut() = Some(FrameCallback::new(move |now_ms: f64| {
            if let Some(runtime) = weak.upgrade() {
                runtime.on_frame(now_ms);
            }
        }));
        self.sim.borrow_mut().start(&mut self.frames());
    }

    fn stop(&self) {
        self.sim.borrow_mut().stop(&mut self.frames());
        self.autosave.borrow_mut().stop(&mut self.intervals());
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.stop();
    }
}

#[wasm_bindgen]
pub struct LibraryHandle {
    runtime: Rc<Runtime>,
}

#[wasm_bindgen]
impl LibraryHandle {
    /// Load the save, credit offline time and start the game.
    /// `config_json` overrides `EngineConfig` fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<LibraryHandle, JsValue> {
        init_runtime();

        let config = match config_json {
            Some(json) => {
                EngineConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => EngineConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        let slot = LocalStorageSlot::open();
        let mut game = LibraryGame::new();
        match &slot {
            Some(slot) => {
                if save::load_game(&mut game.state, slot, &config.storage_key) {
                    let earned = offline::apply_offline_progress(
                        &mut game.state,
                        time::now_ms(),
                        config.max_offline_secs,
                    );
                    info!("welcome back (+{} glyphs)", format_number(earned, 0));
                }
            }
            None => warn!("localStorage unavailable; progress will not be saved"),
        }

        let runtime = Rc::new(Runtime {
            window,
            sim: RefCell::new(SimulationLoop::new(config.max_frame_delta_secs)),
            autosave: RefCell::new(AutoSave::new(config.autosave_interval_ms)),
            config,
            game: RefCell::new(game),
            slot,
            frame_callback: RefCell::new(None),
            autosave_callback: RefCell::new(None),
        });
        runtime.start_autosave();
        runtime.start_frames();
        Ok(LibraryHandle { runtime })
    }

    fn dispatch(&self, action: Action) -> bool {
        self.runtime.game.borrow_mut().handle(&action)
    }

    pub fn click(&self) {
        self.dispatch(Action::Click);
    }

    #[wasm_bindgen(js_name = buyGenerator)]
    pub fn buy_generator(&self, id: &str) -> bool {
        self.dispatch(Action::BuyGenerator(id.to_string()))
    }

    #[wasm_bindgen(js_name = buyUpgrade)]
    pub fn buy_upgrade(&self, id: &str) -> bool {
        self.dispatch(Action::BuyUpgrade(id.to_string()))
    }

    pub fn prestige(&self, layer: &str) -> bool {
        self.dispatch(Action::Prestige(layer.to_string()))
    }

    /// Glyphs granted by the notes feature.
    #[wasm_bindgen(js_name = addGlyphs)]
    pub fn add_glyphs(&self, amount: f64) -> bool {
        self.dispatch(Action::AddGlyphs(Decimal::from(amount)))
    }

    pub fn save(&self) -> bool {
        self.runtime.save()
    }

    /// Hard reset: fresh game and no save left behind.
    pub fn reset(&self) {
        self.dispatch(Action::Reset);
        if let Some(slot) = &self.runtime.slot {
            if let Err(e) = save::delete_save(slot, &self.runtime.config.storage_key) {
                warn!("failed to delete save: {e}");
            }
        }
    }

    /// Cancel the frame loop and auto-save. Idempotent.
    pub fn stop(&self) {
        self.runtime.stop();
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.runtime.sim.borrow().is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn glyphs(&self) -> String {
        format_number(self.runtime.game.borrow().state.resources.glyphs, 0)
    }

    #[wasm_bindgen(getter)]
    pub fn vocables(&self) -> String {
        format_number(self.runtime.game.borrow().state.resources.vocables, 0)
    }

    #[wasm_bindgen(getter)]
    pub fn production(&self) -> String {
        format_number(self.runtime.game.borrow().state.total_production(), 1)
    }

    #[wasm_bindgen(getter, js_name = playTime)]
    pub fn play_time(&self) -> String {
        format_time(self.runtime.game.borrow().state.stats.play_time)
    }

    /// The full state in save format.
    pub fn snapshot(&self) -> Result<String, JsValue> {
        save::save_to_json(&self.runtime.game.borrow().state)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
