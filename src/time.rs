//! Frame clock and simulation loop.
//!
//! The browser calls back at ~60fps with a wall-clock timestamp. `FrameClock`
//! turns consecutive timestamps into a clamped delta in seconds, so a tab that
//! was backgrounded for minutes advances the game by at most one clamp step.
//! `SimulationLoop` owns the clock and the pending frame request; scheduling
//! itself is behind `FrameScheduler` so the loop is testable without a browser.
//! `AutoSave` does the same for the periodic save over `IntervalScheduler`.

use log::warn;

use crate::library::logic;
use crate::library::save::{self, SaveSlot};
use crate::library::state::LibraryState;

pub struct FrameClock {
    /// Upper bound for a single frame's delta, in seconds.
    max_delta_secs: f64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
    /// Total simulated seconds handed out since creation
    pub elapsed_secs: f64,
}

impl FrameClock {
    pub fn new(max_delta_secs: f64) -> Self {
        Self {
            max_delta_secs,
            last_timestamp: None,
            elapsed_secs: 0.0,
        }
    }

    /// Feed a wall-clock timestamp (from `performance.now()` or similar).
    /// Returns the seconds to simulate this frame, within `[0, max_delta_secs]`.
    pub fn update(&mut self, now_ms: f64) -> f64 {
        let delta = match self.last_timestamp {
            Some(prev) => ((now_ms - prev) / 1000.0).clamp(0.0, self.max_delta_secs),
            None => 0.0, // First frame: no delta
        };
        self.last_timestamp = Some(now_ms);
        self.elapsed_secs += delta;
        delta
    }

    /// Forget the previous timestamp; the next update yields zero.
    pub fn reset(&mut self) {
        self.last_timestamp = None;
    }
}

/// Requests and cancels per-frame callbacks.
pub trait FrameScheduler {
    /// Ask for one more callback. Returns the request handle, None if refused.
    fn request_frame(&mut self) -> Option<i32>;
    fn cancel_frame(&mut self, handle: i32);
}

/// Drives `logic::tick` from frame callbacks.
pub struct SimulationLoop {
    clock: FrameClock,
    pending: Option<i32>,
    running: bool,
}

impl SimulationLoop {
    pub fn new(max_delta_secs: f64) -> Self {
        Self {
            clock: FrameClock::new(max_delta_secs),
            pending: None,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.clock.elapsed_secs
    }

    /// Begin scheduling frames. No-op if already running.
    pub fn start(&mut self, scheduler: &mut impl FrameScheduler) {
        if self.running {
            return;
        }
        self.running = true;
        self.clock.reset();
        self.pending = scheduler.request_frame();
    }

    /// Handle one frame callback: tick the state and request the next frame.
    /// Returns the simulated delta. Does nothing once stopped.
    pub fn frame(
        &mut self,
        state: &mut LibraryState,
        now_ms: f64,
        scheduler: &mut impl FrameScheduler,
    ) -> f64 {
        self.pending = None;
        if !self.running {
            return 0.0;
        }
        let delta = self.clock.update(now_ms);
        logic::tick(state, delta);
        self.pending = scheduler.request_frame();
        delta
    }

    /// Stop and cancel the pending frame. Safe to call repeatedly.
    pub fn stop(&mut self, scheduler: &mut impl FrameScheduler) {
        self.running = false;
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
    }
}

// ── Auto-save ──────────────────────────────────────────────────

/// Starts and clears repeating timers.
pub trait IntervalScheduler {
    /// Fire every `every_ms` until cleared. Returns the timer handle, None if refused.
    fn set_interval(&mut self, every_ms: u32) -> Option<i32>;
    fn clear_interval(&mut self, handle: i32);
}

/// Periodic save driven by an interval timer.
pub struct AutoSave {
    interval_ms: u32,
    handle: Option<i32>,
}

impl AutoSave {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Arm the timer. No-op if already armed. Returns whether it is running.
    pub fn start(&mut self, scheduler: &mut impl IntervalScheduler) -> bool {
        if self.handle.is_none() {
            self.handle = scheduler.set_interval(self.interval_ms);
            if self.handle.is_none() {
                warn!("auto-save timer refused; progress is only saved on demand");
            }
        }
        self.is_running()
    }

    /// Handle one timer tick: save `state` into `slot`. Does nothing once stopped.
    pub fn fire(
        &self,
        state: &mut LibraryState,
        slot: &impl SaveSlot,
        key: &str,
        now_ms: i64,
    ) -> bool {
        if !self.is_running() {
            return false;
        }
        match save::save_game(state, slot, key, now_ms) {
            Ok(()) => true,
            Err(e) => {
                warn!("auto-save failed: {e}");
                false
            }
        }
    }

    /// Clear the timer. Safe to call repeatedly.
    pub fn stop(&mut self, scheduler: &mut impl IntervalScheduler) {
        if let Some(handle) = self.handle.take() {
            scheduler.clear_interval(handle);
        }
    }
}

/// Current Unix time in milliseconds.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

/// Current Unix time in milliseconds.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
