//! `log` backend for the browser console.
//!
//! Native builds install `env_logger` from the binary instead (`RUST_LOG`
//! overrides the default `info` filter).

#[cfg(any(target_arch = "wasm32", test))]
use log::Level;
#[cfg(target_arch = "wasm32")]
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
static LOGGER: ConsoleLogger = ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        emit(record.level(), &format_line(record.level(), record.target(), record.args()));
    }

    fn flush(&self) {}
}

#[cfg(any(target_arch = "wasm32", test))]
fn format_line(level: Level, target: &str, args: &std::fmt::Arguments) -> String {
    format!("[{level} {target}] {args}")
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let line = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&line),
        Level::Warn => web_sys::console::warn_1(&line),
        Level::Info => web_sys::console::info_1(&line),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
    }
}

/// Install the console logger. Fails if another logger is already installed.
#[cfg(target_arch = "wasm32")]
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
