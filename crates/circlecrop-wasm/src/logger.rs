//! `log` backend writing to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;
use web_sys::console;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format_record(record));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

/// Install the console logger. Later calls only change the level.
pub(crate) fn init_logging(level: LevelFilter) {
    // Fails only if a logger is already installed
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Default level: debug in debug builds, info otherwise.
pub(crate) fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Change the console log level (`"off"`, `"error"`, `"warn"`, `"info"`,
/// `"debug"` or `"trace"`).
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter: LevelFilter = level
        .parse()
        .map_err(|_| JsValue::from_str(&format!("Unknown log level \"{level}\"")))?;
    init_logging(filter);
    Ok(())
}
