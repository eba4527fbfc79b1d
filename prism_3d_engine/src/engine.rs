/// Prism3D Engine - global logger and log-level filter
///
/// Cameras receive their raster device explicitly as a [`SharedRasterDevice`];
/// the only process-wide state is the logger.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::raster::RasterDevice;

// ===== INTERNAL STATE =====

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Minimum severity forwarded to the logger (stored as the enum discriminant)
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogSeverity::Trace as u8);

/// Raster device shared between the cameras drawing through it
pub type SharedRasterDevice = Arc<Mutex<dyn RasterDevice>>;

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// # Example
///
/// ```ignore
/// use prism_3d_engine::prism3d::Engine;
/// use prism_3d_engine::prism3d::log::LogSeverity;
///
/// Engine::set_logger(MyLogger::new());
/// Engine::set_log_level(LogSeverity::Info);
/// ```
pub struct Engine;

impl Engine {
    #[cfg(test)]
    pub(crate) fn reset_for_testing() {
        Self::reset_logger();
        Self::set_log_level(LogSeverity::Trace);
    }

    // ===== LOGGING API =====

    /// Replace the active logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Restore [`DefaultLogger`]
    pub fn reset_logger() {
        Self::set_logger(DefaultLogger);
    }

    /// Drop every message below `severity`
    pub fn set_log_level(severity: LogSeverity) {
        LOG_LEVEL.store(severity as u8, Ordering::Relaxed);
    }

    /// Current minimum severity
    pub fn log_level() -> LogSeverity {
        match LOG_LEVEL.load(Ordering::Relaxed) {
            0 => LogSeverity::Trace,
            1 => LogSeverity::Debug,
            2 => LogSeverity::Info,
            3 => LogSeverity::Warn,
            _ => LogSeverity::Error,
        }
    }

    /// Log without file:line (used by engine_trace!..engine_warn!)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Log with file:line (used by engine_error!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }

    fn dispatch(entry: LogEntry) {
        if entry.severity < Self::log_level() {
            return;
        }
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&entry);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
