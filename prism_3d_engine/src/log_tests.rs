//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry formatting and DefaultLogger.

use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use std::time::SystemTime;

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "prism3d::Camera".to_string(),
        message: "targets resized".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_have_fixed_width() {
    let all = [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ];
    for severity in all {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Warn.label().trim(), "WARN");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_format_plain_without_location() {
    let text = entry(LogSeverity::Info, None, None).format_plain();
    assert!(text.contains("[INFO ]"));
    assert!(text.contains("[prism3d::Camera]"));
    assert!(text.ends_with("targets resized"));
}

#[test]
fn test_format_plain_with_location() {
    let text = entry(LogSeverity::Error, Some("camera.rs"), Some(42)).format_plain();
    assert!(text.contains("[ERROR]"));
    assert!(text.ends_with("targets resized (camera.rs:42)"));
}

#[test]
fn test_format_plain_ignores_partial_location() {
    let text = entry(LogSeverity::Warn, Some("camera.rs"), None).format_plain();
    assert!(!text.contains("camera.rs"));
}

#[test]
fn test_log_entry_clone() {
    let original = entry(LogSeverity::Debug, Some("mesh.rs"), Some(7));
    let copy = original.clone();
    assert_eq!(copy.severity, original.severity);
    assert_eq!(copy.source, original.source);
    assert_eq!(copy.file, original.file);
    assert_eq!(copy.line, original.line);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_handles_every_severity() {
    let logger = DefaultLogger;
    logger.log(&entry(LogSeverity::Trace, None, None));
    logger.log(&entry(LogSeverity::Debug, None, None));
    logger.log(&entry(LogSeverity::Info, None, None));
    logger.log(&entry(LogSeverity::Warn, None, None));
    logger.log(&entry(LogSeverity::Error, Some("log_tests.rs"), Some(1)));
}
