//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the global logger slot.

use crate::error::Error;
use crate::log::{self, DefaultLogger, LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

// ============================================================================
// Helpers
// ============================================================================

/// Logger that stores every entry it receives
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    log::set_logger(CaptureLogger { entries: entries.clone() });
    entries
}

/// Entries emitted by these tests (other tests may log concurrently)
fn own_entries(entries: &Arc<Mutex<Vec<LogEntry>>>) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.source == "lumen3d::test")
        .cloned()
        .collect()
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
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// DEFAULT LOGGER
// ============================================================================

#[test]
fn test_default_logger_prints_without_panic() {
    let logger = DefaultLogger;
    logger.log(&LogEntry {
        severity: LogSeverity::Info,
        timestamp: SystemTime::now(),
        source: "lumen3d::test".to_string(),
        message: "hello".to_string(),
        file: None,
        line: None,
    });
    logger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "lumen3d::test".to_string(),
        message: "boom".to_string(),
        file: Some("log_tests.rs"),
        line: Some(42),
    });
}

// ============================================================================
// GLOBAL LOGGER + MACROS
// ============================================================================

#[test]
#[serial]
fn test_macros_route_to_installed_logger() {
    let entries = install_capture();

    crate::engine_info!("lumen3d::test", "loaded {} shaders", 3);
    crate::engine_warn!("lumen3d::test", "slow frame");

    let captured = own_entries(&entries);
    log::reset_logger();

    assert_eq!(captured.len(), 2);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].message, "loaded 3 shaders");
    assert_eq!(captured[0].source, "lumen3d::test");
    assert!(captured[0].file.is_none());
    assert_eq!(captured[1].severity, LogSeverity::Warn);
}

#[test]
#[serial]
fn test_engine_error_carries_file_and_line() {
    let entries = install_capture();

    crate::engine_error!("lumen3d::test", "link failed");

    let captured = own_entries(&entries);
    log::reset_logger();

    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].file.unwrap().ends_with("log_tests.rs"));
    assert!(captured[0].line.is_some());
}

#[test]
#[serial]
fn test_engine_err_logs_and_builds_backend_error() {
    let entries = install_capture();

    let err = crate::engine_err!("lumen3d::test", "framebuffer {} incomplete", 7);

    let captured = own_entries(&entries);
    log::reset_logger();

    assert_eq!(err, Error::BackendError("framebuffer 7 incomplete".to_string()));
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].message, "framebuffer 7 incomplete");
}

#[test]
#[serial]
fn test_engine_bail_returns_early() {
    fn guarded(value: i32) -> crate::error::Result<i32> {
        if value < 0 {
            crate::engine_bail!("lumen3d::test", "negative value {}", value);
        }
        Ok(value * 2)
    }

    let entries = install_capture();
    let bad = guarded(-1);
    let good = guarded(4);
    let count = own_entries(&entries).len();
    log::reset_logger();

    assert!(matches!(bad, Err(Error::BackendError(_))));
    assert_eq!(good, Ok(8));
    assert_eq!(count, 1);
}
