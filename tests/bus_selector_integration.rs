//! Diagnostics emitted while choosing a bus

mod common;

use common::*;
use snap_tracking::dbus::{session_or_maybe_system_bus, BusKind};

fn has_line(logs: &[String], line: &str) -> bool {
    logs.iter().any(|l| l == line)
}

#[test]
fn test_total_failure_for_root() {
    capture_logs();
    let buses = MockBuses::new(false, false);

    let err = session_or_maybe_system_bus(&buses, 0, true).unwrap_err();
    assert_eq!(err.to_string(), "system bus unavailable for testing");

    let logs = captured_logs();
    assert!(has_line(&logs, "DEBUG: session bus is not available: session bus unavailable for testing"));
    assert!(has_line(&logs, "DEBUG: falling back to system bus"));
    assert!(has_line(&logs, "DEBUG: system bus is not available: system bus unavailable for testing"));
}

#[test]
fn test_fallback_for_root() {
    capture_logs();
    let buses = MockBuses::new(false, true);

    let handle = session_or_maybe_system_bus(&buses, 0, true).unwrap();
    assert_eq!(handle.kind(), BusKind::System);
    drop(handle);
    assert_eq!(buses.live(), 0);

    let logs = captured_logs();
    assert!(has_line(&logs, "DEBUG: session bus is not available: session bus unavailable for testing"));
    assert!(has_line(&logs, "DEBUG: falling back to system bus"));
    assert!(has_line(&logs, "DEBUG: using system bus now, session bus was not available"));
}

#[test]
fn test_non_root_session_failure() {
    capture_logs();
    let buses = MockBuses::new(false, true);

    let err = session_or_maybe_system_bus(&buses, 12345, true).unwrap_err();
    assert_eq!(err.to_string(), "session bus unavailable for testing");
    assert_eq!(buses.opened(), vec![BusKind::Session]);

    let logs = captured_logs();
    assert!(has_line(&logs, "DEBUG: session bus is not available: session bus unavailable for testing"));
    assert!(!has_line(&logs, "DEBUG: falling back to system bus"));
}

#[test]
fn test_quiet_without_debug() {
    capture_logs();
    let buses = MockBuses::new(false, true);

    let handle = session_or_maybe_system_bus(&buses, 0, false).unwrap();
    assert!(!handle.is_session());
    assert!(captured_logs().iter().all(|l| !l.contains("bus")));
}
