//! Integration tests for tracing and event monitoring.
//!
//! This test demonstrates how to use the tracing callback system to monitor
//! a singleton's lifecycle, which is useful for debugging and logging.

use single_instance_registry::{define_singleton, InitPolicy, SingletonEvent};
use std::sync::{Arc, Mutex};

fn collect_events() -> (
    Arc<Mutex<Vec<String>>>,
    impl Fn(&SingletonEvent) + Send + Sync + 'static,
) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = Arc::clone(&events);
    let callback = move |event: &SingletonEvent| {
        events_clone.lock().unwrap().push(event.to_string());
    };
    (events, callback)
}

#[test]
fn test_basic_tracing() {
    define_singleton!(traced1, i32, || 42);

    let (events, callback) = collect_events();
    traced1::set_trace_callback(callback);

    traced1::configure(InitPolicy::LazyLocked).unwrap();
    let _ = traced1::get().unwrap();

    let captured = events.lock().unwrap();
    assert_eq!(captured.len(), 3);
    assert!(captured[0].starts_with("configure"));
    assert!(captured[1].starts_with("construct"));
    assert!(captured[2].starts_with("get"));
}

#[test]
fn test_trace_eager_construction_happens_in_configure() {
    define_singleton!(traced2, u32, || 999);

    let (events, callback) = collect_events();
    traced2::set_trace_callback(callback);

    traced2::configure(InitPolicy::Eager).unwrap();

    {
        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "configure { type_name: u32, policy: eager }",
                "construct { type_name: u32, policy: eager }",
            ]
        );
    }

    let _ = traced2::get().unwrap();
    assert_eq!(
        events.lock().unwrap().last().map(String::as_str),
        Some("get { type_name: u32, found: true }")
    );

    traced2::clear_trace_callback();
}

#[test]
fn test_trace_default_policy_is_reported() {
    define_singleton!(traced3, i64, || 123);

    let (events, callback) = collect_events();
    traced3::set_trace_callback(callback);

    let _ = traced3::get().unwrap();

    let captured = events.lock().unwrap();
    assert_eq!(
        captured[0],
        "configure { type_name: i64, policy: lazy-double-checked }"
    );
    assert_eq!(captured.len(), 3);

    traced3::clear_trace_callback();
}

#[test]
fn test_trace_failed_construction() {
    define_singleton!(traced4, u8, fallible || Err::<u8, _>("sensor offline"));

    let (events, callback) = collect_events();
    traced4::set_trace_callback(callback);

    traced4::configure(InitPolicy::LazyLocked).unwrap();
    assert!(traced4::get().is_err());

    let captured = events.lock().unwrap();
    assert_eq!(
        captured[1],
        "failed { type_name: u8, policy: lazy-locked, permanent: false }"
    );
    assert_eq!(captured[2], "get { type_name: u8, found: false }");

    traced4::clear_trace_callback();
}

#[test]
fn test_trace_static_block_failure_is_permanent() {
    define_singleton!(traced5, u8, fallible || Err::<u8, _>("bad firmware"));

    let (events, callback) = collect_events();
    traced5::set_trace_callback(callback);

    assert!(traced5::configure(InitPolicy::StaticBlock).is_err());
    assert!(traced5::get().is_err());

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        vec![
            "configure { type_name: u8, policy: static-block }",
            "failed { type_name: u8, policy: static-block, permanent: true }",
            "get { type_name: u8, found: false }",
        ]
    );
}

#[test]
fn test_clear_trace_callback() {
    define_singleton!(traced6, u8, || 1);

    let (events, callback) = collect_events();
    traced6::set_trace_callback(callback);

    // Should be traced
    traced6::configure(InitPolicy::LazyLocked).unwrap();

    traced6::clear_trace_callback();

    // Should NOT be traced
    let _ = traced6::get().unwrap();
    let _ = traced6::get().unwrap();

    assert_eq!(events.lock().unwrap().len(), 1);
}

#[test]
fn test_trace_callback_replacement() {
    define_singleton!(traced7, usize, || 100);

    let (events1, callback1) = collect_events();
    let (events2, callback2) = collect_events();

    traced7::set_trace_callback(callback1);
    traced7::configure(InitPolicy::LazyDoubleChecked).unwrap();

    traced7::set_trace_callback(callback2);
    let _ = traced7::get().unwrap();

    assert_eq!(events1.lock().unwrap().len(), 1);
    assert_eq!(events2.lock().unwrap().len(), 2);

    traced7::clear_trace_callback();
}

#[test]
fn test_callback_can_use_different_singleton() {
    define_singleton!(main_entry, i32, || 42);
    define_singleton!(audit_log, Mutex<Vec<String>>, || Mutex::new(Vec::new()));

    // Logging into another entry from the callback is safe; only the same entry would deadlock.
    main_entry::set_trace_callback(move |event| {
        if let Ok(log) = audit_log::get() {
            log.lock().unwrap().push(event.to_string());
        }
    });

    main_entry::configure(InitPolicy::LazyLocked).unwrap();
    assert_eq!(*main_entry::get().unwrap(), 42);

    let log = audit_log::get().unwrap();
    let entries = log.lock().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries[1].contains("construct"));

    main_entry::clear_trace_callback();
}
