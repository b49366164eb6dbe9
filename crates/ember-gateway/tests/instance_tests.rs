//! Process-wide instance tests
//!
//! The instance is shared by every test in this binary, so each test uses
//! its own binding names.

use ember_config::Config;
use ember_gateway::{instance, GatewayError};
use ember_runtime::{sink_writer, RuntimeError, Span, Value};
use pretty_assertions::assert_eq;
use serial_test::serial;

fn ensure_instance() {
    match instance::initialize(&Config::default()) {
        Ok(()) | Err(GatewayError::AlreadyInitialized) => {}
        Err(e) => panic!("could not initialize: {}", e),
    }
    instance::with_gateway(|gateway| {
        gateway.set_output(sink_writer());
        Ok(())
    })
    .unwrap();
}

#[test]
#[serial]
fn test_assign_then_evaluate_on_instance() {
    ensure_instance();
    instance::assign(7.0, "instance_seven").unwrap();
    assert_eq!(
        instance::evaluate("instance_seven * 6").unwrap(),
        Value::Number(42.0)
    );
}

#[test]
#[serial]
fn test_instance_keeps_state_between_calls() {
    ensure_instance();
    instance::evaluate_quietly("var instance_log = [];").unwrap();
    // push returns a new array; the binding only changes on reassignment
    instance::evaluate_quietly("push(instance_log, 1);").unwrap();
    instance::evaluate_quietly("instance_log = push(instance_log, 2);").unwrap();
    assert_eq!(
        instance::get("instance_log").unwrap().map(|v| v.to_string()),
        Some("[2]".to_string())
    );
}

#[test]
#[serial]
fn test_second_initialize_is_rejected() {
    ensure_instance();
    assert!(instance::is_initialized());
    assert!(matches!(
        instance::initialize(&Config::default()),
        Err(GatewayError::AlreadyInitialized)
    ));
}

#[test]
#[serial]
fn test_reentrant_call_is_reported() {
    ensure_instance();
    instance::with_gateway(|gateway| {
        gateway.register_function("instance_nested", 0, |_| {
            instance::evaluate("1").map_err(|e| RuntimeError::InvalidStdlibArgument {
                msg: e.to_string(),
                span: Span::dummy(),
            })
        })
    })
    .unwrap();

    let err = instance::evaluate("instance_nested()").unwrap_err();
    assert!(
        err.to_string().contains("re-entrant"),
        "unexpected error: {}",
        err
    );

    // the guard is released afterwards
    assert_eq!(instance::evaluate("2").unwrap(), Value::Number(2.0));
}

#[test]
#[serial]
fn test_invalid_name_through_instance() {
    ensure_instance();
    assert!(matches!(
        instance::assign(1.0, "not valid"),
        Err(GatewayError::InvalidName(_))
    ));
}
