//! Instance lifecycle: lazy construction and shutdown
//!
//! Shutdown is permanent for the process, so this binary holds a single test.

use ember_config::Config;
use ember_gateway::{instance, GatewayError};
use ember_runtime::Value;
use pretty_assertions::assert_eq;

#[test]
fn test_lazy_instance_then_shutdown() {
    assert!(!instance::is_initialized());

    instance::evaluate_quietly("var survived = 1;").unwrap();
    assert!(instance::is_initialized());
    assert_eq!(instance::evaluate("survived").unwrap(), Value::Number(1.0));

    assert!(instance::shutdown().unwrap());
    assert!(!instance::is_initialized());

    assert!(matches!(instance::evaluate("survived"), Err(GatewayError::ShutDown)));
    assert!(matches!(instance::assign(1.0, "x"), Err(GatewayError::ShutDown)));
    assert!(matches!(
        instance::initialize(&Config::default()),
        Err(GatewayError::ShutDown)
    ));
    assert!(!instance::shutdown().unwrap());
}
