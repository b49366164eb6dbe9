//! Shared test utilities for Ember runtime tests

#![allow(dead_code)]

use ember_runtime::api::{EvalError, Runtime, RuntimeConfig};
use ember_runtime::{sink_writer, OutputWriter, RuntimeError, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};

pub use pretty_assertions::assert_eq;

/// A runtime whose `print` output is discarded
pub fn quiet_runtime() -> Runtime {
    Runtime::with_config(RuntimeConfig::new().with_output(sink_writer()))
}

/// Evaluate source in a fresh quiet runtime
pub fn eval(source: &str) -> Result<Value, EvalError> {
    quiet_runtime().eval(source)
}

/// Assert that source code evaluates to a number
pub fn assert_eval_number(source: &str, expected: f64) {
    match eval(source) {
        Ok(Value::Number(n)) => assert_eq!(n, expected, "source: {}", source),
        other => panic!("Expected Number({}), got {:?}", expected, other),
    }
}

/// Assert that source code evaluates to a string
pub fn assert_eval_string(source: &str, expected: &str) {
    match eval(source) {
        Ok(Value::String(s)) => assert_eq!(s.as_str(), expected, "source: {}", source),
        other => panic!("Expected String({:?}), got {:?}", expected, other),
    }
}

/// Assert that source code evaluates to a boolean
pub fn assert_eval_bool(source: &str, expected: bool) {
    match eval(source) {
        Ok(Value::Bool(b)) => assert_eq!(b, expected, "source: {}", source),
        other => panic!("Expected Bool({}), got {:?}", expected, other),
    }
}

/// Assert that source code evaluates to null
pub fn assert_eval_null(source: &str) {
    match eval(source) {
        Ok(Value::Null) => {}
        other => panic!("Expected Null, got {:?}", other),
    }
}

/// Assert that source code evaluates to a value with the given display form
pub fn assert_eval_display(source: &str, expected: &str) {
    match eval(source) {
        Ok(value) => assert_eq!(value.to_string(), expected, "source: {}", source),
        Err(e) => panic!("Expected {}, got error: {}", expected, e),
    }
}

/// Evaluate source that must fail at runtime, returning the error
pub fn runtime_error(source: &str) -> RuntimeError {
    match eval(source) {
        Err(EvalError::Runtime(e)) => e,
        other => panic!("Expected runtime error, got {:?}", other),
    }
}

/// Assert that source code fails to parse with a specific diagnostic code
pub fn assert_error_code(source: &str, expected_code: &str) {
    match eval(source) {
        Err(EvalError::Parse(diags)) => {
            assert!(!diags.is_empty(), "Expected diagnostics, got none");
            assert_eq!(
                diags[0].code, expected_code,
                "Expected error code {}, got {}",
                expected_code, diags[0].code
            );
        }
        other => panic!("Expected parse error {}, got {:?}", expected_code, other),
    }
}

/// In-memory writer whose contents can be read after evaluation
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn writer(&self) -> OutputWriter {
        Arc::new(Mutex::new(Box::new(self.clone())))
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
