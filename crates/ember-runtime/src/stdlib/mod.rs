//! Standard library functions
//!
//! Builtins are resolved by name when a script refers to an identifier that
//! is not bound in any scope, so user bindings may shadow them.

pub mod array;
pub mod math;
pub mod string;

use crate::span::Span;
use crate::value::{RuntimeError, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Shared destination for `print`
///
/// The writer sits behind `Arc<Mutex<..>>` so hosts can keep a handle to it
/// (for example to capture output in tests) while the runtime writes to it.
pub type OutputWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// An `OutputWriter` that writes to process stdout
pub fn stdout_writer() -> OutputWriter {
    Arc::new(Mutex::new(Box::new(std::io::stdout())))
}

/// An `OutputWriter` that discards everything written to it
pub fn sink_writer() -> OutputWriter {
    Arc::new(Mutex::new(Box::new(std::io::sink())))
}

/// Every builtin name, in registration order
pub const BUILTINS: &[&str] = &[
    "print",
    "len",
    "str",
    "typeof",
    // Arrays and maps
    "push",
    "keys",
    // Math
    "abs",
    "floor",
    "ceil",
    "round",
    "sqrt",
    "pow",
    "min",
    "max",
    // Strings
    "split",
    "join",
    "trim",
    "toUpperCase",
    "toLowerCase",
    "toNumber",
];

/// Check if a function name is a builtin
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Call a builtin function by name
pub fn call_builtin(
    name: &str,
    args: &[Value],
    call_span: Span,
    output: &OutputWriter,
) -> Result<Value, RuntimeError> {
    match name {
        "print" => {
            expect_args(name, args, 1, call_span)?;
            print(&args[0], call_span, output)?;
            Ok(Value::Null)
        }
        "len" => {
            expect_args(name, args, 1, call_span)?;
            Ok(Value::Number(len(&args[0], call_span)?))
        }
        "str" => {
            expect_args(name, args, 1, call_span)?;
            Ok(Value::string(args[0].to_string()))
        }
        "typeof" => {
            expect_args(name, args, 1, call_span)?;
            Ok(Value::string(args[0].type_name()))
        }

        "push" => {
            expect_args(name, args, 2, call_span)?;
            let arr = extract_array(&args[0], name, call_span)?;
            Ok(array::push(arr, args[1].clone()))
        }
        "keys" => {
            expect_args(name, args, 1, call_span)?;
            match &args[0] {
                Value::Map(map) => Ok(array::keys(map)),
                other => Err(type_mismatch(name, "map", other, call_span)),
            }
        }

        "abs" | "floor" | "ceil" | "round" | "sqrt" => {
            expect_args(name, args, 1, call_span)?;
            let n = extract_number(&args[0], name, call_span)?;
            math::unary(name, n, call_span).map(Value::Number)
        }
        "pow" => {
            expect_args(name, args, 2, call_span)?;
            let base = extract_number(&args[0], name, call_span)?;
            let exponent = extract_number(&args[1], name, call_span)?;
            math::pow(base, exponent, call_span).map(Value::Number)
        }
        "min" | "max" => {
            if args.is_empty() {
                return Err(RuntimeError::InvalidStdlibArgument {
                    msg: format!("{}() requires at least one argument", name),
                    span: call_span,
                });
            }
            let numbers = args
                .iter()
                .map(|arg| extract_number(arg, name, call_span))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Number(if name == "min" {
                math::min(&numbers)
            } else {
                math::max(&numbers)
            }))
        }

        "split" => {
            expect_args(name, args, 2, call_span)?;
            let s = extract_string(&args[0], name, call_span)?;
            let sep = extract_string(&args[1], name, call_span)?;
            Ok(string::split(s, sep))
        }
        "join" => {
            expect_args(name, args, 2, call_span)?;
            let parts = extract_array(&args[0], name, call_span)?;
            let sep = extract_string(&args[1], name, call_span)?;
            string::join(parts.as_slice(), sep, call_span).map(Value::string)
        }
        "trim" | "toUpperCase" | "toLowerCase" => {
            expect_args(name, args, 1, call_span)?;
            let s = extract_string(&args[0], name, call_span)?;
            Ok(Value::string(match name {
                "trim" => s.trim().to_string(),
                "toUpperCase" => s.to_uppercase(),
                _ => s.to_lowercase(),
            }))
        }
        "toNumber" => {
            expect_args(name, args, 1, call_span)?;
            string::to_number(&args[0], call_span).map(Value::Number)
        }

        _ => Err(RuntimeError::UnknownFunction {
            name: name.to_string(),
            span: call_span,
        }),
    }
}

/// Write a value and a newline to the runtime's output
pub fn print(value: &Value, span: Span, output: &OutputWriter) -> Result<(), RuntimeError> {
    // a poisoned writer is still usable; the panic happened in someone else's write
    let mut writer = output.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    writeln!(writer, "{}", value)
        .and_then(|_| writer.flush())
        .map_err(|e| RuntimeError::IoError {
            message: e.to_string(),
            span,
        })
}

/// Length of a string (in chars), array, or map
pub fn len(value: &Value, span: Span) -> Result<f64, RuntimeError> {
    match value {
        Value::String(s) => Ok(s.chars().count() as f64),
        Value::Array(arr) => Ok(arr.len() as f64),
        Value::Map(map) => Ok(map.len() as f64),
        other => Err(type_mismatch("len", "string, array or map", other, span)),
    }
}

fn expect_args(name: &str, args: &[Value], expected: usize, span: Span) -> Result<(), RuntimeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::ArityMismatch {
            name: name.to_string(),
            expected,
            found: args.len(),
            span,
        })
    }
}

fn type_mismatch(name: &str, expected: &str, found: &Value, span: Span) -> RuntimeError {
    RuntimeError::InvalidStdlibArgument {
        msg: format!(
            "{}() expected {}, found {}",
            name,
            expected,
            found.type_name()
        ),
        span,
    }
}

pub(crate) fn extract_string<'a>(
    value: &'a Value,
    name: &str,
    span: Span,
) -> Result<&'a str, RuntimeError> {
    match value {
        Value::String(s) => Ok(s.as_str()),
        other => Err(type_mismatch(name, "string", other, span)),
    }
}

pub(crate) fn extract_number(value: &Value, name: &str, span: Span) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(type_mismatch(name, "number", other, span)),
    }
}

fn extract_array<'a>(
    value: &'a Value,
    name: &str,
    span: Span,
) -> Result<&'a crate::value::ValueArray, RuntimeError> {
    match value {
        Value::Array(arr) => Ok(arr),
        other => Err(type_mismatch(name, "array", other, span)),
    }
}
