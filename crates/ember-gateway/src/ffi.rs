//! C ABI over the process-wide instance
//!
//! The three gateway operations are `ember_pass`, `ember_eval` and
//! `ember_eval_quietly`. Values cross the boundary as opaque `EmberValue`
//! handles created by the `ember_value_*` constructors and released with
//! `ember_value_free`. Strings returned to C are released with
//! `ember_string_free`.
//!
//! A failing call returns `-1` or a null pointer and records a message that
//! `ember_last_error` reads back on the same thread. Panics never unwind into
//! the caller.
//!
//! # Safety
//!
//! Pointer arguments must be null or point to live objects of the expected
//! kind: NUL-terminated UTF-8 for `*const c_char`, handles returned by this
//! library for `*const EmberValue`. Null pointers are reported as errors.

#![allow(clippy::not_unsafe_ptr_arg_deref)]

use crate::instance;
use ember_runtime::{stdout_writer, FromEmber, OutputWriter, ToEmber, Value};
use std::any::Any;
use std::cell::RefCell;
use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::io::{self, Write};
use std::panic;
use std::sync::{Arc, Mutex};

/// Opaque value handle
pub struct EmberValue {
    value: Value,
}

impl EmberValue {
    fn boxed(value: Value) -> *mut EmberValue {
        Box::into_raw(Box::new(EmberValue { value }))
    }
}

/// Receives printed output: `(bytes, length, user_data)`
pub type EmberOutputCallback = extern "C" fn(*const u8, usize, *mut c_void);

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(message: String) {
    tracing::debug!(%message, "ffi call failed");
    let message = CString::new(message.replace('\0', "\\0")).unwrap_or_default();
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(message));
}

fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f`, turning errors and panics into `fallback` plus a recorded message
fn guarded<T>(fallback: T, f: impl FnOnce() -> Result<T, String>) -> T {
    clear_last_error();
    match panic::catch_unwind(panic::AssertUnwindSafe(f)) {
        Ok(Ok(value)) => value,
        Ok(Err(message)) => {
            set_last_error(message);
            fallback
        }
        Err(payload) => {
            set_last_error(format!("panic: {}", panic_message(payload.as_ref())));
            fallback
        }
    }
}

fn read_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, String> {
    if ptr.is_null() {
        return Err(format!("{} is null", what));
    }
    // SAFETY: non-null and NUL-terminated per the module contract
    let cstr = unsafe { CStr::from_ptr(ptr) };
    cstr.to_str()
        .map_err(|_| format!("{} is not valid UTF-8", what))
}

fn read_value<'a>(ptr: *const EmberValue) -> Result<&'a Value, String> {
    if ptr.is_null() {
        return Err("value handle is null".to_string());
    }
    // SAFETY: non-null handles come from `EmberValue::boxed` and are live
    Ok(unsafe { &(*ptr).value })
}

fn to_c_string(text: String) -> Result<*mut c_char, String> {
    CString::new(text)
        .map(CString::into_raw)
        .map_err(|_| "string contains an interior NUL byte".to_string())
}

fn status(result: Result<(), String>) -> Result<c_int, String> {
    result.map(|()| 0)
}

// ── Gateway operations ───────────────────────────────────────────────────

/// Bind `value` under `name` in the process instance
///
/// Returns 0 on success and -1 on failure. The handle is not consumed.
#[no_mangle]
pub extern "C" fn ember_pass(value: *const EmberValue, name: *const c_char) -> c_int {
    guarded(-1, || {
        let value = read_value(value)?.clone();
        let name = read_str(name, "name")?;
        status(instance::assign(value, name).map_err(|e| e.to_string()))
    })
}

/// Evaluate `expression` and return its value as a new handle
///
/// Returns null on failure.
#[no_mangle]
pub extern "C" fn ember_eval(expression: *const c_char) -> *mut EmberValue {
    guarded(std::ptr::null_mut(), || {
        let expression = read_str(expression, "expression")?;
        instance::evaluate(expression)
            .map(EmberValue::boxed)
            .map_err(|e| e.to_string())
    })
}

/// Evaluate `expression`, discarding its value and printed output
///
/// Returns 0 on success and -1 on failure.
#[no_mangle]
pub extern "C" fn ember_eval_quietly(expression: *const c_char) -> c_int {
    guarded(-1, || {
        let expression = read_str(expression, "expression")?;
        status(instance::evaluate_quietly(expression).map_err(|e| e.to_string()))
    })
}

/// Drop the process instance; later calls fail
///
/// Returns 1 if an instance was live, 0 if not, -1 on failure.
#[no_mangle]
pub extern "C" fn ember_shutdown() -> c_int {
    guarded(-1, || {
        instance::shutdown()
            .map(c_int::from)
            .map_err(|e| e.to_string())
    })
}

/// Message of the last failed call on this thread, or null
///
/// The pointer stays valid until the next `ember_*` call on this thread.
#[no_mangle]
pub extern "C" fn ember_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |message| message.as_ptr())
    })
}

// ── Output ───────────────────────────────────────────────────────────────

struct CallbackWriter {
    callback: EmberOutputCallback,
    user_data: *mut c_void,
}

// SAFETY: the host that installs the callback owns `user_data` and accepts
// calls from whichever thread holds the instance
unsafe impl Send for CallbackWriter {}

impl Write for CallbackWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (self.callback)(buf.as_ptr(), buf.len(), self.user_data);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Send printed output to `callback`; a null callback restores stdout
///
/// Returns 0 on success and -1 on failure.
#[no_mangle]
pub extern "C" fn ember_set_output_callback(
    callback: Option<EmberOutputCallback>,
    user_data: *mut c_void,
) -> c_int {
    guarded(-1, || {
        let writer: OutputWriter = match callback {
            Some(callback) => Arc::new(Mutex::new(Box::new(CallbackWriter {
                callback,
                user_data,
            }))),
            None => stdout_writer(),
        };
        status(
            instance::with_gateway(|gateway| {
                gateway.set_output(writer);
                Ok(())
            })
            .map_err(|e| e.to_string()),
        )
    })
}

// ── Value handles ────────────────────────────────────────────────────────

#[no_mangle]
pub extern "C" fn ember_value_number(n: f64) -> *mut EmberValue {
    guarded(std::ptr::null_mut(), || {
        if n.is_finite() {
            Ok(EmberValue::boxed(Value::Number(n)))
        } else {
            Err(format!("{} is not a finite number", n))
        }
    })
}

#[no_mangle]
pub extern "C" fn ember_value_string(s: *const c_char) -> *mut EmberValue {
    guarded(std::ptr::null_mut(), || {
        Ok(EmberValue::boxed(read_str(s, "string")?.to_ember()))
    })
}

#[no_mangle]
pub extern "C" fn ember_value_bool(b: bool) -> *mut EmberValue {
    EmberValue::boxed(Value::Bool(b))
}

#[no_mangle]
pub extern "C" fn ember_value_null() -> *mut EmberValue {
    EmberValue::boxed(Value::Null)
}

/// Parse JSON text into a value; objects become maps
#[no_mangle]
pub extern "C" fn ember_value_from_json(json: *const c_char) -> *mut EmberValue {
    guarded(std::ptr::null_mut(), || {
        let text = read_str(json, "json")?;
        let parsed: serde_json::Value =
            serde_json::from_str(text).map_err(|e| format!("invalid JSON: {}", e))?;
        Ok(EmberValue::boxed(parsed.to_ember()))
    })
}

/// Render a value as JSON; free the result with `ember_string_free`
#[no_mangle]
pub extern "C" fn ember_value_to_json(value: *const EmberValue) -> *mut c_char {
    guarded(std::ptr::null_mut(), || {
        let json = serde_json::Value::from_ember(read_value(value)?).map_err(|e| e.to_string())?;
        to_c_string(json.to_string())
    })
}

/// Display form of a value; free the result with `ember_string_free`
#[no_mangle]
pub extern "C" fn ember_value_to_string(value: *const EmberValue) -> *mut c_char {
    guarded(std::ptr::null_mut(), || to_c_string(read_value(value)?.to_string()))
}

/// Numeric payload, or NaN when the value is not a number
#[no_mangle]
pub extern "C" fn ember_value_as_number(value: *const EmberValue) -> f64 {
    guarded(f64::NAN, || f64::from_ember(read_value(value)?).map_err(|e| e.to_string()))
}

/// Type name of a value as a static string, or null for a null handle
#[no_mangle]
pub extern "C" fn ember_value_type(value: *const EmberValue) -> *const c_char {
    guarded(std::ptr::null(), || {
        let name: &'static [u8] = match read_value(value)? {
            Value::Number(_) => b"number\0",
            Value::String(_) => b"string\0",
            Value::Bool(_) => b"bool\0",
            Value::Null => b"null\0",
            Value::Array(_) => b"array\0",
            Value::Map(_) => b"map\0",
            Value::Function(_) | Value::Builtin(_) | Value::NativeFunction(_) => b"function\0",
        };
        Ok(name.as_ptr().cast::<c_char>())
    })
}

#[no_mangle]
pub extern "C" fn ember_value_free(value: *mut EmberValue) {
    if !value.is_null() {
        // SAFETY: handles come from `EmberValue::boxed` and are freed once
        drop(unsafe { Box::from_raw(value) });
    }
}

#[no_mangle]
pub extern "C" fn ember_string_free(s: *mut c_char) {
    if !s.is_null() {
        // SAFETY: strings come from `to_c_string` and are freed once
        drop(unsafe { CString::from_raw(s) });
    }
}
