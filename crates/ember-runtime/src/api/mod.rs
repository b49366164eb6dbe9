//! Public embedding API for the Ember runtime
//!
//! - `Runtime` evaluates source against a persistent global environment
//! - `RuntimeConfig` sets limits and the output destination
//! - `ToEmber`/`FromEmber` convert between Rust and Ember values
//! - `native` wraps Rust closures as callable script functions
//!
//! # Examples
//!
//! ```
//! use ember_runtime::api::Runtime;
//! use ember_runtime::Value;
//!
//! let mut runtime = Runtime::new();
//! runtime.set_global("x", Value::Number(40.0));
//! let result = runtime.eval("x + 2").unwrap();
//! assert_eq!(result, Value::Number(42.0));
//! ```

pub mod config;
pub mod conversion;
pub mod native;
pub mod runtime;

pub use config::RuntimeConfig;
pub use conversion::{ConversionError, FromEmber, ToEmber};
pub use runtime::{EvalError, Runtime};
