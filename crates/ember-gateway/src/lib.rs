//! Ember gateway
//!
//! Hands host values to an embedded Ember interpreter and reads results back.
//!
//! - [`Gateway`]: an owned interpreter with `assign`, `evaluate` and
//!   `evaluate_quietly`
//! - [`instance`]: the single process-wide gateway, built lazily from
//!   `ember.toml` configuration
//! - [`ffi`]: the same operations as `extern "C"` entry points

pub mod error;
pub mod ffi;
pub mod gateway;
pub mod instance;

pub use error::{GatewayError, GatewayResult, PreludeError};
pub use gateway::Gateway;
