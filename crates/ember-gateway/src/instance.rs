//! The process-wide interpreter instance
//!
//! Exactly one [`Gateway`] exists per process. It is built either explicitly
//! with [`initialize`] or lazily by the first call that needs it, using the
//! configuration discovered from the current directory. [`shutdown`] drops it
//! for good: later calls fail with [`GatewayError::ShutDown`].
//!
//! Access is serialized by a mutex. Calling back into the instance from a
//! native function that the instance itself is running fails with
//! [`GatewayError::Reentrant`] rather than deadlocking.

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Gateway;
use ember_config::{Config, ConfigError, ConfigLoader};
use ember_runtime::{ToEmber, Value};
use std::cell::Cell;
use std::sync::{Mutex, MutexGuard};

enum Slot {
    Uninit,
    Live(Gateway),
    ShutDown,
}

static INSTANCE: Mutex<Slot> = Mutex::new(Slot::Uninit);

thread_local! {
    /// Set while this thread holds the instance
    static HOLDING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as holding the instance until dropped
struct HoldGuard;

impl HoldGuard {
    fn enter() -> GatewayResult<Self> {
        if HOLDING.with(Cell::get) {
            return Err(GatewayError::Reentrant);
        }
        HOLDING.with(|h| h.set(true));
        Ok(HoldGuard)
    }
}

impl Drop for HoldGuard {
    fn drop(&mut self) {
        HOLDING.with(|h| h.set(false));
    }
}

fn lock() -> MutexGuard<'static, Slot> {
    INSTANCE.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("interpreter instance lock was poisoned; recovering");
        poisoned.into_inner()
    })
}

fn discover_config() -> GatewayResult<Config> {
    let cwd = std::env::current_dir().map_err(ConfigError::from)?;
    Ok(ConfigLoader::new().load_from_directory(&cwd)?)
}

/// Build the instance from `config`
///
/// Fails if the instance already exists or was shut down.
pub fn initialize(config: &Config) -> GatewayResult<()> {
    let _hold = HoldGuard::enter()?;
    let mut slot = lock();
    match *slot {
        Slot::Live(_) => return Err(GatewayError::AlreadyInitialized),
        Slot::ShutDown => return Err(GatewayError::ShutDown),
        Slot::Uninit => {}
    }

    *slot = Slot::Live(Gateway::from_config(config)?);
    tracing::info!(sources = config.sources.len(), "interpreter instance initialized");
    Ok(())
}

/// Whether the instance currently exists
pub fn is_initialized() -> bool {
    // a holder is inside a call, so the instance is live
    if HOLDING.with(Cell::get) {
        return true;
    }
    matches!(*lock(), Slot::Live(_))
}

/// Drop the instance; returns whether one was live
///
/// The instance is never rebuilt afterwards.
pub fn shutdown() -> GatewayResult<bool> {
    let _hold = HoldGuard::enter()?;
    let mut slot = lock();
    let was_live = matches!(*slot, Slot::Live(_));
    *slot = Slot::ShutDown;
    tracing::info!(was_live, "interpreter instance shut down");
    Ok(was_live)
}

/// Run `f` against the instance, building it first if needed
pub fn with_gateway<R>(f: impl FnOnce(&mut Gateway) -> GatewayResult<R>) -> GatewayResult<R> {
    let _hold = HoldGuard::enter()?;
    let mut slot = lock();

    if matches!(*slot, Slot::Uninit) {
        let config = discover_config()?;
        *slot = Slot::Live(Gateway::from_config(&config)?);
        tracing::info!(
            project_root = ?config.project_root(),
            "interpreter instance initialized on first use"
        );
    }

    match &mut *slot {
        Slot::Live(gateway) => f(gateway),
        _ => Err(GatewayError::ShutDown),
    }
}

/// [`Gateway::assign`] on the process instance
pub fn assign(value: impl ToEmber, name: &str) -> GatewayResult<()> {
    with_gateway(|gateway| gateway.assign(value, name))
}

/// [`Gateway::evaluate`] on the process instance
pub fn evaluate(expression: &str) -> GatewayResult<Value> {
    with_gateway(|gateway| gateway.evaluate(expression))
}

/// [`Gateway::evaluate_quietly`] on the process instance
pub fn evaluate_quietly(expression: &str) -> GatewayResult<()> {
    with_gateway(|gateway| gateway.evaluate_quietly(expression))
}

/// [`Gateway::get`] on the process instance
pub fn get(name: &str) -> GatewayResult<Option<Value>> {
    with_gateway(|gateway| Ok(gateway.get(name)))
}
