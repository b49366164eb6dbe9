//! The gateway: one embedded interpreter behind three operations
//!
//! A host hands values in with [`Gateway::assign`], runs code and reads the
//! result back with [`Gateway::evaluate`], and runs code purely for its side
//! effects with [`Gateway::evaluate_quietly`]. Bindings persist between calls.
//!
//! # Examples
//!
//! ```
//! use ember_gateway::Gateway;
//! use ember_runtime::Value;
//!
//! let mut gateway = Gateway::new();
//! gateway.assign(20.0, "x").unwrap();
//! gateway.evaluate_quietly("var y = x * 2;").unwrap();
//! assert_eq!(gateway.evaluate("y + 2").unwrap(), Value::Number(42.0));
//! ```

use crate::error::{GatewayError, GatewayResult, PreludeError};
use ember_config::Config;
use ember_runtime::{
    is_valid_identifier, sink_writer, OutputWriter, Runtime, RuntimeConfig, RuntimeError,
    ToEmber, Value,
};
use std::path::{Path, PathBuf};

/// Label used in errors for `[prelude] source`
const INLINE_PRELUDE: &str = "<inline prelude>";

/// Per-call event: `info` when the gateway is verbose, `debug` otherwise
macro_rules! call_event {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

/// Owner of one interpreter instance
pub struct Gateway {
    runtime: Runtime,
    verbose: bool,
}

impl Gateway {
    /// Gateway with default limits, printing to stdout
    pub fn new() -> Self {
        Self::with_runtime(Runtime::new())
    }

    pub fn with_runtime(runtime: Runtime) -> Self {
        Self {
            runtime,
            verbose: false,
        }
    }

    /// Build a gateway from merged configuration
    ///
    /// Applies `[runtime]` limits, then evaluates every prelude file followed
    /// by the inline prelude source, all quietly. The first failing prelude
    /// fails construction.
    pub fn from_config(config: &Config) -> GatewayResult<Self> {
        let mut runtime_config = RuntimeConfig::new();
        if let Some(depth) = config.max_call_depth() {
            runtime_config = runtime_config.with_max_call_depth(depth);
        }

        let mut gateway = Self {
            runtime: Runtime::with_config(runtime_config),
            verbose: config.verbose(),
        };

        for path in config.prelude_files() {
            gateway.run_prelude_file(path)?;
        }
        if let Some(source) = config.prelude_source() {
            gateway
                .evaluate_quietly(source)
                .map_err(|e| prelude_failure(PathBuf::from(INLINE_PRELUDE), e))?;
        }

        tracing::info!(
            max_call_depth = gateway.runtime.max_call_depth(),
            preludes = config.prelude_files().len(),
            "interpreter ready"
        );
        Ok(gateway)
    }

    fn run_prelude_file(&mut self, path: &Path) -> GatewayResult<()> {
        let source = std::fs::read_to_string(path).map_err(|e| GatewayError::Prelude {
            path: path.to_path_buf(),
            source: PreludeError::Io(e),
        })?;
        tracing::debug!(path = %path.display(), "evaluating prelude");
        self.evaluate_quietly(&source)
            .map_err(|e| prelude_failure(path.to_path_buf(), e))
    }

    /// Bind `value` under `name` in the global environment
    ///
    /// Replaces any existing binding of that name, including `let` bindings
    /// and functions. The binding is mutable from scripts.
    pub fn assign(&mut self, value: impl ToEmber, name: &str) -> GatewayResult<()> {
        if !is_valid_identifier(name) {
            tracing::warn!(name, "rejected binding name");
            return Err(GatewayError::InvalidName(name.to_string()));
        }
        let value = value.to_ember();
        call_event!(self.verbose, name, kind = value.type_name(), "assign");
        self.runtime.set_global(name, value);
        Ok(())
    }

    /// Parse and evaluate `expression`, returning its value
    ///
    /// The value is that of the last expression statement; source ending in
    /// a declaration or loop yields `null`.
    pub fn evaluate(&mut self, expression: &str) -> GatewayResult<Value> {
        call_event!(self.verbose, bytes = expression.len(), "evaluate");
        self.runtime.eval(expression).map_err(|e| {
            tracing::debug!(error = %e, "evaluation failed");
            GatewayError::Eval(e)
        })
    }

    /// Evaluate `expression` for its side effects only
    ///
    /// Output printed while it runs is discarded. The previous writer is put
    /// back whether evaluation succeeds, fails, or unwinds out of a host
    /// function.
    pub fn evaluate_quietly(&mut self, expression: &str) -> GatewayResult<()> {
        call_event!(self.verbose, bytes = expression.len(), "evaluate quietly");
        let result = {
            let silenced = SilencedOutput::new(&mut self.runtime);
            silenced.runtime.eval(expression)
        };
        result.map(drop).map_err(|e| {
            tracing::debug!(error = %e, "quiet evaluation failed");
            GatewayError::Eval(e)
        })
    }

    /// Read a binding without evaluating anything
    pub fn get(&self, name: &str) -> Option<Value> {
        self.runtime.get_global(name)
    }

    /// Drop a binding; returns whether it existed
    pub fn remove(&mut self, name: &str) -> bool {
        call_event!(self.verbose, name, "remove");
        self.runtime.remove_global(name)
    }

    /// Sorted names of user bindings
    pub fn bindings(&self) -> Vec<String> {
        self.runtime.global_names()
    }

    /// Redirect `print`, returning the previous writer
    pub fn set_output(&mut self, output: OutputWriter) -> OutputWriter {
        self.runtime.set_output(output)
    }

    /// Expose a host closure to scripts under `name`
    pub fn register_function<F>(&mut self, name: &str, arity: usize, f: F) -> GatewayResult<()>
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        if !is_valid_identifier(name) {
            return Err(GatewayError::InvalidName(name.to_string()));
        }
        call_event!(self.verbose, name, arity, "register function");
        self.runtime.register_function(name, arity, f);
        Ok(())
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn max_call_depth(&self) -> usize {
        self.runtime.max_call_depth()
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("bindings", &self.bindings())
            .field("max_call_depth", &self.max_call_depth())
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Swaps in the sink writer and restores the previous one on drop
struct SilencedOutput<'a> {
    runtime: &'a mut Runtime,
    previous: Option<OutputWriter>,
}

impl<'a> SilencedOutput<'a> {
    fn new(runtime: &'a mut Runtime) -> Self {
        let previous = runtime.set_output(sink_writer());
        Self {
            runtime,
            previous: Some(previous),
        }
    }
}

impl Drop for SilencedOutput<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.runtime.set_output(previous);
        }
    }
}

fn prelude_failure(path: PathBuf, error: GatewayError) -> GatewayError {
    match error {
        GatewayError::Eval(e) => GatewayError::Prelude {
            path,
            source: PreludeError::Eval(e),
        },
        other => other,
    }
}
