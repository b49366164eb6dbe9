//! Runtime execution API
//!
//! `Runtime` owns one interpreter whose globals persist across `eval` calls.
//!
//! # Examples
//!
//! ```
//! use ember_runtime::api::Runtime;
//!
//! let mut runtime = Runtime::new();
//! runtime.eval("let x = 42;").unwrap();
//!
//! // State persists
//! let result = runtime.eval("x").unwrap();
//! assert_eq!(result.to_string(), "42");
//! ```

use crate::api::config::RuntimeConfig;
use crate::api::native;
use crate::diagnostic::Diagnostic;
use crate::interpreter::Interpreter;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::stdlib::{stdout_writer, OutputWriter};
use crate::value::{RuntimeError, Value};
use thiserror::Error;

/// Unified error type for runtime evaluation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Lexical or syntax errors
    #[error("{}", render_diagnostics(.0))]
    Parse(Vec<Diagnostic>),
    /// Errors raised while executing
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runtime instance managing execution state
///
/// Maintains global variables and function definitions across multiple
/// evaluations.
pub struct Runtime {
    interpreter: Interpreter,
}

impl Runtime {
    /// Create a runtime with default limits that prints to stdout
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let output = config.output.unwrap_or_else(stdout_writer);
        let mut interpreter = Interpreter::new(output);
        interpreter.set_max_call_depth(config.max_call_depth);
        Self { interpreter }
    }

    /// Evaluate Ember source code
    ///
    /// Runs lex → parse → execute and returns the value of the last
    /// statement. The final statement may leave off its `;`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_runtime::api::Runtime;
    ///
    /// let mut runtime = Runtime::new();
    /// assert_eq!(runtime.eval("1 + 2").unwrap().to_string(), "3");
    /// ```
    pub fn eval(&mut self, source: &str) -> Result<Value, EvalError> {
        let (tokens, mut diagnostics) = Lexer::new(source).tokenize();
        let (program, parse_diagnostics) = Parser::new(tokens).parse();
        diagnostics.extend(parse_diagnostics);

        if !diagnostics.is_empty() {
            tracing::trace!(count = diagnostics.len(), "source rejected by parser");
            return Err(EvalError::Parse(
                diagnostics.into_iter().map(|d| d.locate(source)).collect(),
            ));
        }

        Ok(self.interpreter.eval(&program)?)
    }

    /// Create or replace a global variable
    ///
    /// The binding is mutable from scripts and visible to later evaluations.
    pub fn set_global(&mut self, name: &str, value: Value) {
        self.interpreter.define_global(name, value);
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.interpreter.get_global(name)
    }

    /// Remove a global; returns whether it existed
    pub fn remove_global(&mut self, name: &str) -> bool {
        self.interpreter.remove_global(name)
    }

    /// Sorted names of every global binding (builtins excluded)
    pub fn global_names(&self) -> Vec<String> {
        self.interpreter.global_names()
    }

    /// Register a native function with fixed arity
    ///
    /// Calls with the wrong number of arguments fail with `ArityMismatch`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ember_runtime::api::Runtime;
    /// use ember_runtime::value::{RuntimeError, Value};
    /// use ember_runtime::span::Span;
    ///
    /// let mut runtime = Runtime::new();
    /// runtime.register_function("double", 1, |args| match &args[0] {
    ///     Value::Number(n) => Ok(Value::Number(n * 2.0)),
    ///     other => Err(RuntimeError::TypeError {
    ///         msg: format!("expected number, found {}", other.type_name()),
    ///         span: Span::dummy(),
    ///     }),
    /// });
    ///
    /// assert_eq!(runtime.eval("double(21)").unwrap().to_string(), "42");
    /// ```
    pub fn register_function<F>(&mut self, name: &str, arity: usize, implementation: F)
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.set_global(name, native::fixed_arity(name, arity, implementation));
    }

    /// Register a native function that validates its own arguments
    pub fn register_variadic<F>(&mut self, name: &str, implementation: F)
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.set_global(name, native::variadic(implementation));
    }

    /// Redirect `print`, returning the previous writer
    pub fn set_output(&mut self, output: OutputWriter) -> OutputWriter {
        self.interpreter.set_output(output)
    }

    pub fn output(&self) -> &OutputWriter {
        self.interpreter.output()
    }

    pub fn max_call_depth(&self) -> usize {
        self.interpreter.max_call_depth()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
