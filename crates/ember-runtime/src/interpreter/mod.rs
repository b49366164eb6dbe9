//! AST interpreter (tree-walking)
//!
//! Direct AST evaluation with environment-based variable storage.
//! - Globals persist across `eval` calls; locals live for one block or call
//! - Function values own their declaration and see globals plus their own
//!   parameters and locals
//! - Control flow (`break`, `continue`, `return`) travels as a signal
//! - Call depth is bounded so runaway recursion becomes a `RuntimeError`

mod expr;
mod stmt;

use crate::ast::Program;
use crate::span::Span;
use crate::stdlib::OutputWriter;
use crate::value::{RuntimeError, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Default bound on nested user-function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// Control flow signal for handling break, continue, and return
#[derive(Debug, Clone, PartialEq)]
pub(super) enum ControlFlow {
    None,
    Break,
    Continue,
    Return(Value),
}

/// A named value and whether it may be reassigned
#[derive(Debug, Clone)]
pub(super) struct Binding {
    pub(super) value: Value,
    pub(super) mutable: bool,
}

/// Interpreter state
pub struct Interpreter {
    /// Global variables
    pub(super) globals: HashMap<String, Binding>,
    /// Local scopes (stack of environments); empty at top level
    pub(super) locals: Vec<HashMap<String, Binding>>,
    /// Current control flow state
    pub(super) control_flow: ControlFlow,
    /// Loops enclosing the current statement within the current function
    pub(super) loop_depth: usize,
    pub(super) call_depth: usize,
    pub(super) max_call_depth: usize,
    /// Destination for `print`
    pub(super) output: OutputWriter,
}

impl Interpreter {
    /// Create a new interpreter writing to `output`
    pub fn new(output: OutputWriter) -> Self {
        Self {
            globals: HashMap::new(),
            locals: Vec::new(),
            control_flow: ControlFlow::None,
            loop_depth: 0,
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            output,
        }
    }

    /// Evaluate a program
    ///
    /// Returns the value of the last statement. After an error the
    /// interpreter is back at top level with its globals intact, so the
    /// next call starts clean.
    pub fn eval(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let result = self.eval_program(program);
        self.reset_frames();
        result
    }

    fn eval_program(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let mut last_value = Value::Null;

        for stmt in &program.statements {
            last_value = self.eval_statement(stmt)?;

            // `return` at top level ends the program with its value
            if let ControlFlow::Return(val) = &self.control_flow {
                last_value = val.clone();
                break;
            }
        }

        Ok(last_value)
    }

    fn reset_frames(&mut self) {
        self.locals.clear();
        self.control_flow = ControlFlow::None;
        self.loop_depth = 0;
        self.call_depth = 0;
    }

    /// Get a variable value
    pub(super) fn get_variable(&self, name: &str, span: Span) -> Result<Value, RuntimeError> {
        for scope in self.locals.iter().rev() {
            if let Some(binding) = scope.get(name) {
                return Ok(binding.value.clone());
            }
        }

        if let Some(binding) = self.globals.get(name) {
            return Ok(binding.value.clone());
        }

        if crate::stdlib::is_builtin(name) {
            return Ok(Value::Builtin(Arc::from(name)));
        }

        Err(RuntimeError::UndefinedVariable {
            name: name.to_string(),
            span,
        })
    }

    /// Modify an existing mutable variable in place
    pub(super) fn update_variable<F>(
        &mut self,
        name: &str,
        span: Span,
        update: F,
    ) -> Result<(), RuntimeError>
    where
        F: FnOnce(&mut Value) -> Result<(), RuntimeError>,
    {
        let binding = self
            .locals
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
            .or_else(|| self.globals.get_mut(name));

        match binding {
            Some(binding) if binding.mutable => update(&mut binding.value),
            Some(_) => Err(RuntimeError::ImmutableAssignment {
                name: name.to_string(),
                span,
            }),
            None => Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
                span,
            }),
        }
    }

    /// Introduce a binding in the innermost scope (globals at top level)
    pub(super) fn declare(&mut self, name: &str, value: Value, mutable: bool) {
        let binding = Binding { value, mutable };
        match self.locals.last_mut() {
            Some(scope) => scope.insert(name.to_string(), binding),
            None => self.globals.insert(name.to_string(), binding),
        };
    }

    pub(super) fn push_scope(&mut self) {
        self.locals.push(HashMap::new());
    }

    pub(super) fn pop_scope(&mut self) {
        self.locals.pop();
    }

    // === Host-facing global environment ===

    /// Bind a global; host-defined globals are mutable from scripts
    pub fn define_global(&mut self, name: &str, value: Value) {
        self.globals.insert(
            name.to_string(),
            Binding {
                value,
                mutable: true,
            },
        );
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.globals.get(name).map(|binding| binding.value.clone())
    }

    /// Remove a global binding; returns whether one existed
    pub fn remove_global(&mut self, name: &str) -> bool {
        self.globals.remove(name).is_some()
    }

    /// Names of all global bindings, sorted
    pub fn global_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.globals.keys().cloned().collect();
        names.sort();
        names
    }

    /// Replace the output writer, returning the previous one
    pub fn set_output(&mut self, output: OutputWriter) -> OutputWriter {
        std::mem::replace(&mut self.output, output)
    }

    pub fn output(&self) -> &OutputWriter {
        &self.output
    }

    pub fn set_max_call_depth(&mut self, depth: usize) {
        self.max_call_depth = depth;
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;
    use crate::stdlib::sink_writer;

    #[test]
    fn test_define_and_read_global() {
        let mut interp = Interpreter::new(sink_writer());
        interp.define_global("x", Value::Number(42.0));
        assert_eq!(interp.get_global("x"), Some(Value::Number(42.0)));
        assert_eq!(interp.global_names(), vec!["x".to_string()]);
    }

    #[test]
    fn test_eval_literal() {
        let interp = Interpreter::new(sink_writer());
        assert_eq!(
            interp.eval_literal(&Literal::Number(42.0)),
            Value::Number(42.0)
        );
        assert_eq!(interp.eval_literal(&Literal::Bool(true)), Value::Bool(true));
        assert_eq!(interp.eval_literal(&Literal::Null), Value::Null);
    }

    #[test]
    fn test_scope_management() {
        let mut interp = Interpreter::new(sink_writer());
        assert_eq!(interp.locals.len(), 0);

        interp.push_scope();
        interp.declare("inner", Value::Null, false);
        assert_eq!(interp.locals.len(), 1);
        assert!(interp.get_global("inner").is_none());

        interp.pop_scope();
        assert_eq!(interp.locals.len(), 0);
    }

    #[test]
    fn test_immutable_binding_rejects_assignment() {
        let mut interp = Interpreter::new(sink_writer());
        interp.declare("fixed", Value::Number(1.0), false);
        let err = interp
            .update_variable("fixed", Span::dummy(), |v| {
                *v = Value::Number(2.0);
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ImmutableAssignment { .. }));
    }

    #[test]
    fn test_remove_global() {
        let mut interp = Interpreter::new(sink_writer());
        interp.define_global("gone", Value::Bool(true));
        assert!(interp.remove_global("gone"));
        assert!(!interp.remove_global("gone"));
    }
}
