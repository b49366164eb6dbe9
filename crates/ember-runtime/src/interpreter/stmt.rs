//! Statement execution

use crate::ast::*;
use crate::interpreter::expr::{apply_binary, element_mut, get_element, set_element};
use crate::interpreter::{ControlFlow, Interpreter};
use crate::span::Span;
use crate::value::{RuntimeError, UserFunction, Value};
use std::sync::Arc;

impl Interpreter {
    /// Execute a statement
    pub(super) fn eval_statement(&mut self, stmt: &Stmt) -> Result<Value, RuntimeError> {
        match stmt {
            Stmt::VarDecl(var) => {
                let value = self.eval_expr(&var.init)?;
                self.declare(&var.name.name, value, var.mutable);
                Ok(Value::Null)
            }
            Stmt::FunctionDecl(func) => {
                self.eval_function_decl(func);
                Ok(Value::Null)
            }
            Stmt::Assign(assign) => {
                let value = self.eval_expr(&assign.value)?;
                self.write_target(&assign.target, |_| Ok(value))?;
                Ok(Value::Null)
            }
            Stmt::CompoundAssign(compound) => {
                let rhs = self.eval_expr(&compound.value)?;
                let op = compound.op.binary_op();
                let span = compound.span;
                self.write_target(&compound.target, |current| {
                    apply_binary(op, current, rhs, span)
                })?;
                Ok(Value::Null)
            }
            Stmt::Increment(inc) => self.step_target(&inc.target, BinaryOp::Add, inc.span),
            Stmt::Decrement(dec) => self.step_target(&dec.target, BinaryOp::Sub, dec.span),
            Stmt::If(if_stmt) => self.eval_if(if_stmt),
            Stmt::While(while_stmt) => self.eval_while(while_stmt),
            Stmt::For(for_stmt) => self.eval_for(for_stmt),
            Stmt::ForIn(for_in_stmt) => self.eval_for_in(for_in_stmt),
            Stmt::Return(return_stmt) => {
                let value = match &return_stmt.value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                self.control_flow = ControlFlow::Return(value);
                Ok(Value::Null)
            }
            Stmt::Break(span) => {
                self.require_loop("break", *span)?;
                self.control_flow = ControlFlow::Break;
                Ok(Value::Null)
            }
            Stmt::Continue(span) => {
                self.require_loop("continue", *span)?;
                self.control_flow = ControlFlow::Continue;
                Ok(Value::Null)
            }
            Stmt::Block(block) => self.eval_block(block),
            Stmt::Expr(expr_stmt) => self.eval_expr(&expr_stmt.expr),
        }
    }

    /// Bind a function declaration as an immutable name in the current scope
    ///
    /// Each execution of a declaration creates a new function value, so a
    /// redeclaration never changes values already handed out.
    fn eval_function_decl(&mut self, func: &FunctionDecl) {
        let value = Value::Function(Arc::new(UserFunction {
            name: func.name.name.clone(),
            params: func.params.clone(),
            body: func.body.clone(),
        }));
        self.declare(&func.name.name, value, false);
    }

    fn require_loop(&self, keyword: &'static str, span: Span) -> Result<(), RuntimeError> {
        if self.loop_depth == 0 {
            return Err(RuntimeError::InvalidControlFlow {
                keyword,
                context: "a loop",
                span,
            });
        }
        Ok(())
    }

    /// Evaluate a block in its own scope, yielding the last statement's value
    pub(super) fn eval_block(&mut self, block: &Block) -> Result<Value, RuntimeError> {
        self.push_scope();
        let result = self.eval_block_statements(block);
        self.pop_scope();
        result
    }

    fn eval_block_statements(&mut self, block: &Block) -> Result<Value, RuntimeError> {
        let mut last_value = Value::Null;
        for stmt in &block.statements {
            last_value = self.eval_statement(stmt)?;
            if self.control_flow != ControlFlow::None {
                break;
            }
        }
        Ok(last_value)
    }

    fn eval_if(&mut self, if_stmt: &IfStmt) -> Result<Value, RuntimeError> {
        if self.eval_expr(&if_stmt.cond)?.is_truthy() {
            self.eval_block(&if_stmt.then_block)
        } else if let Some(else_block) = &if_stmt.else_block {
            self.eval_block(else_block)
        } else {
            Ok(Value::Null)
        }
    }

    fn eval_while(&mut self, while_stmt: &WhileStmt) -> Result<Value, RuntimeError> {
        self.loop_depth += 1;
        let result = self.run_while(while_stmt);
        self.loop_depth -= 1;
        result
    }

    fn run_while(&mut self, while_stmt: &WhileStmt) -> Result<Value, RuntimeError> {
        while self.eval_expr(&while_stmt.cond)?.is_truthy() {
            self.eval_block(&while_stmt.body)?;
            if self.finish_iteration() {
                break;
            }
        }
        Ok(Value::Null)
    }

    fn eval_for(&mut self, for_stmt: &ForStmt) -> Result<Value, RuntimeError> {
        // init bindings live in a scope wrapping the whole loop
        self.push_scope();
        self.loop_depth += 1;
        let result = self.run_for(for_stmt);
        self.loop_depth -= 1;
        self.pop_scope();
        result
    }

    fn run_for(&mut self, for_stmt: &ForStmt) -> Result<Value, RuntimeError> {
        self.eval_statement(&for_stmt.init)?;

        while self.eval_expr(&for_stmt.cond)?.is_truthy() {
            self.eval_block(&for_stmt.body)?;
            if self.finish_iteration() {
                break;
            }
            self.eval_statement(&for_stmt.step)?;
        }
        Ok(Value::Null)
    }

    fn eval_for_in(&mut self, for_in: &ForInStmt) -> Result<Value, RuntimeError> {
        let items = match self.eval_expr(&for_in.iterable)? {
            Value::Array(arr) => arr,
            other => {
                return Err(RuntimeError::TypeError {
                    msg: format!("for-in requires an array, found {}", other.type_name()),
                    span: for_in.iterable.span(),
                })
            }
        };

        self.loop_depth += 1;
        let result = self.run_for_in(for_in, items.as_slice());
        self.loop_depth -= 1;
        result
    }

    fn run_for_in(&mut self, for_in: &ForInStmt, items: &[Value]) -> Result<Value, RuntimeError> {
        for item in items {
            self.push_scope();
            self.declare(&for_in.variable.name, item.clone(), false);
            let result = self.eval_block(&for_in.body);
            self.pop_scope();
            result?;

            if self.finish_iteration() {
                break;
            }
        }
        Ok(Value::Null)
    }

    /// Consume a `break`/`continue` signal after one loop iteration
    ///
    /// Returns true when the loop must stop: on `break`, or on `return`,
    /// which is left in place for the enclosing function.
    fn finish_iteration(&mut self) -> bool {
        match self.control_flow {
            ControlFlow::Break => {
                self.control_flow = ControlFlow::None;
                true
            }
            ControlFlow::Continue => {
                self.control_flow = ControlFlow::None;
                false
            }
            ControlFlow::Return(_) => true,
            ControlFlow::None => false,
        }
    }

    fn step_target(
        &mut self,
        target: &AssignTarget,
        op: BinaryOp,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        self.write_target(target, |current| match current {
            Value::Number(_) => apply_binary(op, current, Value::Number(1.0), span),
            other => Err(RuntimeError::TypeError {
                msg: format!(
                    "{} requires a number, found {}",
                    if op == BinaryOp::Add { "++" } else { "--" },
                    other.type_name()
                ),
                span,
            }),
        })?;
        Ok(Value::Null)
    }

    /// Replace the value stored at `target` with `compute(current)`
    ///
    /// Index expressions are evaluated first, left to right; then the root
    /// variable is updated in place so nested collections are written
    /// without copying their shared parents.
    fn write_target<F>(&mut self, target: &AssignTarget, compute: F) -> Result<(), RuntimeError>
    where
        F: FnOnce(Value) -> Result<Value, RuntimeError>,
    {
        let (root, path) = match target {
            AssignTarget::Name(id) => (id, Vec::new()),
            AssignTarget::Index {
                target,
                index,
                span,
            } => {
                let (root, mut path) = self.resolve_place(target)?;
                path.push((self.eval_expr(index)?, *span));
                (root, path)
            }
        };

        self.update_variable(&root.name, root.span, |slot| {
            let Some(((last_idx, last_span), parents)) = path.split_last() else {
                *slot = compute(slot.clone())?;
                return Ok(());
            };

            let mut container = slot;
            for (idx, span) in parents {
                container = element_mut(container, idx, *span)?;
            }
            let current = get_element(container, last_idx, *last_span)?;
            let updated = compute(current)?;
            set_element(container, last_idx, updated, *last_span)
        })
    }

    /// Split an index chain into its root variable and evaluated indexes
    fn resolve_place<'a>(
        &mut self,
        expr: &'a Expr,
    ) -> Result<(&'a Identifier, Vec<(Value, Span)>), RuntimeError> {
        match expr {
            Expr::Identifier(id) => Ok((id, Vec::new())),
            Expr::Index(index) => {
                let (root, mut path) = self.resolve_place(&index.target)?;
                path.push((self.eval_expr(&index.index)?, index.span));
                Ok((root, path))
            }
            Expr::Group(group) => self.resolve_place(&group.expr),
            other => Err(RuntimeError::TypeError {
                msg: "Invalid assignment target".to_string(),
                span: other.span(),
            }),
        }
    }
}
