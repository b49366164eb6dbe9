//! Expression evaluation

use crate::ast::*;
use crate::interpreter::{ControlFlow, Interpreter};
use crate::span::Span;
use crate::stack::ensure_sufficient_stack;
use crate::value::{RuntimeError, UserFunction, Value, ValueMap};
use std::sync::Arc;

impl Interpreter {
    /// Evaluate an expression
    pub(super) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        ensure_sufficient_stack(|| match expr {
            Expr::Literal(lit, _) => Ok(self.eval_literal(lit)),
            Expr::Identifier(id) => self.get_variable(&id.name, id.span),
            Expr::Binary(binary) => self.eval_binary(binary),
            Expr::Unary(unary) => self.eval_unary(unary),
            Expr::Call(call) => self.eval_call(call),
            Expr::Index(index) => self.eval_index(index),
            Expr::ArrayLiteral(arr) => self.eval_array_literal(arr),
            Expr::MapLiteral(map) => self.eval_map_literal(map),
            Expr::Group(group) => self.eval_expr(&group.expr),
        })
    }

    /// Evaluate a literal
    pub(super) fn eval_literal(&self, lit: &Literal) -> Value {
        match lit {
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::string(s.clone()),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null => Value::Null,
        }
    }

    /// Evaluate a binary expression
    fn eval_binary(&mut self, binary: &BinaryExpr) -> Result<Value, RuntimeError> {
        // && and || short-circuit and require bools on both sides
        if matches!(binary.op, BinaryOp::And | BinaryOp::Or) {
            let symbol = if binary.op == BinaryOp::And { "&&" } else { "||" };
            let left = self.expect_bool(&binary.left, symbol)?;
            if (binary.op == BinaryOp::And) != left {
                return Ok(Value::Bool(left));
            }
            return self.expect_bool(&binary.right, symbol).map(Value::Bool);
        }

        let left = self.eval_expr(&binary.left)?;
        let right = self.eval_expr(&binary.right)?;
        apply_binary(binary.op, left, right, binary.span)
    }

    fn expect_bool(&mut self, expr: &Expr, symbol: &str) -> Result<bool, RuntimeError> {
        match self.eval_expr(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::TypeError {
                msg: format!("Expected bool for {}, found {}", symbol, other.type_name()),
                span: expr.span(),
            }),
        }
    }

    /// Evaluate a unary expression
    fn eval_unary(&mut self, unary: &UnaryExpr) -> Result<Value, RuntimeError> {
        let operand = self.eval_expr(&unary.expr)?;

        match (unary.op, operand) {
            (UnaryOp::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
            (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (UnaryOp::Negate, other) => Err(RuntimeError::TypeError {
                msg: format!("Expected number for unary -, found {}", other.type_name()),
                span: unary.span,
            }),
            (UnaryOp::Not, other) => Err(RuntimeError::TypeError {
                msg: format!("Expected bool for !, found {}", other.type_name()),
                span: unary.span,
            }),
        }
    }

    /// Evaluate a function call
    pub(super) fn eval_call(&mut self, call: &CallExpr) -> Result<Value, RuntimeError> {
        let callee = self.eval_expr(&call.callee)?;

        let args = call
            .args
            .iter()
            .map(|arg| self.eval_expr(arg))
            .collect::<Result<Vec<_>, _>>()?;

        match callee {
            Value::Function(func) => self.call_user_function(&func, args, call.span),
            Value::Builtin(name) => crate::stdlib::call_builtin(&name, &args, call.span, &self.output),
            Value::NativeFunction(native) => native(&args),
            other => Err(RuntimeError::TypeError {
                msg: format!("Cannot call a value of type {}", other.type_name()),
                span: call.span,
            }),
        }
    }

    /// Call a user-defined function
    ///
    /// The callee runs in a fresh local environment: it sees globals, its
    /// own name and its parameters, never the caller's locals.
    pub(crate) fn call_user_function(
        &mut self,
        func: &Arc<UserFunction>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        if args.len() != func.arity() {
            return Err(RuntimeError::ArityMismatch {
                name: func.name.clone(),
                expected: func.arity(),
                found: args.len(),
                span,
            });
        }

        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::StackOverflow {
                limit: self.max_call_depth,
                span,
            });
        }

        let mut frame = std::collections::HashMap::new();
        // recursion reaches this body even when the declaring name is gone
        frame.insert(
            func.name.clone(),
            super::Binding {
                value: Value::Function(Arc::clone(func)),
                mutable: false,
            },
        );
        for (param, arg) in func.params.iter().zip(args) {
            frame.insert(
                param.name.clone(),
                super::Binding {
                    value: arg,
                    mutable: true,
                },
            );
        }

        let saved_locals = std::mem::replace(&mut self.locals, vec![frame]);
        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        self.call_depth += 1;

        let result = ensure_sufficient_stack(|| self.eval_function_body(&func.body));

        self.call_depth -= 1;
        self.loop_depth = saved_loop_depth;
        self.locals = saved_locals;
        result
    }

    fn eval_function_body(&mut self, body: &Block) -> Result<Value, RuntimeError> {
        for stmt in &body.statements {
            self.eval_statement(stmt)?;

            if let ControlFlow::Return(_) = self.control_flow {
                if let ControlFlow::Return(val) =
                    std::mem::replace(&mut self.control_flow, ControlFlow::None)
                {
                    return Ok(val);
                }
            }
        }

        // falling off the end returns null
        Ok(Value::Null)
    }

    /// Evaluate indexing into an array, string or map
    fn eval_index(&mut self, index: &IndexExpr) -> Result<Value, RuntimeError> {
        let target = self.eval_expr(&index.target)?;
        let idx = self.eval_expr(&index.index)?;
        get_element(&target, &idx, index.span)
    }

    fn eval_array_literal(&mut self, arr: &ArrayLiteral) -> Result<Value, RuntimeError> {
        let elements = arr
            .elements
            .iter()
            .map(|e| self.eval_expr(e))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::array(elements))
    }

    fn eval_map_literal(&mut self, map: &MapLiteral) -> Result<Value, RuntimeError> {
        let mut result = ValueMap::new();
        for (key, expr) in &map.entries {
            let value = self.eval_expr(expr)?;
            result.insert(key.clone(), value);
        }
        Ok(Value::Map(result))
    }
}

/// Apply a non-short-circuit binary operator
pub(super) fn apply_binary(
    op: BinaryOp,
    left: Value,
    right: Value,
    span: Span,
) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => finite(a + b, span),
            (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{}{}", a, b))),
            _ => Err(operand_error("+", &left, &right, span)),
        },
        BinaryOp::Sub => numeric(op, left, right, span, |a, b| a - b),
        BinaryOp::Mul => numeric(op, left, right, span, |a, b| a * b),
        BinaryOp::Div | BinaryOp::Mod => {
            if let Value::Number(b) = right {
                if b == 0.0 {
                    return Err(RuntimeError::DivideByZero { span });
                }
            }
            if op == BinaryOp::Div {
                numeric(op, left, right, span, |a, b| a / b)
            } else {
                numeric(op, left, right, span, |a, b| a % b)
            }
        }
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::Ne => Ok(Value::Bool(left != right)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => None,
            };
            let ordering =
                ordering.ok_or_else(|| operand_error(symbol(op), &left, &right, span))?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
        BinaryOp::And | BinaryOp::Or => Err(RuntimeError::TypeError {
            msg: format!("{} must be evaluated with short-circuiting", symbol(op)),
            span,
        }),
    }
}

fn numeric(
    op: BinaryOp,
    left: Value,
    right: Value,
    span: Span,
    f: impl FnOnce(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Number(a), Value::Number(b)) => finite(f(*a, *b), span),
        _ => Err(operand_error(symbol(op), &left, &right, span)),
    }
}

/// Reject NaN and infinite results
fn finite(result: f64, span: Span) -> Result<Value, RuntimeError> {
    if result.is_finite() {
        Ok(Value::Number(result))
    } else {
        Err(RuntimeError::InvalidNumericResult { span })
    }
}

fn operand_error(symbol: &str, left: &Value, right: &Value, span: Span) -> RuntimeError {
    RuntimeError::TypeError {
        msg: format!(
            "Invalid operands for {}: {} and {}",
            symbol,
            left.type_name(),
            right.type_name()
        ),
        span,
    }
}

fn symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

/// Convert a number to an index, rejecting fractions and negatives
fn to_index(idx: &Value, span: Span) -> Result<usize, RuntimeError> {
    match idx {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => Ok(*n as usize),
        _ => Err(RuntimeError::InvalidIndex { span }),
    }
}

/// Read `target[idx]`; a missing map key reads as null
pub(super) fn get_element(target: &Value, idx: &Value, span: Span) -> Result<Value, RuntimeError> {
    match target {
        Value::Array(arr) => {
            let i = to_index(idx, span)?;
            arr.get(i).cloned().ok_or(RuntimeError::OutOfBounds { span })
        }
        Value::String(s) => {
            let i = to_index(idx, span)?;
            s.chars()
                .nth(i)
                .map(|c| Value::string(c.to_string()))
                .ok_or(RuntimeError::OutOfBounds { span })
        }
        Value::Map(map) => match idx {
            Value::String(key) => Ok(map.get(key).cloned().unwrap_or(Value::Null)),
            other => Err(RuntimeError::TypeError {
                msg: format!("Map keys are strings, found {}", other.type_name()),
                span,
            }),
        },
        other => Err(RuntimeError::TypeError {
            msg: format!("Cannot index a value of type {}", other.type_name()),
            span,
        }),
    }
}

/// Apply `target[idx] = value` in place; maps accept new keys
pub(super) fn set_element(
    target: &mut Value,
    idx: &Value,
    value: Value,
    span: Span,
) -> Result<(), RuntimeError> {
    match target {
        Value::Array(arr) => {
            let i = to_index(idx, span)?;
            if arr.set(i, value) {
                Ok(())
            } else {
                Err(RuntimeError::OutOfBounds { span })
            }
        }
        Value::Map(map) => match idx {
            Value::String(key) => {
                map.insert(key.as_ref().clone(), value);
                Ok(())
            }
            other => Err(RuntimeError::TypeError {
                msg: format!("Map keys are strings, found {}", other.type_name()),
                span,
            }),
        },
        other => Err(RuntimeError::TypeError {
            msg: format!("Cannot assign into a value of type {}", other.type_name()),
            span,
        }),
    }
}

/// Borrow `target[idx]` mutably, for writes through nested indexes
pub(super) fn element_mut<'a>(
    target: &'a mut Value,
    idx: &Value,
    span: Span,
) -> Result<&'a mut Value, RuntimeError> {
    match target {
        Value::Array(arr) => {
            let i = to_index(idx, span)?;
            arr.get_mut(i).ok_or(RuntimeError::OutOfBounds { span })
        }
        Value::Map(map) => match idx {
            Value::String(key) => map.get_mut(key).ok_or_else(|| RuntimeError::TypeError {
                msg: format!("Map has no key '{}'", key),
                span,
            }),
            other => Err(RuntimeError::TypeError {
                msg: format!("Map keys are strings, found {}", other.type_name()),
                span,
            }),
        },
        other => Err(RuntimeError::TypeError {
            msg: format!("Cannot index a value of type {}", other.type_name()),
            span,
        }),
    }
}
