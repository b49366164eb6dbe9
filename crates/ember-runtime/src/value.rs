//! Runtime value representation
//!
//! - Numbers, Bools, Null: immediate values
//! - Strings: reference-counted (`Arc<String>`), immutable
//! - Arrays and maps: copy-on-write wrappers, value semantics
//! - Functions: user functions by name, stdlib builtins by name, host closures
//!
//! Every variant is `Send + Sync` so a whole interpreter can be moved behind a
//! process-wide lock.

use crate::ast::{Block, Identifier};
use crate::span::Span;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Copy-on-write array. Cheap to clone (refcount bump).
/// Mutations on a shared array clone the inner Vec first (`Arc::make_mut`).
#[derive(Clone, Debug, Default)]
pub struct ValueArray(Arc<Vec<Value>>);

impl ValueArray {
    pub fn new() -> Self {
        ValueArray(Arc::new(Vec::new()))
    }

    pub fn from_vec(v: Vec<Value>) -> Self {
        ValueArray(Arc::new(v))
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Mutable access to one element, unsharing the storage first
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        Arc::make_mut(&mut self.0).get_mut(index)
    }

    pub fn push(&mut self, value: Value) {
        Arc::make_mut(&mut self.0).push(value);
    }

    /// Replace the element at `index`; false if out of bounds
    pub fn set(&mut self, index: usize, value: Value) -> bool {
        if index >= self.0.len() {
            return false;
        }
        Arc::make_mut(&mut self.0)[index] = value;
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Value> {
        Arc::try_unwrap(self.0).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl PartialEq for ValueArray {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl From<Vec<Value>> for ValueArray {
    fn from(v: Vec<Value>) -> Self {
        ValueArray::from_vec(v)
    }
}

impl FromIterator<Value> for ValueArray {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        ValueArray::from_vec(iter.into_iter().collect())
    }
}

/// Copy-on-write string-keyed map, iterated in key order
#[derive(Clone, Debug, Default)]
pub struct ValueMap(Arc<BTreeMap<String, Value>>);

impl ValueMap {
    pub fn new() -> Self {
        ValueMap(Arc::new(BTreeMap::new()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        Arc::make_mut(&mut self.0).get_mut(key)
    }

    pub fn insert(&mut self, key: String, value: Value) {
        Arc::make_mut(&mut self.0).insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        Arc::make_mut(&mut self.0).remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> std::collections::btree_map::Keys<'_, String, Value> {
        self.0.keys()
    }
}

impl PartialEq for ValueMap {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        ValueMap(Arc::new(iter.into_iter().collect()))
    }
}

/// Native function type - Rust closure callable from Ember
///
/// Native functions receive the call arguments and return either a value or a
/// runtime error.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync>;

/// Runtime value type
#[derive(Clone)]
pub enum Value {
    /// Numeric value (IEEE 754 double-precision, always finite)
    Number(f64),
    /// String value (reference-counted, immutable)
    String(Arc<String>),
    Bool(bool),
    Null,
    /// Array value (copy-on-write, value semantics)
    Array(ValueArray),
    /// Map value (copy-on-write, value semantics)
    Map(ValueMap),
    /// User-defined function; every copy shares the declaration's body
    Function(Arc<UserFunction>),
    /// Builtin stdlib function
    Builtin(Arc<str>),
    /// Host closure
    NativeFunction(NativeFn),
}

/// A declared function: its name, parameters and body
#[derive(Debug)]
pub struct UserFunction {
    pub name: String,
    pub params: Vec<Identifier>,
    pub body: Block,
}

impl UserFunction {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Value {
    /// Create a new string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    /// Create a new array value
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(ValueArray::from_vec(values))
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Function(_) | Value::NativeFunction(_) => "function",
            Value::Builtin(_) => "builtin",
        }
    }

    /// Only `true` is truthy; there are no implicit conversions
    pub fn is_truthy(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::Builtin(_) | Value::NativeFunction(_)
        )
    }
}

impl PartialEq for Value {
    /// Data compares by content and builtins by name. Declared functions and
    /// host closures compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                // no trailing .0 for whole numbers
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s.as_ref()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Array(arr) => {
                let elements: Vec<String> = arr.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", elements.join(", "))
            }
            Value::Map(map) => {
                let entries: Vec<String> =
                    map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            Value::Function(func) => write!(f, "<fn {}>", func.name),
            Value::Builtin(name) => write!(f, "<builtin {}>", name),
            Value::NativeFunction(_) => write!(f, "<native fn>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Null => write!(f, "Null"),
            Value::Array(arr) => write!(f, "Array({:?})", arr.as_slice()),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Value::Function(func) => write!(f, "Function({}/{})", func.name, func.arity()),
            Value::Builtin(name) => write!(f, "Builtin({:?})", name),
            Value::NativeFunction(_) => write!(f, "NativeFunction(<closure>)"),
        }
    }
}

/// Runtime error type with source span information
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Type error: {msg}")]
    TypeError { msg: String, span: Span },

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },

    #[error("Cannot assign to immutable binding '{name}'")]
    ImmutableAssignment { name: String, span: Span },

    #[error("Division by zero")]
    DivideByZero { span: Span },

    #[error("Array index out of bounds")]
    OutOfBounds { span: Span },

    /// NaN or infinite arithmetic result
    #[error("Invalid numeric result")]
    InvalidNumericResult { span: Span },

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String, span: Span },

    #[error("Function '{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("{msg}")]
    InvalidStdlibArgument { msg: String, span: Span },

    /// Non-integer array index
    #[error("Invalid index: expected a whole number")]
    InvalidIndex { span: Span },

    #[error("'{keyword}' outside of {context}")]
    InvalidControlFlow {
        keyword: &'static str,
        context: &'static str,
        span: Span,
    },

    /// Call depth exceeded the configured limit
    #[error("Stack overflow: call depth exceeded {limit}")]
    StackOverflow { limit: usize, span: Span },

    #[error("I/O error: {message}")]
    IoError { message: String, span: Span },
}

impl RuntimeError {
    /// Get the source span for this error
    pub fn span(&self) -> Span {
        match self {
            RuntimeError::TypeError { span, .. }
            | RuntimeError::UndefinedVariable { span, .. }
            | RuntimeError::ImmutableAssignment { span, .. }
            | RuntimeError::DivideByZero { span }
            | RuntimeError::OutOfBounds { span }
            | RuntimeError::InvalidNumericResult { span }
            | RuntimeError::UnknownFunction { span, .. }
            | RuntimeError::ArityMismatch { span, .. }
            | RuntimeError::InvalidStdlibArgument { span, .. }
            | RuntimeError::InvalidIndex { span }
            | RuntimeError::InvalidControlFlow { span, .. }
            | RuntimeError::StackOverflow { span, .. }
            | RuntimeError::IoError { span, .. } => *span,
        }
    }
}
