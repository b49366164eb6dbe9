//! Type conversion between Rust and Ember values
//!
//! - `ToEmber` converts Rust types to an Ember `Value`
//! - `FromEmber` converts an Ember `Value` back to a Rust type
//!
//! `serde_json::Value` converts in both directions, with JSON objects
//! becoming Ember maps.
//!
//! # Examples
//!
//! ```
//! use ember_runtime::api::{FromEmber, ToEmber};
//! use ember_runtime::Value;
//!
//! let number: Value = 42.0.to_ember();
//! let text: Value = "hello".to_ember();
//!
//! let back: f64 = FromEmber::from_ember(&number).unwrap();
//! let s: String = FromEmber::from_ember(&text).unwrap();
//! assert_eq!(back, 42.0);
//! assert_eq!(s, "hello");
//! ```

use crate::value::{Value, ValueMap};
use std::collections::HashMap;
use thiserror::Error;

/// Error type for value conversion failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Array element type mismatch at index {index}: expected {expected}, found {found}")]
    ArrayElementTypeMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Map value type mismatch for key '{key}': expected {expected}, found {found}")]
    MapValueTypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Number is fractional or outside the target integer's range
    #[error("{value} does not fit in {target}")]
    IntegerOutOfRange { value: f64, target: &'static str },
}

/// Trait for converting an Ember `Value` to Rust types
pub trait FromEmber: Sized {
    /// # Errors
    ///
    /// Returns `ConversionError` if the value cannot be converted to the target type.
    fn from_ember(value: &Value) -> Result<Self, ConversionError>;
}

/// Trait for converting Rust types to an Ember `Value`
pub trait ToEmber {
    fn to_ember(self) -> Value;
}

fn mismatch(expected: &'static str, value: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        found: value.type_name(),
    }
}

impl FromEmber for Value {
    fn from_ember(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl ToEmber for Value {
    fn to_ember(self) -> Value {
        self
    }
}

impl FromEmber for f64 {
    fn from_ember(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Number(n) => Ok(*n),
            _ => Err(mismatch("number", value)),
        }
    }
}

impl ToEmber for f64 {
    fn to_ember(self) -> Value {
        Value::Number(self)
    }
}

macro_rules! integer_conversions {
    ($($ty:ty),*) => {
        $(
            impl FromEmber for $ty {
                fn from_ember(value: &Value) -> Result<Self, ConversionError> {
                    let n = f64::from_ember(value)?;
                    if n.fract() != 0.0 || n < <$ty>::MIN as f64 || n > <$ty>::MAX as f64 {
                        return Err(ConversionError::IntegerOutOfRange {
                            value: n,
                            target: stringify!($ty),
                        });
                    }
                    Ok(n as $ty)
                }
            }

            impl ToEmber for $ty {
                fn to_ember(self) -> Value {
                    Value::Number(self as f64)
                }
            }
        )*
    };
}

integer_conversions!(i32, i64, u32, usize);

impl FromEmber for String {
    fn from_ember(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s.as_ref().clone()),
            _ => Err(mismatch("string", value)),
        }
    }
}

impl ToEmber for String {
    fn to_ember(self) -> Value {
        Value::string(self)
    }
}

impl ToEmber for &str {
    fn to_ember(self) -> Value {
        Value::string(self)
    }
}

impl ToEmber for &String {
    fn to_ember(self) -> Value {
        Value::string(self.clone())
    }
}

impl FromEmber for bool {
    fn from_ember(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(mismatch("bool", value)),
        }
    }
}

impl ToEmber for bool {
    fn to_ember(self) -> Value {
        Value::Bool(self)
    }
}

impl FromEmber for () {
    fn from_ember(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(()),
            _ => Err(mismatch("null", value)),
        }
    }
}

impl ToEmber for () {
    fn to_ember(self) -> Value {
        Value::Null
    }
}

impl<T: FromEmber> FromEmber for Option<T> {
    fn from_ember(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_ember(value)?)),
        }
    }
}

impl<T: ToEmber> ToEmber for Option<T> {
    fn to_ember(self) -> Value {
        match self {
            None => Value::Null,
            Some(v) => v.to_ember(),
        }
    }
}

impl<T: FromEmber> FromEmber for Vec<T> {
    fn from_ember(value: &Value) -> Result<Self, ConversionError> {
        let Value::Array(arr) = value else {
            return Err(mismatch("array", value));
        };

        arr.iter()
            .enumerate()
            .map(|(index, elem)| {
                T::from_ember(elem).map_err(|e| match e {
                    ConversionError::TypeMismatch { expected, found } => {
                        ConversionError::ArrayElementTypeMismatch {
                            index,
                            expected,
                            found,
                        }
                    }
                    other => other,
                })
            })
            .collect()
    }
}

impl<T: ToEmber> ToEmber for Vec<T> {
    fn to_ember(self) -> Value {
        Value::array(self.into_iter().map(ToEmber::to_ember).collect())
    }
}

impl<T: FromEmber> FromEmber for HashMap<String, T> {
    fn from_ember(value: &Value) -> Result<Self, ConversionError> {
        let Value::Map(map) = value else {
            return Err(mismatch("map", value));
        };

        map.iter()
            .map(|(key, elem)| {
                let converted = T::from_ember(elem).map_err(|e| match e {
                    ConversionError::TypeMismatch { expected, found } => {
                        ConversionError::MapValueTypeMismatch {
                            key: key.clone(),
                            expected,
                            found,
                        }
                    }
                    other => other,
                })?;
                Ok((key.clone(), converted))
            })
            .collect()
    }
}

impl<T: ToEmber> ToEmber for HashMap<String, T> {
    fn to_ember(self) -> Value {
        Value::Map(
            self.into_iter()
                .map(|(key, value)| (key, value.to_ember()))
                .collect::<ValueMap>(),
        )
    }
}

impl ToEmber for serde_json::Value {
    fn to_ember(self) -> Value {
        use serde_json::Value as Json;

        match self {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            // serde_json only holds finite numbers
            Json::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            Json::String(s) => Value::string(s),
            Json::Array(items) => Value::array(items.into_iter().map(ToEmber::to_ember).collect()),
            Json::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.to_ember()))
                    .collect(),
            ),
        }
    }
}

impl FromEmber for serde_json::Value {
    /// Functions have no JSON form and are rejected
    fn from_ember(value: &Value) -> Result<Self, ConversionError> {
        use serde_json::Value as Json;

        match value {
            Value::Null => Ok(Json::Null),
            Value::Bool(b) => Ok(Json::Bool(*b)),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .ok_or_else(|| mismatch("finite number", value)),
            Value::String(s) => Ok(Json::String(s.as_ref().clone())),
            Value::Array(arr) => arr
                .iter()
                .map(serde_json::Value::from_ember)
                .collect::<Result<Vec<_>, _>>()
                .map(Json::Array),
            Value::Map(map) => map
                .iter()
                .map(|(key, elem)| Ok((key.clone(), serde_json::Value::from_ember(elem)?)))
                .collect::<Result<serde_json::Map<_, _>, _>>()
                .map(Json::Object),
            Value::Function(_) | Value::Builtin(_) | Value::NativeFunction(_) => {
                Err(mismatch("JSON-compatible value", value))
            }
        }
    }
}
