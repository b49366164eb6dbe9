//! Array and map functions
//!
//! Collections have value semantics: functions return new collections and
//! never modify their arguments.

use crate::value::{Value, ValueArray, ValueMap};

/// Append `value`, returning the extended array
pub fn push(arr: &ValueArray, value: Value) -> Value {
    let mut extended = arr.clone();
    extended.push(value);
    Value::Array(extended)
}

/// Keys of a map, in sorted order
pub fn keys(map: &ValueMap) -> Value {
    Value::array(map.keys().map(|k| Value::string(k.clone())).collect())
}
