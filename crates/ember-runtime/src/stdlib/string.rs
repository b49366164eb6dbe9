//! String manipulation functions

use crate::span::Span;
use crate::value::{RuntimeError, Value};

/// Split a string by separator
///
/// An empty separator splits into individual characters.
pub fn split(s: &str, separator: &str) -> Value {
    if separator.is_empty() {
        Value::array(s.chars().map(|c| Value::string(c.to_string())).collect())
    } else {
        Value::array(
            s.split(separator)
                .map(|part| Value::string(part.to_string()))
                .collect(),
        )
    }
}

/// Join an array of strings with separator
pub fn join(parts: &[Value], separator: &str, span: Span) -> Result<String, RuntimeError> {
    let mut strings = Vec::with_capacity(parts.len());

    for part in parts {
        match part {
            Value::String(s) => strings.push(s.as_str()),
            other => {
                return Err(RuntimeError::TypeError {
                    msg: format!("join() requires an array of strings, found {}", other.type_name()),
                    span,
                })
            }
        }
    }

    Ok(strings.join(separator))
}

/// Convert a string (or number) to a number
pub fn to_number(value: &Value, span: Span) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(RuntimeError::InvalidStdlibArgument {
                msg: format!("toNumber() cannot parse '{}'", s),
                span,
            }),
        },
        other => Err(RuntimeError::InvalidStdlibArgument {
            msg: format!("toNumber() expected string, found {}", other.type_name()),
            span,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_and_join() {
        let parts = split("a,b,c", ",");
        assert_eq!(parts.to_string(), "[a, b, c]");

        if let Value::Array(arr) = parts {
            assert_eq!(join(arr.as_slice(), "-", Span::dummy()).unwrap(), "a-b-c");
        }
    }

    #[test]
    fn test_split_empty_separator() {
        assert_eq!(split("ab", "").to_string(), "[a, b]");
    }

    #[test]
    fn test_join_rejects_non_strings() {
        assert!(join(&[Value::Number(1.0)], ",", Span::dummy()).is_err());
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&Value::string(" 2.5 "), Span::dummy()).unwrap(), 2.5);
        assert!(to_number(&Value::string("abc"), Span::dummy()).is_err());
        assert!(to_number(&Value::string("inf"), Span::dummy()).is_err());
    }
}
