//! Wrapping Rust closures as script-callable functions

use crate::span::Span;
use crate::value::{NativeFn, RuntimeError, Value};
use std::sync::Arc;

/// A native function that checks it receives exactly `arity` arguments
pub fn fixed_arity<F>(name: &str, arity: usize, implementation: F) -> Value
where
    F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    let name = name.to_string();
    let native: NativeFn = Arc::new(move |args: &[Value]| {
        if args.len() != arity {
            return Err(RuntimeError::ArityMismatch {
                name: name.clone(),
                expected: arity,
                found: args.len(),
                span: Span::dummy(),
            });
        }
        implementation(args)
    });
    Value::NativeFunction(native)
}

/// A native function that accepts any number of arguments
pub fn variadic<F>(implementation: F) -> Value
where
    F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
{
    Value::NativeFunction(Arc::new(implementation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_arity_rejects_wrong_count() {
        let double = fixed_arity("double", 1, |args| match &args[0] {
            Value::Number(n) => Ok(Value::Number(n * 2.0)),
            _ => Ok(Value::Null),
        });

        let Value::NativeFunction(f) = double else {
            panic!("expected native function");
        };
        assert_eq!(f(&[Value::Number(2.0)]).unwrap(), Value::Number(4.0));
        assert!(matches!(
            f(&[]),
            Err(RuntimeError::ArityMismatch {
                expected: 1,
                found: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_variadic_accepts_any_count() {
        let count = variadic(|args| Ok(Value::Number(args.len() as f64)));
        let Value::NativeFunction(f) = count else {
            panic!("expected native function");
        };
        assert_eq!(f(&[]).unwrap(), Value::Number(0.0));
        assert_eq!(
            f(&[Value::Null, Value::Null, Value::Null]).unwrap(),
            Value::Number(3.0)
        );
    }
}
