//! Math functions
//!
//! Results are always finite; operations that would produce NaN or infinity
//! report `InvalidNumericResult` instead.

use crate::span::Span;
use crate::value::RuntimeError;

/// Single-argument functions: `abs`, `floor`, `ceil`, `round`, `sqrt`
pub fn unary(name: &str, n: f64, span: Span) -> Result<f64, RuntimeError> {
    let result = match name {
        "abs" => n.abs(),
        "floor" => n.floor(),
        "ceil" => n.ceil(),
        "round" => n.round(),
        "sqrt" => {
            if n < 0.0 {
                return Err(RuntimeError::InvalidStdlibArgument {
                    msg: "sqrt() of a negative number".to_string(),
                    span,
                });
            }
            n.sqrt()
        }
        _ => {
            return Err(RuntimeError::UnknownFunction {
                name: name.to_string(),
                span,
            })
        }
    };
    finite(result, span)
}

pub fn pow(base: f64, exponent: f64, span: Span) -> Result<f64, RuntimeError> {
    finite(base.powf(exponent), span)
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn finite(result: f64, span: Span) -> Result<f64, RuntimeError> {
    if result.is_finite() {
        Ok(result)
    } else {
        Err(RuntimeError::InvalidNumericResult { span })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abs", -2.5, 2.5)]
    #[case("floor", 2.7, 2.0)]
    #[case("ceil", 2.1, 3.0)]
    #[case("round", 2.5, 3.0)]
    #[case("sqrt", 9.0, 3.0)]
    fn test_unary(#[case] name: &str, #[case] input: f64, #[case] expected: f64) {
        assert_eq!(unary(name, input, Span::dummy()).unwrap(), expected);
    }

    #[test]
    fn test_sqrt_negative_rejected() {
        assert!(unary("sqrt", -1.0, Span::dummy()).is_err());
    }

    #[test]
    fn test_pow_overflow_rejected() {
        assert!(matches!(
            pow(10.0, 400.0, Span::dummy()),
            Err(RuntimeError::InvalidNumericResult { .. })
        ));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min(&[3.0, -1.0, 2.0]), -1.0);
        assert_eq!(max(&[3.0, -1.0, 2.0]), 3.0);
    }
}
