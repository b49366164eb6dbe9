//! Gateway error types

use ember_config::ConfigError;
use ember_runtime::EvalError;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Parse diagnostics or a runtime error from the interpreter
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("'{0}' is not a valid binding name")]
    InvalidName(String),

    /// A configured prelude could not be read or evaluated
    #[error("prelude {} failed: {source}", .path.display())]
    Prelude {
        path: PathBuf,
        #[source]
        source: PreludeError,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("the interpreter instance is already initialized")]
    AlreadyInitialized,

    #[error("the interpreter instance has been shut down")]
    ShutDown,

    /// The instance was used from inside one of its own native callbacks
    #[error("re-entrant use of the interpreter instance")]
    Reentrant,
}

#[derive(Debug, Error)]
pub enum PreludeError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Eval(#[from] EvalError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_runtime::{RuntimeError, Span};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_eval_error_is_transparent() {
        let err = GatewayError::from(EvalError::Runtime(RuntimeError::DivideByZero {
            span: Span::dummy(),
        }));
        assert_eq!(
            err.to_string(),
            EvalError::Runtime(RuntimeError::DivideByZero { span: Span::dummy() }).to_string()
        );
    }

    #[test]
    fn test_prelude_error_names_file() {
        let err = GatewayError::Prelude {
            path: PathBuf::from("setup.em"),
            source: PreludeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "missing",
            )),
        };
        assert_eq!(err.to_string(), "prelude setup.em failed: missing");
    }
}
