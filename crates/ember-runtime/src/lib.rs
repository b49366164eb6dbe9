//! Ember Runtime - embeddable expression language
//!
//! This library provides the complete Ember language runtime:
//! - Lexical analysis and Pratt parsing into an AST
//! - Tree-walking interpretation with a persistent global environment
//! - Standard library functions
//! - An embedding API (`api::Runtime`) with Rust value conversions

/// Ember runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod api;
pub mod ast;
pub mod diagnostic;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod stack;
pub mod stdlib;
pub mod token;
pub mod value;

pub use api::{ConversionError, EvalError, FromEmber, Runtime, RuntimeConfig, ToEmber};
pub use diagnostic::{codes, Diagnostic, DiagnosticLevel};
pub use interpreter::{Interpreter, DEFAULT_MAX_CALL_DEPTH};
pub use lexer::Lexer;
pub use parser::Parser;
pub use span::Span;
pub use stdlib::{sink_writer, stdout_writer, OutputWriter};
pub use token::{is_valid_identifier, Token, TokenKind};
pub use value::{RuntimeError, UserFunction, Value, ValueArray, ValueMap};
