//! Diagnostic system for errors and warnings
//!
//! Lexer and parser problems are collected as `Diagnostic`s rather than
//! returned one at a time, so a single evaluation can report every syntax
//! error it found.

use crate::span::Span;
use std::fmt;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
        }
    }
}

/// Well-known diagnostic codes
pub mod codes {
    /// Syntax error
    pub const SYNTAX: &str = "EM1000";
    /// Unexpected character
    pub const UNEXPECTED_CHAR: &str = "EM1001";
    /// Unterminated string literal
    pub const UNTERMINATED_STRING: &str = "EM1002";
    /// Invalid escape sequence
    pub const INVALID_ESCAPE: &str = "EM1003";
    /// Unterminated block comment
    pub const UNTERMINATED_COMMENT: &str = "EM1004";
}

/// A diagnostic message (error or warning)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// Error code (e.g., "EM1000")
    pub code: String,
    pub message: String,
    pub span: Span,
    /// Line number (1-based), filled in by [`Diagnostic::locate`]
    pub line: usize,
    /// Column number (1-based), filled in by [`Diagnostic::locate`]
    pub column: usize,
    /// Source line containing the span
    pub snippet: String,
    /// Short label for the caret range
    pub label: String,
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic with code
    pub fn error_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            code: code.into(),
            message: message.into(),
            span,
            line: 1,
            column: span.start + 1,
            snippet: String::new(),
            label: String::new(),
            help: None,
        }
    }

    /// Create a new error diagnostic with the generic syntax code
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self::error_with_code(codes::SYNTAX, message, span)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Resolve line, column and snippet from the span against `source`
    pub fn locate(mut self, source: &str) -> Self {
        let mut line = 1;
        let mut line_start = 0;
        for (offset, c) in source.chars().enumerate() {
            if offset >= self.span.start {
                break;
            }
            if c == '\n' {
                line += 1;
                line_start = offset + 1;
            }
        }
        self.line = line;
        self.column = self.span.start.saturating_sub(line_start) + 1;
        self.snippet = source.lines().nth(line - 1).unwrap_or("").to_string();
        self
    }

    /// Format as a multi-line human-readable report
    pub fn to_human_string(&self) -> String {
        let mut output = format!(
            "{}[{}]: {}\n  --> {}:{}\n",
            self.level, self.code, self.message, self.line, self.column
        );

        if !self.snippet.is_empty() {
            let width = self.span.len().max(1);
            output.push_str(&format!("   | {}\n", self.snippet));
            output.push_str(&format!(
                "   | {}{} {}\n",
                " ".repeat(self.column.saturating_sub(1)),
                "^".repeat(width),
                self.label
            ));
        }

        if let Some(help) = &self.help {
            output.push_str(&format!("   = help: {}\n", help));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] at {}:{}: {}",
            self.level, self.code, self.line, self.column, self.message
        )
    }
}
