pub mod eval;
pub mod repl;
pub mod run;

use ember_gateway::GatewayError;
use ember_runtime::{Diagnostic, EvalError, Span};

/// Render a gateway error against the source that produced it
///
/// Parse errors list every diagnostic with its snippet; runtime errors carry
/// the location of the failing expression when it has one.
pub fn format_error(err: &GatewayError, source: &str, origin: &str) -> String {
    match err {
        GatewayError::Eval(EvalError::Parse(diagnostics)) => diagnostics
            .iter()
            .map(|diag| format_diagnostic(diag, origin))
            .collect::<Vec<_>>()
            .join("\n"),
        GatewayError::Eval(EvalError::Runtime(runtime)) if runtime.span() != Span::dummy() => {
            let located = Diagnostic::error(runtime.to_string(), runtime.span()).locate(source);
            format!(
                "runtime error: {}\n  --> {}:{}:{}\n   | {}\n",
                runtime, origin, located.line, located.column, located.snippet
            )
        }
        other => format!("error: {}\n", other),
    }
}

fn format_diagnostic(diag: &Diagnostic, origin: &str) -> String {
    // Format: level[code]: message, then the location and snippet
    let human = diag.to_human_string();
    human.replacen("  --> ", &format!("  --> {}:", origin), 1)
}
