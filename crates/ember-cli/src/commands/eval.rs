//! Eval command - assign host values, then evaluate one expression

use anyhow::{anyhow, Context, Result};
use ember_gateway::Gateway;
use ember_runtime::Value;

/// Where eval errors point
const ORIGIN: &str = "<eval>";

/// Arguments for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalArgs {
    pub expression: String,
    /// `name=json` bindings applied before evaluation, in order
    pub bindings: Vec<String>,
    pub quiet: bool,
}

/// Split `name=json` into a binding name and its parsed value
pub fn parse_binding(entry: &str) -> Result<(String, serde_json::Value)> {
    let (name, json) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=JSON, got '{}'", entry))?;
    let value = serde_json::from_str(json)
        .with_context(|| format!("invalid JSON for '{}': {}", name, json))?;
    Ok((name.to_string(), value))
}

pub fn run(gateway: &mut Gateway, args: EvalArgs) -> Result<()> {
    for entry in &args.bindings {
        let (name, value) = parse_binding(entry)?;
        gateway.assign(value, &name)?;
    }

    if args.quiet {
        return gateway.evaluate_quietly(&args.expression).map_err(|e| {
            eprint!("{}", super::format_error(&e, &args.expression, ORIGIN));
            anyhow!("evaluation failed")
        });
    }

    match gateway.evaluate(&args.expression) {
        Ok(value) => {
            if !matches!(value, Value::Null) {
                println!("{}", value);
            }
            Ok(())
        }
        Err(e) => {
            eprint!("{}", super::format_error(&e, &args.expression, ORIGIN));
            Err(anyhow!("evaluation failed"))
        }
    }
}
