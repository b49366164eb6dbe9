//! Run command - execute Ember source files

use anyhow::{anyhow, Context, Result};
use ember_gateway::Gateway;
use ember_runtime::Value;
use std::fs;

/// Run an Ember source file
///
/// Prints the value of the final expression unless it is null or `quiet`
/// is set. With `quiet`, output from `print` is suppressed as well.
pub fn run(gateway: &mut Gateway, file_path: &str, quiet: bool) -> Result<()> {
    let source = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read source file: {}", file_path))?;

    let result = if quiet {
        gateway.evaluate_quietly(&source).map(|()| Value::Null)
    } else {
        gateway.evaluate(&source)
    };

    match result {
        Ok(value) => {
            if !matches!(value, Value::Null) {
                println!("{}", value);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Errors occurred while running {}:", file_path);
            eprint!("{}", super::format_error(&e, &source, file_path));
            Err(anyhow!("Failed to execute program"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_runtime::sink_writer;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn gateway() -> Gateway {
        let mut gateway = Gateway::new();
        gateway.set_output(sink_writer());
        gateway
    }

    #[test]
    fn test_run_simple_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "var total = 1 + 2;").unwrap();

        let mut gateway = gateway();
        run(&mut gateway, temp_file.path().to_str().unwrap(), false).unwrap();
        assert_eq!(gateway.get("total"), Some(Value::Number(3.0)));
    }

    #[test]
    fn test_run_missing_file() {
        assert!(run(&mut gateway(), "nonexistent.em", false).is_err());
    }

    #[test]
    fn test_run_failing_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "let x = 1;\nx = 2;").unwrap();

        assert!(run(&mut gateway(), temp_file.path().to_str().unwrap(), true).is_err());
    }
}
