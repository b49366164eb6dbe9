//! REPL command implementation

use anyhow::Result;
use ember_config::Config as EmberConfig;
use ember_gateway::Gateway;
use ember_runtime::Value;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// What a line of REPL input asks for
#[derive(Debug, Clone, PartialEq)]
enum Input<'a> {
    Quit,
    Help,
    Reset,
    Vars,
    Load(&'a str),
    Empty,
    Source(&'a str),
    Unknown(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => Input::Empty,
        ":quit" | ":q" => Input::Quit,
        ":help" | ":h" => Input::Help,
        ":reset" => Input::Reset,
        ":vars" | ":v" => Input::Vars,
        _ => {
            if let Some(path) = trimmed.strip_prefix(":load") {
                Input::Load(path.trim())
            } else if trimmed.starts_with(':') {
                Input::Unknown(trimmed)
            } else {
                Input::Source(line)
            }
        }
    }
}

/// Run the interactive REPL
///
/// `:reset` rebuilds the interpreter from `config`, preludes included.
/// If `no_history` is true, disables history persistence.
pub fn run(
    gateway: &mut Gateway,
    config: &EmberConfig,
    no_history: bool,
    cli_config: &crate::config::Config,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let history_path = cli_config.history_path();
    if !no_history {
        if let Some(ref path) = history_path {
            let _ = rl.load_history(path); // Ignore errors if file doesn't exist
        }
    }

    println!("Ember v{} REPL", ember_runtime::VERSION);
    println!("Type expressions or statements, or :quit to exit");
    println!("Commands: :quit (or :q), :reset, :help, :vars, :load <file>");
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => match classify(&line) {
                Input::Quit => {
                    println!("Goodbye!");
                    break;
                }
                Input::Help => print_help(),
                Input::Reset => match Gateway::from_config(config) {
                    Ok(fresh) => {
                        *gateway = fresh;
                        println!("REPL state reset");
                    }
                    Err(e) => eprintln!("error: {}", e),
                },
                Input::Vars => print_vars(gateway),
                Input::Load(path) => {
                    if path.is_empty() {
                        println!("Usage: :load <file>");
                    } else if let Err(e) = super::run::run(gateway, path, false) {
                        eprintln!("{}", e);
                    }
                }
                Input::Empty => {}
                Input::Unknown(command) => {
                    println!("Unknown command {}; try :help", command);
                }
                Input::Source(source) => {
                    let _ = rl.add_history_entry(source);
                    match gateway.evaluate(source) {
                        Ok(Value::Null) => {}
                        Ok(value) => println!("{}", value),
                        Err(e) => eprint!("{}", super::format_error(&e, source, "<repl>")),
                    }
                }
            },
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                println!("^C");
                println!("Use :quit or :q to exit");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    if !no_history {
        if let Some(path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.save_history(&path); // Ignore errors
        }
    }

    Ok(())
}

fn print_help() {
    println!("Ember REPL Commands:");
    println!("  :quit, :q         Exit the REPL");
    println!("  :reset            Rebuild the interpreter, rerunning preludes");
    println!("  :help, :h         Show this help message");
    println!("  :vars, :v         List bindings and their values");
    println!("  :load <file>      Run a file in the current session");
    println!();
    println!("Type any Ember expression or statement to evaluate it.");
    println!("Examples:");
    println!("  >> 1 + 2");
    println!("  >> var x = 42;");
    println!("  >> fn double(n) {{ return n * 2; }}");
    println!("  >> double(x)");
}

fn print_vars(gateway: &Gateway) {
    let names = gateway.bindings();
    if names.is_empty() {
        println!("No variables defined.");
        return;
    }

    println!("{:<16} {:<10} {}", "name", "type", "value");
    println!("{}", "-".repeat(40));
    for name in names {
        if let Some(value) = gateway.get(&name) {
            println!("{:<16} {:<10} {}", name, value.type_name(), value);
        }
    }
}
