use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ember_config::ConfigLoader;
use ember_gateway::Gateway;
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

/// Ember embedded interpreter.
///
/// Evaluates Ember code the way a host application does: values are passed
/// in by name, expressions are evaluated, and bindings persist for the
/// session.
///
/// EXAMPLES:
///     ember eval "1 + 2"                       Evaluate an expression
///     ember eval "x * 2" --set x=21            Bind a JSON value first
///     ember run setup.em --quiet               Run a file silently
///     ember repl                               Start interactive REPL
///
/// ENVIRONMENT VARIABLES:
///     EMBER_LOG             Log filter (falls back to RUST_LOG)
///     EMBER_VERBOSE         Set to '1' to log every gateway call
///     EMBER_MAX_CALL_DEPTH  Override the call depth limit
///     EMBER_NO_HISTORY      Set to '1' to disable REPL history
#[derive(Parser)]
#[command(name = "ember")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Use this configuration file instead of discovering ember.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log every gateway call
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression and print its value
    ///
    /// EXAMPLES:
    ///     ember eval "len(names)" --set 'names=["a","b"]'
    ///     ember eval "print(1);" --quiet
    #[command(visible_alias = "e")]
    Eval {
        /// Ember source to evaluate
        expression: String,
        /// Bind NAME to a JSON value before evaluating (repeatable)
        #[arg(long = "set", value_name = "NAME=JSON")]
        set: Vec<String>,
        /// Discard the result and any printed output
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Run an Ember source file
    ///
    /// EXAMPLES:
    ///     ember run main.em
    ///     ember run main.em --quiet
    #[command(visible_alias = "r")]
    Run {
        /// Path to the Ember source file
        file: String,
        /// Discard the result and any printed output
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Start an interactive REPL
    ///
    /// REPL COMMANDS:
    ///     :help, :h      Show help
    ///     :quit, :q      Exit REPL
    ///     :reset         Rebuild the interpreter
    ///     :load <file>   Load and run a file
    ///     :vars          List bindings
    Repl {
        /// Disable history persistence (for privacy)
        #[arg(long, env = "EMBER_NO_HISTORY")]
        no_history: bool,
    },
}

fn load_config(cli: &Cli) -> Result<ember_config::Config> {
    let mut loader = ConfigLoader::new();
    let mut config = match &cli.config {
        Some(path) => loader.load_from_file(path)?,
        None => loader.load_from_directory(&std::env::current_dir()?)?,
    };
    // CLI flags are the highest precedence layer
    if cli.verbose {
        config.set_verbose(true);
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let cli_config = config::Config::from_env();

    let config = load_config(&cli).context("Failed to load configuration")?;
    tracing::debug!(sources = ?config.sources, "configuration loaded");
    let mut gateway = Gateway::from_config(&config)?;

    match cli.command {
        Commands::Eval {
            expression,
            set,
            quiet,
        } => {
            let args = commands::eval::EvalArgs {
                expression,
                bindings: set,
                quiet,
            };
            commands::eval::run(&mut gateway, args)?;
        }
        Commands::Run { file, quiet } => {
            commands::run::run(&mut gateway, &file, quiet)?;
        }
        Commands::Repl { no_history } => {
            let disable_history = no_history || cli_config.no_history;
            commands::repl::run(&mut gateway, &config, disable_history, &cli_config)?;
        }
    }

    Ok(())
}
