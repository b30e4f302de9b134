use clap::Parser;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::{load_config, Config};
use commands::{CommandContext, CommandError};
use dispatch::{Command, Dispatch};

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "SQ_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                eprintln!("{error_json:#}");
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

fn run(cli: &Cli) -> commands::Result<()> {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("{e}; using defaults");
            Config::default()
        }
    };
    let ctx = CommandContext::from_cli(cli, &config);

    Dispatch::from_cli(cli).execute(&ctx)
}

/// Installs the stderr logger.
///
/// `SQ_LOG` takes any `EnvFilter` directive; without it the level follows
/// `--verbose`/`--quiet`.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(cli)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn default_log_level(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Query(_) => "QUERY_ERROR",
        CommandError::Invalid { .. } => "INVALID_QUERY",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit status for an error.
fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Query(_) | CommandError::Invalid { .. } => 1,
        CommandError::Config(_) => 5,
        CommandError::Io(_) => 3,
        CommandError::Json(_) => 1,
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(exit_status(e))
}
