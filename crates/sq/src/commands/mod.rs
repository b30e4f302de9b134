//! Command implementations for the sq CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod check;
pub mod completions;
pub mod config;
pub mod parse;
pub mod tokens;

use std::io::{self, IsTerminal, Read};

use crate::cli::Cli;
use config::{Config, OutputFormat};

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Strict compilation rejected the query.
    #[error("query error: {0}")]
    Query(#[from] searchq::QueryError),

    /// `check` found problems in the query.
    #[error("query has {problems} problem(s)")]
    Invalid {
        /// Number of diagnostics reported.
        problems: usize,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether `parse` rejects queries that needed recovery.
    pub strict: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the loaded config.
    ///
    /// Flags win over config values. `NO_COLOR` disables colors regardless.
    pub fn from_cli(cli: &Cli, config: &Config) -> Self {
        let color_allowed = std::env::var_os("NO_COLOR").is_none();
        Self {
            json_output: cli.json || config.output.format == Some(OutputFormat::Json),
            use_colors: !cli.no_color && color_allowed && config.output.color.unwrap_or(true),
            quiet: cli.quiet,
            strict: config.parse.strict.unwrap_or(false),
        }
    }
}

/// Returns the query argument, or all of stdin when it was omitted.
pub fn read_query(query: Option<&str>) -> Result<String> {
    if let Some(query) = query {
        return Ok(query.to_string());
    }

    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        tracing::debug!("reading query from terminal; end input with Ctrl-D");
    }
    let mut buffer = String::new();
    stdin.read_to_string(&mut buffer)?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
}
