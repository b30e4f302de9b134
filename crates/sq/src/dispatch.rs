//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Borrows the parsed arguments into a [`Dispatch`] value so `main` does not
//! need to destructure every subcommand itself.

use crate::cli::{Cli, Commands, ConfigCommands, Shell};
use crate::commands::{self, CommandContext, CommandError, Result};

/// A command that can run against a prepared context.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// A resolved CLI command.
pub enum Dispatch<'a> {
    Parse {
        query: Option<&'a str>,
        strict: bool,
        normalize: bool,
    },
    Tokens(Option<&'a str>),
    Check(Option<&'a str>),
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> Dispatch<'a> {
    /// Create a dispatch from the CLI command.
    pub fn from_cli(cli: &'a Cli) -> Self {
        match &cli.command {
            Some(Commands::Parse {
                query,
                strict,
                normalize,
            }) => Self::Parse {
                query: query.as_deref(),
                strict: *strict,
                normalize: *normalize,
            },
            Some(Commands::Tokens { query }) => Self::Tokens(query.as_deref()),
            Some(Commands::Check { query }) => Self::Check(query.as_deref()),
            Some(Commands::Config { command }) => Self::Config(command),
            Some(Commands::Completions { shell }) => Self::Completions(shell),
            None => Self::Help,
        }
    }
}

impl Command for Dispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Parse {
                query,
                strict,
                normalize,
            } => {
                let opts = commands::parse::ParseOptions {
                    query: query.map(str::to_string),
                    strict: *strict,
                    normalize: *normalize,
                };
                commands::parse::execute(ctx, &opts)
            }
            Self::Tokens(query) => commands::tokens::execute(ctx, *query),
            Self::Check(query) => commands::check::execute(ctx, *query),
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("sq - search filter expression compiler");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = commands::config::ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_dispatch_parse() {
        let cli = Cli::parse_from(["sq", "parse", "a:b", "--normalize"]);
        assert!(matches!(
            Dispatch::from_cli(&cli),
            Dispatch::Parse {
                query: Some("a:b"),
                strict: false,
                normalize: true
            }
        ));
    }

    #[test]
    fn test_dispatch_tokens_from_stdin() {
        let cli = Cli::parse_from(["sq", "tokens"]);
        assert!(matches!(Dispatch::from_cli(&cli), Dispatch::Tokens(None)));
    }

    #[test]
    fn test_dispatch_check() {
        let cli = Cli::parse_from(["sq", "check", "x"]);
        assert!(matches!(Dispatch::from_cli(&cli), Dispatch::Check(Some("x"))));
    }

    #[test]
    fn test_dispatch_config_show() {
        let cli = Cli::parse_from(["sq", "config", "show"]);
        assert!(matches!(
            Dispatch::from_cli(&cli),
            Dispatch::Config(Some(ConfigCommands::Show))
        ));
    }

    #[test]
    fn test_dispatch_completions() {
        let cli = Cli::parse_from(["sq", "completions", "zsh"]);
        assert!(matches!(Dispatch::from_cli(&cli), Dispatch::Completions(_)));
    }

    #[test]
    fn test_dispatch_help() {
        let cli = Cli::parse_from(["sq"]);
        assert!(matches!(Dispatch::from_cli(&cli), Dispatch::Help));
    }
}
