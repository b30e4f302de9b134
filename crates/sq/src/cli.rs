//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the sq CLI.

use clap::{Parser, Subcommand, ValueEnum};

/// sq - Compile search-style filter expressions into typed clauses
#[derive(Parser, Debug)]
#[command(name = "sq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a query into filter clauses
    #[command(alias = "p")]
    Parse {
        /// Filter expression (read from stdin when omitted)
        query: Option<String>,

        /// Fail if any part of the query had to be skipped
        #[arg(long)]
        strict: bool,

        /// Print the clauses back as a normalized query string
        #[arg(long, conflicts_with = "strict")]
        normalize: bool,
    },

    /// Show the token stream for a query
    #[command(alias = "t")]
    Tokens {
        /// Filter expression (read from stdin when omitted)
        query: Option<String>,
    },

    /// Report skipped characters and statements in a query
    #[command(alias = "c")]
    Check {
        /// Filter expression (read from stdin when omitted)
        query: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["sq", "--verbose", "parse", "x"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert!(!cli.json);

        let cli = Cli::parse_from(["sq", "--quiet", "--json", "parse", "x"]);
        assert!(!cli.verbose);
        assert!(cli.quiet);
        assert!(cli.json);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["sq", "-v", "-q", "parse", "x"]).is_err());
    }

    #[test]
    fn test_no_color_flag() {
        let cli = Cli::parse_from(["sq", "--no-color", "parse", "x"]);
        assert!(cli.no_color);
    }

    #[test]
    fn test_parse_command() {
        let cli = Cli::parse_from(["sq", "parse", "status:open", "--strict"]);
        if let Some(Commands::Parse {
            query,
            strict,
            normalize,
        }) = cli.command
        {
            assert_eq!(query.as_deref(), Some("status:open"));
            assert!(strict);
            assert!(!normalize);
        } else {
            panic!("Expected Parse command");
        }
    }

    #[test]
    fn test_parse_query_is_optional() {
        let cli = Cli::parse_from(["sq", "parse"]);
        assert!(matches!(cli.command, Some(Commands::Parse { query: None, .. })));
    }

    #[test]
    fn test_query_starting_with_dash_after_separator() {
        let cli = Cli::parse_from(["sq", "parse", "--", "-status:closed"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Parse { query: Some(ref q), .. }) if q == "-status:closed"
        ));
    }

    #[test]
    fn test_strict_conflicts_with_normalize() {
        assert!(Cli::try_parse_from(["sq", "parse", "x", "--strict", "--normalize"]).is_err());
    }

    #[test]
    fn test_aliases() {
        let cli = Cli::parse_from(["sq", "p", "x"]);
        assert!(matches!(cli.command, Some(Commands::Parse { .. })));

        let cli = Cli::parse_from(["sq", "t", "x"]);
        assert!(matches!(cli.command, Some(Commands::Tokens { .. })));

        let cli = Cli::parse_from(["sq", "c", "x"]);
        assert!(matches!(cli.command, Some(Commands::Check { .. })));
    }

    #[test]
    fn test_config_set() {
        let cli = Cli::parse_from(["sq", "config", "set", "output.format", "json"]);
        if let Some(Commands::Config {
            command: Some(ConfigCommands::Set { key, value }),
        }) = cli.command
        {
            assert_eq!(key, "output.format");
            assert_eq!(value, "json");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn test_completions() {
        let cli = Cli::parse_from(["sq", "completions", "zsh"]);
        if let Some(Commands::Completions { shell }) = cli.command {
            assert!(matches!(shell, Shell::Zsh));
        } else {
            panic!("Expected Completions command");
        }
    }
}
