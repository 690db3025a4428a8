//! CLI argument definitions using clap derive

use crate::version::{self, Version};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tfs - Terraform version switcher
///
/// Installs the Terraform release matching a version or constraint,
/// caches it locally and points the `terraform` link at it. Without an
/// argument, the constraint comes from `required_version` in the `*.tf`
/// files of the current directory.
#[derive(Parser, Debug)]
#[command(name = "tfs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Version (1.9.8) or constraint ("~> 1.9", ">= 1.5, < 2.0") to activate
    #[arg(value_name = "VERSION_OR_CONSTRAINT")]
    pub constraint: Option<String>,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TFS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List cached Terraform releases
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Remove every cached release
    Prune(PruneArgs),

    /// Remove cached releases older than VERSION
    PruneUntil(PruneUntilArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the prune command
#[derive(Parser, Debug)]
pub struct PruneArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the prune-until command
#[derive(Parser, Debug)]
pub struct PruneUntilArgs {
    /// Oldest version to keep
    #[arg(value_name = "VERSION", value_parser = parse_version_arg)]
    pub floor: Version,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.history)
        key: String,

        /// Value to set
        value: String,
    },
}

/// Output format for list command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

fn parse_version_arg(s: &str) -> Result<Version, String> {
    version::parse_version(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_bare_constraint() {
        let cli = Cli::parse_from(["tfs", "~> 1.9"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.constraint.as_deref(), Some("~> 1.9"));
    }

    #[test]
    fn cli_parses_without_arguments() {
        let cli = Cli::parse_from(["tfs"]);
        assert!(cli.command.is_none());
        assert!(cli.constraint.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn cli_parses_list_alias() {
        let cli = Cli::parse_from(["tfs", "ls", "--format", "json"]);
        match cli.command {
            Some(Commands::List(args)) => assert_eq!(args.format, OutputFormat::Json),
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn cli_parses_prune_until() {
        let cli = Cli::parse_from(["tfs", "prune-until", "1.10"]);
        match cli.command {
            Some(Commands::PruneUntil(args)) => {
                assert_eq!(args.floor, Version::new(1, 10, 0));
            }
            _ => panic!("Expected PruneUntil command"),
        }
    }

    #[test]
    fn cli_rejects_invalid_prune_until_version() {
        assert!(Cli::try_parse_from(["tfs", "prune-until", "latest"]).is_err());
        assert!(Cli::try_parse_from(["tfs", "prune-until"]).is_err());
    }

    #[test]
    fn cli_parses_prune_yes() {
        let cli = Cli::parse_from(["tfs", "prune", "-y"]);
        assert!(matches!(cli.command, Some(Commands::Prune(PruneArgs { yes: true }))));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["tfs", "config", "set", "cache.history", "4"]);
        match cli.command {
            Some(Commands::Config(ConfigArgs {
                action: Some(ConfigAction::Set { key, value }),
            })) => {
                assert_eq!(key, "cache.history");
                assert_eq!(value, "4");
            }
            _ => panic!("Expected Config Set command"),
        }
    }

    #[test]
    fn cli_global_flags() {
        let cli = Cli::parse_from(["tfs", "-vv", "list", "-c", "/tmp/tfs.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/tfs.toml")));
    }

    #[test]
    fn cli_version_flag_still_works() {
        let err = Cli::try_parse_from(["tfs", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);

        let cli = Cli::parse_from(["tfs", "1.9.8"]);
        assert_eq!(cli.constraint.as_deref(), Some("1.9.8"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
