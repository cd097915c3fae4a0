//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// artifact-cache - Content-addressed build artifact cache
///
/// Stores build outputs once per content digest and serves them back
/// by digest.
#[derive(Parser, Debug)]
#[command(name = "artifact-cache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ARTIFACT_CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root directory (overrides config)
    #[arg(long, global = true, env = "ARTIFACT_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add local files to the cache
    Add(AddArgs),

    /// Write a cached artifact to stdout
    Cat(DigestArgs),

    /// Print the on-disk path of a cached artifact
    Path(DigestArgs),

    /// List cached artifacts
    List(ListArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the add command
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Files to add
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for commands addressing one artifact
#[derive(Parser, Debug)]
pub struct DigestArgs {
    /// Artifact digest
    pub digest: String,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
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
        /// Configuration key (e.g., fetch.concurrency)
        key: String,
        /// Value to set
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_add() {
        let cli = Cli::parse_from(["artifact-cache", "add", "a.jar", "b.so"]);
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.files, vec![PathBuf::from("a.jar"), PathBuf::from("b.so")]);
            }
            _ => panic!("expected Add command"),
        }
    }

    #[test]
    fn cli_add_requires_files() {
        assert!(Cli::try_parse_from(["artifact-cache", "add"]).is_err());
    }

    #[test]
    fn cli_parses_cat() {
        let cli = Cli::parse_from(["artifact-cache", "cat", "abc123"]);
        match cli.command {
            Commands::Cat(args) => assert_eq!(args.digest, "abc123"),
            _ => panic!("expected Cat command"),
        }
    }

    #[test]
    fn cli_parses_list_format() {
        let cli = Cli::parse_from(["artifact-cache", "list", "--format", "json"]);
        match cli.command {
            Commands::List(args) => assert!(matches!(args.format, OutputFormat::Json)),
            _ => panic!("expected List command"),
        }
    }

    #[test]
    fn cli_global_cache_dir() {
        let cli = Cli::parse_from(["artifact-cache", "list", "--cache-dir", "/tmp/c"]);
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/c")));
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["artifact-cache", "list"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["artifact-cache", "-v", "list"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["artifact-cache", "-vv", "list"]);
        assert_eq!(cli.verbose, 2);
    }
}
