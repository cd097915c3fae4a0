//! artifact-cache - Content-addressed build artifact cache
//!
//! CLI entry point that dispatches to subcommands.

use artifact_cache::cli::{Cli, Commands};
use artifact_cache::config::{Config, ConfigManager};
use artifact_cache::error::CacheResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, config: &Config) {
    // 0 = warn, 1 = info, 2+ = debug
    let filter = match verbose {
        0 => EnvFilter::new("artifact_cache=warn"),
        1 => EnvFilter::new("artifact_cache=info"),
        _ => EnvFilter::new("artifact_cache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}

async fn run() -> CacheResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);

    match cli.command {
        Commands::Add(args) => artifact_cache::cli::commands::add(args, &config, cli.cache_dir).await,
        Commands::Cat(args) => artifact_cache::cli::commands::cat(args, &config, cli.cache_dir).await,
        Commands::Path(args) => artifact_cache::cli::commands::path(args, &config, cli.cache_dir).await,
        Commands::List(args) => artifact_cache::cli::commands::list(args, &config, cli.cache_dir).await,
        Commands::Config(args) => {
            artifact_cache::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
