//! List command - show cached artifacts

use crate::cache::{format_bytes, CacheEntry};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::cli::open_cache;
use crate::config::Config;
use crate::error::CacheResult;
use console::style;
use std::path::PathBuf;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config, cache_dir: Option<PathBuf>) -> CacheResult<()> {
    let cache = open_cache(config, cache_dir)?;
    let entries = cache.entries().await?;

    if entries.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!("No cached artifacts in {}", cache.cache_dir().display()),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&entries),
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Plain => print_plain(&entries),
    }

    Ok(())
}

fn print_table(entries: &[CacheEntry]) {
    println!(
        "{:<66} {:>10} {:<20}",
        style("DIGEST").bold(),
        style("SIZE").bold(),
        style("LAST ACCESS").bold()
    );
    println!("{}", "-".repeat(98));

    for entry in entries {
        let accessed = entry.last_access.format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<66} {:>10} {:<20}",
            entry.digest,
            format_bytes(entry.size_bytes),
            style(accessed).dim()
        );
    }

    let total: u64 = entries.iter().map(|e| e.size_bytes).sum();
    println!();
    println!("{} artifact(s), {}", entries.len(), format_bytes(total));
}

fn print_json(entries: &[CacheEntry]) -> CacheResult<()> {
    let json = serde_json::to_string_pretty(entries)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(entries: &[CacheEntry]) {
    for entry in entries {
        println!("{}", entry.digest);
    }
}
