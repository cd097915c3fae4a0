//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{CacheError, CacheResult};
use console::style;
use std::path::PathBuf;

const VALID_KEYS: &[&str] = &[
    "general.log_format",
    "cache.dir",
    "fetch.concurrency",
    "fetch.verify_digest",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> CacheResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut config = config.clone();
            apply(&mut config, &key, &value)?;
            manager.save(&config).await?;
            println!("{} Set {} = {}", style("[OK]").green(), key, value);
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> CacheResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> CacheResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        println!(
            "{} Config already exists at {} (use --force to overwrite)",
            style("[WARN]").yellow(),
            path.display()
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    println!(
        "{} Configuration initialized ({})",
        style("[OK]").green(),
        path.display()
    );
    Ok(())
}

/// Apply a dot-separated `key = value` to the config
fn apply(config: &mut Config, key: &str, value: &str) -> CacheResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(CacheError::User(format!(
                    "Invalid log format: {}. Use text/json",
                    value
                )))
            }
        },
        ["cache", "dir"] => config.cache.dir = Some(PathBuf::from(value)),
        ["fetch", "concurrency"] => config.fetch.concurrency = parse_usize(value)?,
        ["fetch", "verify_digest"] => config.fetch.verify_digest = parse_bool(value)?,
        _ => {
            return Err(CacheError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

fn parse_bool(value: &str) -> CacheResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(CacheError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_usize(value: &str) -> CacheResult<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CacheError::User(format!("Invalid positive number: {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "cache.dir", "/srv/artifacts").unwrap();
        apply(&mut config, "fetch.concurrency", "32").unwrap();
        apply(&mut config, "fetch.verify_digest", "no").unwrap();
        apply(&mut config, "general.log_format", "json").unwrap();

        assert_eq!(config.cache.dir, Some(PathBuf::from("/srv/artifacts")));
        assert_eq!(config.fetch.concurrency, 32);
        assert!(!config.fetch.verify_digest);
        assert_eq!(config.general.log_format, "json");
    }

    #[test]
    fn apply_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply(&mut config, "vm.name", "x").is_err());
        assert!(apply(&mut config, "fetch.concurrency", "0").is_err());
        assert!(apply(&mut config, "fetch.verify_digest", "maybe").is_err());
        assert!(apply(&mut config, "general.log_format", "xml").is_err());
    }
}
