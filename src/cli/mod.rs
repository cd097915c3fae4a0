//! Command-line interface

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};

use crate::artifact::LocalArtifact;
use crate::cache::BuildArtifactCacheDirectory;
use crate::config::{Config, ConfigManager};
use crate::error::CacheResult;
use crate::fetcher::LocalFileFetcher;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// Open the cache for local files, honouring a `--cache-dir` override
pub fn open_cache(
    config: &Config,
    cache_dir: Option<PathBuf>,
) -> CacheResult<BuildArtifactCacheDirectory<LocalArtifact>> {
    let dir = cache_dir.unwrap_or_else(|| ConfigManager::cache_dir(config));
    debug!("Using cache directory {}", dir.display());

    let fetcher = LocalFileFetcher::new()
        .with_concurrency(config.fetch.concurrency)
        .with_verify_digest(config.fetch.verify_digest);

    BuildArtifactCacheDirectory::create(dir, Arc::new(fetcher), Handle::current())
}
