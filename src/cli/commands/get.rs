//! Cat and path commands - read cached artifacts by digest

use crate::artifact::{CachedArtifact, Digest};
use crate::cache::BuildArtifactCache;
use crate::cli::args::DigestArgs;
use crate::cli::open_cache;
use crate::config::Config;
use crate::error::{CacheError, CacheResult};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::warn;

async fn lookup(args: &DigestArgs, config: &Config, cache_dir: Option<PathBuf>) -> CacheResult<CachedArtifact> {
    let digest: Digest = args.digest.parse()?;
    let cache = open_cache(config, cache_dir)?;

    let entry = match cache.get(&digest) {
        Some(pending) => pending.await?,
        None => return Err(CacheError::ArtifactNotFound(digest.to_string())),
    };

    // The process exits right after printing, before a background touch runs
    if let Err(e) = cache.refresh_access_time(&digest).await {
        warn!("Failed to update access time for {}: {}", digest, e);
    }
    Ok(entry)
}

/// Execute the cat command
pub async fn cat(args: DigestArgs, config: &Config, cache_dir: Option<PathBuf>) -> CacheResult<()> {
    let entry = lookup(&args, config, cache_dir).await?;

    let mut file = entry.open().await?;
    let mut stdout = tokio::io::stdout();
    tokio::io::copy(&mut file, &mut stdout)
        .await
        .map_err(|e| CacheError::io("writing artifact to stdout", e))?;
    stdout
        .flush()
        .await
        .map_err(|e| CacheError::io("flushing stdout", e))?;

    Ok(())
}

/// Execute the path command
pub async fn path(args: DigestArgs, config: &Config, cache_dir: Option<PathBuf>) -> CacheResult<()> {
    let entry = lookup(&args, config, cache_dir).await?;
    println!("{}", entry.path().display());
    Ok(())
}
