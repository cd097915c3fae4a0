//! Add command - store local files in the cache

use crate::artifact::{LocalArtifact, OutputArtifact};
use crate::cache::BuildArtifactCache;
use crate::cli::args::AddArgs;
use crate::cli::open_cache;
use crate::config::Config;
use crate::context::Context;
use crate::error::{CacheError, CacheResult};
use console::style;
use std::path::PathBuf;
use tracing::debug;

/// Execute the add command
pub async fn execute(args: AddArgs, config: &Config, cache_dir: Option<PathBuf>) -> CacheResult<()> {
    let cache = open_cache(config, cache_dir)?;

    let mut artifacts = Vec::with_capacity(args.files.len());
    for file in &args.files {
        if !file.is_file() {
            return Err(CacheError::User(format!("Not a file: {}", file.display())));
        }
        let artifact = LocalArtifact::from_file(file).await?;
        debug!("Hashed {}", artifact.description());
        artifacts.push(artifact);
    }

    let ctx = Context::new("add");
    let result = cache.add_all(artifacts.clone(), &ctx).await;

    for issue in ctx.issues() {
        eprintln!("{} {}", style("Warning:").yellow(), issue);
    }
    result?;

    for artifact in &artifacts {
        println!("{}  {}", artifact.digest(), artifact.path().display());
    }

    Ok(())
}
