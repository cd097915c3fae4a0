//! Fetcher for artifacts already present on the local filesystem

use crate::artifact::{ArtifactDestination, Digest, LocalArtifact, OutputArtifact};
use crate::context::Context;
use crate::error::{CacheError, CacheResult};
use crate::fetcher::ArtifactFetcher;
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, Instrument};

/// Default number of concurrent copies
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Copies local files into the cache
///
/// Each file is copied to a dot-prefixed sibling of its destination and
/// renamed into place once complete.
#[derive(Debug, Clone)]
pub struct LocalFileFetcher {
    concurrency: usize,
    verify_digest: bool,
}

impl LocalFileFetcher {
    pub fn new() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            verify_digest: false,
        }
    }

    /// Limit the number of copies in progress at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Re-hash copied bytes and reject them if they don't match the digest
    pub fn with_verify_digest(mut self, verify: bool) -> Self {
        self.verify_digest = verify;
        self
    }

    async fn copy_one(&self, artifact: LocalArtifact, dest: ArtifactDestination) -> CacheResult<()> {
        let tmp = temp_path(&dest.path);
        let result = self.copy_via(&artifact, &tmp, &dest.path).await;
        if result.is_err() {
            // Nothing may survive at either path on failure
            let _ = fs::remove_file(&tmp).await;
        }
        result
    }

    async fn copy_via(&self, artifact: &LocalArtifact, tmp: &Path, dest: &Path) -> CacheResult<()> {
        fs::copy(artifact.path(), tmp)
            .await
            .map_err(|e| CacheError::fetch(artifact.description(), e.to_string()))?;

        if self.verify_digest {
            let actual = Digest::of_file(tmp).await?;
            if &actual != artifact.digest() {
                return Err(CacheError::DigestMismatch {
                    artifact: artifact.path().display().to_string(),
                    expected: artifact.digest().to_string(),
                    actual: actual.to_string(),
                });
            }
        }

        fs::rename(tmp, dest)
            .await
            .map_err(|e| CacheError::io(format!("moving {} into place", dest.display()), e))?;

        debug!("Copied {} -> {}", artifact.path().display(), dest.display());
        Ok(())
    }
}

impl Default for LocalFileFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactFetcher<LocalArtifact> for LocalFileFetcher {
    async fn copy(
        &self,
        artifacts: HashMap<LocalArtifact, ArtifactDestination>,
        ctx: &Context,
    ) -> CacheResult<()> {
        let count = artifacts.len();
        ctx.output(&format!("Copying {} artifact(s)", count));

        // Every copy settles, and cleans up its temporary file, before the
        // first failure is reported
        let results: Vec<CacheResult<()>> = stream::iter(artifacts)
            .map(|(artifact, dest)| self.copy_one(artifact, dest))
            .buffer_unordered(self.concurrency)
            .collect()
            .instrument(ctx.span().clone())
            .await;

        results.into_iter().collect()
    }
}

/// Hidden sibling of `dest` used while a copy is in progress
fn temp_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dir_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn copies_batch() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let mut batch = HashMap::new();
        for (name, body) in [("a.o", "alpha"), ("b.o", "beta")] {
            let path = src.path().join(name);
            std::fs::write(&path, body).unwrap();
            let artifact = LocalArtifact::new(Digest::of_bytes(body.as_bytes()), path);
            let dest = ArtifactDestination::new(dst.path().join(artifact.digest().as_str()));
            batch.insert(artifact, dest);
        }

        LocalFileFetcher::new()
            .copy(batch, &Context::new("test"))
            .await
            .unwrap();

        let alpha = Digest::of_bytes(b"alpha");
        assert_eq!(
            std::fs::read_to_string(dst.path().join(alpha.as_str())).unwrap(),
            "alpha"
        );
        assert_eq!(dir_names(dst.path()).len(), 2);
    }

    #[tokio::test]
    async fn missing_source_leaves_nothing_behind() {
        let dst = TempDir::new().unwrap();
        let artifact = LocalArtifact::new(Digest::new("abc").unwrap(), "/nonexistent/file.o");
        let mut batch = HashMap::new();
        batch.insert(artifact, ArtifactDestination::new(dst.path().join("abc")));

        let err = LocalFileFetcher::new()
            .copy(batch, &Context::new("test"))
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::Fetch { .. }));
        assert!(dir_names(dst.path()).is_empty());
    }

    #[tokio::test]
    async fn digest_mismatch_rejected_when_verifying() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let path = src.path().join("out.bin");
        std::fs::write(&path, b"actual bytes").unwrap();

        let artifact = LocalArtifact::new(Digest::of_bytes(b"expected bytes"), path);
        let dest = dst.path().join(artifact.digest().as_str());
        let mut batch = HashMap::new();
        batch.insert(artifact, ArtifactDestination::new(&dest));

        let err = LocalFileFetcher::new()
            .with_verify_digest(true)
            .copy(batch, &Context::new("test"))
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::DigestMismatch { .. }));
        assert!(!dest.exists());
        assert!(dir_names(dst.path()).is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn failed_batch_waits_for_siblings_and_cleans_up() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();

        // Large enough that its copy is still running when the missing one fails
        let big_body = vec![7u8; 32 * 1024 * 1024];
        let big_path = src.path().join("big.bin");
        std::fs::write(&big_path, &big_body).unwrap();
        let big = LocalArtifact::new(Digest::of_bytes(&big_body), big_path);
        let missing = LocalArtifact::new(Digest::new("missing").unwrap(), "/nonexistent/x");

        let mut batch = HashMap::new();
        for artifact in [big.clone(), missing] {
            let dest = ArtifactDestination::new(dst.path().join(artifact.digest().as_str()));
            batch.insert(artifact, dest);
        }

        let err = LocalFileFetcher::new()
            .copy(batch, &Context::new("test"))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Fetch { .. }));

        // Checked immediately: nothing is still being written
        let names = dir_names(dst.path());
        assert!(names.iter().all(|n| !n.starts_with('.')), "{names:?}");
        assert!(!dst.path().join("missing").exists());
        let big_dest = dst.path().join(big.digest().as_str());
        if big_dest.exists() {
            assert_eq!(std::fs::metadata(&big_dest).unwrap().len(), big_body.len() as u64);
        }
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        let tmp = temp_path(Path::new("/cache/abc123"));
        assert_eq!(tmp.parent(), Some(Path::new("/cache")));
        let name = tmp.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(".abc123."));
        assert!(name.ends_with(".tmp"));
    }
}
