//! Read view over a cache entry

use crate::artifact::digest::Digest;
use crate::error::{CacheError, CacheResult};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Byte source backed by a stored cache entry
///
/// Entries are write-once, so reads need no locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtifact {
    digest: Digest,
    path: PathBuf,
}

impl CachedArtifact {
    pub(crate) fn new(digest: Digest, path: PathBuf) -> Self {
        Self { digest, path }
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Path of the entry inside the cache directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole entry into memory
    pub async fn read(&self) -> CacheResult<Vec<u8>> {
        fs::read(&self.path)
            .await
            .map_err(|e| CacheError::io(format!("reading cache entry {}", self.digest), e))
    }

    /// Read the entry as UTF-8 text
    pub async fn read_to_string(&self) -> CacheResult<String> {
        fs::read_to_string(&self.path)
            .await
            .map_err(|e| CacheError::io(format!("reading cache entry {}", self.digest), e))
    }

    /// Open the entry for streaming reads
    pub async fn open(&self) -> CacheResult<fs::File> {
        fs::File::open(&self.path)
            .await
            .map_err(|e| CacheError::io(format!("opening cache entry {}", self.digest), e))
    }

    /// Size of the entry in bytes
    pub async fn size(&self) -> CacheResult<u64> {
        let meta = fs::metadata(&self.path)
            .await
            .map_err(|e| CacheError::io(format!("reading metadata of {}", self.digest), e))?;
        Ok(meta.len())
    }
}
