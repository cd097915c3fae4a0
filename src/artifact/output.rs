//! Artifact descriptors handed to the cache and its fetchers

use crate::artifact::digest::Digest;
use std::fmt;
use std::hash::Hash;
use std::path::{Path, PathBuf};

/// A build output the cache can store
///
/// Implementations carry whatever a fetcher needs to retrieve the bytes;
/// the cache itself only looks at the digest.
pub trait OutputArtifact: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Content digest naming the artifact's bytes
    fn digest(&self) -> &Digest;

    /// Human-readable description for logs and errors
    fn description(&self) -> String {
        self.digest().to_string()
    }
}

/// An artifact that already exists on the local filesystem
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalArtifact {
    digest: Digest,
    path: PathBuf,
}

impl LocalArtifact {
    /// Create a descriptor for a local file with a known digest
    pub fn new(digest: Digest, path: impl Into<PathBuf>) -> Self {
        Self {
            digest,
            path: path.into(),
        }
    }

    /// Create a descriptor by hashing the file's current contents
    pub async fn from_file(path: impl Into<PathBuf>) -> crate::error::CacheResult<Self> {
        let path = path.into();
        let digest = Digest::of_file(&path).await?;
        Ok(Self { digest, path })
    }

    /// Source path of the artifact
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputArtifact for LocalArtifact {
    fn digest(&self) -> &Digest {
        &self.digest
    }

    fn description(&self) -> String {
        format!("{} ({})", self.path.display(), self.digest)
    }
}

/// Final on-disk location a fetcher writes an artifact to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactDestination {
    pub path: PathBuf,
}

impl ArtifactDestination {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}
