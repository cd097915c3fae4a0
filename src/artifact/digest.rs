//! Artifact identity
//!
//! A digest names an artifact's bytes. Equal digests mean equal content,
//! so each digest is stored once and doubles as the entry's file name.

use crate::error::{CacheError, CacheResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::io::AsyncReadExt;

/// Prefix reserved for in-progress downloads inside the cache directory
pub const TEMP_PREFIX: char = '.';

/// Content digest of a build artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// Create a digest, checking it can serve as a flat file name
    pub fn new(value: impl Into<String>) -> CacheResult<Self> {
        let value = value.into();
        let invalid = |reason: &str| CacheError::InvalidDigest {
            digest: value.clone(),
            reason: reason.to_string(),
        };

        if value.is_empty() {
            return Err(invalid("digest is empty"));
        }
        if value.starts_with(TEMP_PREFIX) {
            return Err(invalid("digest may not start with '.'"));
        }
        if value.contains(['/', '\\', '\0']) {
            return Err(invalid("digest may not contain path separators or NUL"));
        }

        Ok(Self(value))
    }

    /// SHA256 digest of an in-memory buffer
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// SHA256 digest of a file, streamed in chunks
    pub async fn of_file(path: &Path) -> CacheResult<Self> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| CacheError::io(format!("opening {}", path.display()), e))?;

        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = file
                .read(&mut buf)
                .await
                .map_err(|e| CacheError::io(format!("reading {}", path.display()), e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// The digest string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Digest {
    type Err = CacheError;

    fn from_str(s: &str) -> CacheResult<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = CacheError;

    fn try_from(value: String) -> CacheResult<Self> {
        Self::new(value)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
