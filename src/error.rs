//! Error types for the artifact cache
//!
//! All modules use `CacheResult<T>` as their return type.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// All errors that can occur in the artifact cache
#[derive(Error, Debug)]
pub enum CacheError {
    // Construction errors
    #[error("Cache directory {path} is unusable: {reason}")]
    CacheDirectory { path: PathBuf, reason: String },

    // Identity errors
    #[error("Invalid digest {digest:?}: {reason}")]
    InvalidDigest { digest: String, reason: String },

    #[error("Artifact not found in cache: {0}")]
    ArtifactNotFound(String),

    // Fetch errors
    #[error("Failed to fetch {artifact}: {reason}")]
    Fetch { artifact: String, reason: String },

    #[error("Digest mismatch for {artifact}: expected {expected}, got {actual}")]
    DigestMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("Background task failed: {0}")]
    Task(String),

    /// An error observed through a future shared between several waiters
    #[error(transparent)]
    Shared(Arc<CacheError>),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl CacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a fetch error for an artifact
    pub fn fetch(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }

    /// Unwrap shared errors to the error that caused them
    pub fn root(&self) -> &CacheError {
        match self {
            Self::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// Check if error is retryable
    ///
    /// Fetch failures leave the digest absent, so a later `add_all` retries it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.root(),
            Self::Fetch { .. } | Self::DigestMismatch { .. } | Self::Task(_) | Self::Io { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self.root() {
            Self::CacheDirectory { .. } => {
                Some("Point --cache-dir (or [cache] dir in the config) at a writable directory")
            }
            Self::ArtifactNotFound(_) => Some("Add it first: artifact-cache add <file>"),
            Self::DigestMismatch { .. } => Some("The source changed while it was being copied; retry"),
            Self::ConfigInvalid { .. } => Some("Run: artifact-cache config show"),
            _ => None,
        }
    }
}
