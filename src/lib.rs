//! artifact-cache - Content-addressed build artifact cache
//!
//! Stores build outputs once per content digest, deduplicates concurrent
//! fetches of the same artifact, and keeps access times for eviction.

pub mod artifact;
pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod fetcher;

pub use artifact::{CachedArtifact, Digest, LocalArtifact, OutputArtifact};
pub use cache::{BuildArtifactCache, BuildArtifactCacheDirectory};
pub use context::Context;
pub use error::{CacheError, CacheResult};
pub use fetcher::{ArtifactFetcher, LocalFileFetcher};
