//! Content-addressed build artifact cache
//!
//! Artifacts are stored once per digest in a flat directory, fetched in
//! batches through an `ArtifactFetcher`, and tracked by last-access time.
//!
//! # Guarantees
//!
//! - At most one fetch per digest is ever in flight
//! - Entries are written once and never modified afterwards
//! - A failed fetch leaves the digest absent, so the next request retries
//! - Calls never block; work runs on the supplied tokio runtime
//!
//! # Layout
//!
//! | Path | Meaning |
//! |------|---------|
//! | `<root>/<digest>` | Complete entry |
//! | `<root>/.<digest>.<id>.tmp` | Download in progress (local fetcher) |
//!
//! There is no index or manifest. Presence on disk plus the access time is
//! the whole persisted state.

pub mod directory;
pub mod entry;
pub mod metadata;

pub use directory::BuildArtifactCacheDirectory;
pub use entry::{format_bytes, CacheEntry};

use crate::artifact::{CachedArtifact, Digest, OutputArtifact};
use crate::context::Context;
use crate::error::CacheResult;
use futures_util::future::BoxFuture;

/// Completion of an `add_all` request
pub type AddAllFuture = BoxFuture<'static, CacheResult<()>>;

/// Pending read of a cache entry
pub type GetFuture = BoxFuture<'static, CacheResult<CachedArtifact>>;

/// Cache of build outputs keyed by content digest
pub trait BuildArtifactCache<A: OutputArtifact>: Send + Sync {
    /// Make `artifacts` available in the cache
    ///
    /// Returns immediately. Missing artifacts are fetched in one batch and
    /// present ones have their access time refreshed. The returned future
    /// resolves once every requested artifact is readable, including ones
    /// that were already being fetched by an earlier call, and fails if any
    /// of that work fails.
    fn add_all(&self, artifacts: Vec<A>, ctx: &Context) -> AddAllFuture;

    /// Look up an artifact by digest
    ///
    /// `None` if the digest was never requested. Otherwise the future
    /// resolves to the entry once any in-flight fetch for it finishes.
    fn get(&self, digest: &Digest) -> Option<GetFuture>;
}
