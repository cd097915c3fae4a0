//! Artifact transfer abstraction
//!
//! The cache does not move bytes itself. A fetcher copies a batch of
//! artifacts to the destinations the cache chooses; the transport (local
//! copy, RPC download, CAS fetch) is up to the implementation.

pub mod local;

pub use local::LocalFileFetcher;

use crate::artifact::{ArtifactDestination, OutputArtifact};
use crate::context::Context;
use crate::error::CacheResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// Copies artifacts into place
///
/// Implementations must only ever create a file at a destination path once
/// its content is complete. A failed transfer leaves nothing at the final
/// path.
#[async_trait]
pub trait ArtifactFetcher<A: OutputArtifact>: Send + Sync {
    /// Copy every artifact to its destination
    ///
    /// Completes once all transfers finish; fails if any transfer fails.
    async fn copy(
        &self,
        artifacts: HashMap<A, ArtifactDestination>,
        ctx: &Context,
    ) -> CacheResult<()>;
}
