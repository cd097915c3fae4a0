//! Value types describing build artifacts
//!
//! - `Digest`: content identity, also the entry's file name
//! - `OutputArtifact`: what callers ask the cache to store
//! - `CachedArtifact`: what the cache hands back

pub mod bytes;
pub mod digest;
pub mod output;

pub use bytes::CachedArtifact;
pub use digest::Digest;
pub use output::{ArtifactDestination, LocalArtifact, OutputArtifact};
