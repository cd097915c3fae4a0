//! Listing of stored cache entries

use crate::artifact::Digest;
use crate::cache::metadata::last_accessed;
use crate::error::{CacheError, CacheResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Size of an entry in binary units, one decimal above bytes
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

/// A stored artifact and its bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    pub digest: Digest,
    pub size_bytes: u64,
    pub last_access: DateTime<Utc>,
}

/// Scan a cache directory for complete entries
///
/// In-progress downloads use dot-prefixed names and are skipped, as is
/// anything else whose name is not a valid digest.
pub fn scan(cache_dir: &Path) -> CacheResult<Vec<CacheEntry>> {
    let read_dir = std::fs::read_dir(cache_dir)
        .map_err(|e| CacheError::io(format!("reading cache directory {}", cache_dir.display()), e))?;

    let mut entries = Vec::new();
    for item in read_dir {
        let item = item.map_err(|e| CacheError::io("reading cache directory entry", e))?;
        let name = item.file_name().to_string_lossy().into_owned();
        let Ok(digest) = Digest::new(name) else {
            debug!("Skipping non-entry {}", item.path().display());
            continue;
        };

        let meta = item
            .metadata()
            .map_err(|e| CacheError::io(format!("reading metadata of {}", digest), e))?;
        if !meta.is_file() {
            continue;
        }

        entries.push(CacheEntry {
            last_access: last_accessed(&item.path())?,
            size_bytes: meta.len(),
            digest,
        });
    }

    entries.sort_by(|a, b| b.last_access.cmp(&a.last_access).then(a.digest.cmp(&b.digest)));
    Ok(entries)
}
