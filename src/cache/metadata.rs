//! Access-time bookkeeping for cache entries
//!
//! The last-access timestamp is the only per-entry metadata. It is an LRU
//! proxy for eviction and lives in the filesystem itself.

use crate::error::{CacheError, CacheResult};
use chrono::{DateTime, Utc};
use std::fs::{File, FileTimes, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::runtime::Handle;

/// Set an entry's last-access time to now, off the async workers
pub async fn touch(executor: &Handle, path: PathBuf) -> CacheResult<()> {
    executor
        .spawn_blocking(move || set_accessed(&path, SystemTime::now()))
        .await
        .map_err(|e| CacheError::Task(format!("access time update: {}", e)))?
}

/// Touch every entry, reporting the first failure after all were attempted
pub async fn touch_all(executor: &Handle, paths: Vec<PathBuf>) -> CacheResult<()> {
    let results =
        futures_util::future::join_all(paths.into_iter().map(|p| touch(executor, p))).await;
    results.into_iter().collect()
}

/// Set only the access time, leaving modification time alone
pub fn set_accessed(path: &Path, when: SystemTime) -> CacheResult<()> {
    let file = open_for_attributes(path)
        .map_err(|e| CacheError::io(format!("opening {} for access time update", path.display()), e))?;
    file.set_times(FileTimes::new().set_accessed(when))
        .map_err(|e| CacheError::io(format!("setting access time of {}", path.display()), e))
}

/// Last-access time of an entry
pub fn last_accessed(path: &Path) -> CacheResult<DateTime<Utc>> {
    let accessed = std::fs::metadata(path)
        .and_then(|m| m.accessed())
        .map_err(|e| CacheError::io(format!("reading access time of {}", path.display()), e))?;
    Ok(DateTime::<Utc>::from(accessed))
}

#[cfg(unix)]
fn open_for_attributes(path: &Path) -> std::io::Result<File> {
    // futimens works on a read-only descriptor, entries may be read-only
    OpenOptions::new().read(true).open(path)
}

#[cfg(windows)]
fn open_for_attributes(path: &Path) -> std::io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;
    const FILE_WRITE_ATTRIBUTES: u32 = 0x100;
    OpenOptions::new().access_mode(FILE_WRITE_ATTRIBUTES).open(path)
}
