//! Directory-backed build artifact cache
//!
//! Each digest is in one of three states:
//!
//! | State | On disk | In flight map |
//! |-------|---------|---------------|
//! | Absent | no | no |
//! | In flight | maybe partial | yes |
//! | Present | yes, stable | no |
//!
//! The in-flight map is the only shared mutable state. Partitioning a
//! request and registering the resulting work happen under one lock, which
//! is what keeps fetches unique per digest.

use crate::artifact::{ArtifactDestination, CachedArtifact, Digest, OutputArtifact};
use crate::cache::entry::{self, CacheEntry};
use crate::cache::metadata::{touch, touch_all};
use crate::cache::{AddAllFuture, BuildArtifactCache, GetFuture};
use crate::context::Context;
use crate::error::{CacheError, CacheResult};
use crate::fetcher::ArtifactFetcher;
use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn, Instrument};

type SharedResult = Result<(), Arc<CacheError>>;

/// Outstanding work for one or more digests, awaitable by many callers
type InFlight = Shared<BoxFuture<'static, SharedResult>>;

type InFlightMap = Arc<Mutex<HashMap<Digest, InFlight>>>;

fn lock(map: &Mutex<HashMap<Digest, InFlight>>) -> MutexGuard<'_, HashMap<Digest, InFlight>> {
    match map.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Removes a batch's digests from the in-flight map when dropped
///
/// Held by the task doing the work, so deregistration also happens if the
/// task is aborted or panics.
struct Registration {
    map: InFlightMap,
    digests: Vec<Digest>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut in_flight = lock(&self.map);
        for digest in &self.digests {
            in_flight.remove(digest);
        }
    }
}

/// Work registered under the lock, spawned once the lock is released
type PendingTask = BoxFuture<'static, ()>;

/// On-disk cache rooted at a single directory it exclusively owns
pub struct BuildArtifactCacheDirectory<A: OutputArtifact> {
    cache_dir: PathBuf,
    fetcher: Arc<dyn ArtifactFetcher<A>>,
    executor: Handle,
    in_flight: InFlightMap,
}

impl<A: OutputArtifact> BuildArtifactCacheDirectory<A> {
    /// Open or create a cache rooted at `cache_dir`
    ///
    /// Fails if the path exists but is not a directory, or cannot be created.
    pub fn create(
        cache_dir: impl Into<PathBuf>,
        fetcher: Arc<dyn ArtifactFetcher<A>>,
        executor: Handle,
    ) -> CacheResult<Self> {
        let cache_dir = cache_dir.into();
        let unusable = |reason: String| CacheError::CacheDirectory {
            path: cache_dir.clone(),
            reason,
        };

        match std::fs::metadata(&cache_dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(unusable("exists and is not a directory".to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                std::fs::create_dir_all(&cache_dir)
                    .map_err(|e| unusable(format!("cannot be created: {}", e)))?;
                debug!("Created cache directory {}", cache_dir.display());
            }
            Err(e) => return Err(unusable(e.to_string())),
        }

        Ok(Self {
            cache_dir,
            fetcher,
            executor,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Root directory of the cache
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where the entry for `digest` lives
    pub fn artifact_path(&self, digest: &Digest) -> PathBuf {
        self.cache_dir.join(digest.as_str())
    }

    /// Whether `digest` is stored or being fetched
    pub fn contains(&self, digest: &Digest) -> bool {
        lock(&self.in_flight).contains_key(digest) || self.artifact_path(digest).is_file()
    }

    /// Number of digests with outstanding work
    pub fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Update the access time of a stored entry and wait for it to land
    ///
    /// `get` records the access in the background; short-lived callers that
    /// may shut the runtime down right after reading use this instead.
    pub async fn refresh_access_time(&self, digest: &Digest) -> CacheResult<()> {
        touch(&self.executor, self.artifact_path(digest)).await
    }

    /// Complete entries currently stored, most recently used first
    pub async fn entries(&self) -> CacheResult<Vec<CacheEntry>> {
        let dir = self.cache_dir.clone();
        self.executor
            .spawn_blocking(move || entry::scan(&dir))
            .await
            .map_err(|e| CacheError::Task(format!("listing cache: {}", e)))?
    }

    /// Register `work` as in flight for `digests`
    ///
    /// Must be called with the map locked. Returns the shared handle and the
    /// task to spawn after unlocking; the task deregisters the digests before
    /// publishing its result.
    fn register<F>(
        &self,
        in_flight: &mut HashMap<Digest, InFlight>,
        digests: Vec<Digest>,
        work: F,
    ) -> (InFlight, PendingTask)
    where
        F: Future<Output = CacheResult<()>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel::<SharedResult>();
        let shared = async move {
            rx.await.unwrap_or_else(|_| {
                Err(Arc::new(CacheError::Task(
                    "cache task dropped before completing".to_string(),
                )))
            })
        }
        .boxed()
        .shared();

        for digest in &digests {
            in_flight.insert(digest.clone(), shared.clone());
        }

        let registration = Registration {
            map: Arc::clone(&self.in_flight),
            digests,
        };
        let task = async move {
            let result = work.await.map_err(Arc::new);
            drop(registration);
            let _ = tx.send(result);
        }
        .boxed();

        (shared, task)
    }

    fn start_fetch(
        &self,
        in_flight: &mut HashMap<Digest, InFlight>,
        artifacts: Vec<A>,
        ctx: &Context,
    ) -> (InFlight, PendingTask) {
        let digests: Vec<Digest> = artifacts.iter().map(|a| a.digest().clone()).collect();
        let paths: Vec<PathBuf> = digests.iter().map(|d| self.artifact_path(d)).collect();
        let batch: HashMap<A, ArtifactDestination> = artifacts
            .into_iter()
            .map(|a| {
                let dest = ArtifactDestination::new(self.artifact_path(a.digest()));
                (a, dest)
            })
            .collect();

        let fetcher = Arc::clone(&self.fetcher);
        let executor = self.executor.clone();
        let ctx = ctx.clone();
        let span = ctx.span().clone();
        let count = batch.len();

        let work = async move {
            debug!("Fetching {} artifact(s)", count);
            if let Err(e) = fetcher.copy(batch, &ctx).await {
                ctx.warn(format!("Fetching {} artifact(s) failed: {}", count, e));
                return Err(e);
            }
            touch_all(&executor, paths).await
        }
        .instrument(span);

        self.register(in_flight, digests, work)
    }

    fn start_touch(
        &self,
        in_flight: &mut HashMap<Digest, InFlight>,
        digests: Vec<Digest>,
    ) -> (InFlight, PendingTask) {
        let paths: Vec<PathBuf> = digests.iter().map(|d| self.artifact_path(d)).collect();
        let executor = self.executor.clone();
        let work = async move { touch_all(&executor, paths).await };
        self.register(in_flight, digests, work)
    }
}

impl<A: OutputArtifact> BuildArtifactCache<A> for BuildArtifactCacheDirectory<A> {
    fn add_all(&self, artifacts: Vec<A>, ctx: &Context) -> AddAllFuture {
        let mut waits: Vec<InFlight> = Vec::new();
        let mut tasks: Vec<PendingTask> = Vec::new();

        {
            let mut in_flight = lock(&self.in_flight);
            let mut seen = HashSet::new();
            let mut to_fetch = Vec::new();
            let mut to_touch = Vec::new();
            let mut joined = 0usize;

            for artifact in artifacts {
                let digest = artifact.digest().clone();
                if !seen.insert(digest.clone()) {
                    continue;
                }
                if let Some(existing) = in_flight.get(&digest) {
                    joined += 1;
                    if !waits.iter().any(|w| w.ptr_eq(existing)) {
                        waits.push(existing.clone());
                    }
                } else if self.artifact_path(&digest).is_file() {
                    to_touch.push(digest);
                } else {
                    to_fetch.push(artifact);
                }
            }

            debug!(
                "add_all: {} to fetch, {} already cached, {} in flight",
                to_fetch.len(),
                to_touch.len(),
                joined
            );

            if !to_fetch.is_empty() {
                let (shared, task) = self.start_fetch(&mut in_flight, to_fetch, ctx);
                waits.push(shared);
                tasks.push(task);
            }
            if !to_touch.is_empty() {
                let (shared, task) = self.start_touch(&mut in_flight, to_touch);
                waits.push(shared);
                tasks.push(task);
            }
        }

        for task in tasks {
            self.executor.spawn(task);
        }

        async move {
            // All work settles before the first failure is reported
            let results = future::join_all(waits).await;
            for result in results {
                result.map_err(CacheError::Shared)?;
            }
            Ok(())
        }
        .boxed()
    }

    fn get(&self, digest: &Digest) -> Option<GetFuture> {
        let path = self.artifact_path(digest);
        let entry = CachedArtifact::new(digest.clone(), path.clone());
        let executor = self.executor.clone();

        let in_flight = {
            let map = lock(&self.in_flight);
            let work = map.get(digest).cloned();
            if work.is_none() && !path.is_file() {
                return None;
            }
            work
        };

        match in_flight {
            Some(work) => Some(
                async move {
                    work.await.map_err(CacheError::Shared)?;
                    spawn_touch(&executor, path);
                    Ok(entry)
                }
                .boxed(),
            ),
            None => {
                spawn_touch(&executor, path);
                Some(future::ready(Ok(entry)).boxed())
            }
        }
    }
}

/// Fire-and-forget access time update
fn spawn_touch(executor: &Handle, path: PathBuf) {
    let handle = executor.clone();
    executor.spawn(async move {
        if let Err(e) = touch(&handle, path).await {
            warn!("Failed to update access time: {}", e);
        }
    });
}
