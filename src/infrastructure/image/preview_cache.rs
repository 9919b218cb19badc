//! Capacity-bounded LRU index over finished preview artifacts.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};

use crate::domain::entities::{ArtifactKind, ArtifactName, CacheKey, ImageExtension};
use crate::domain::errors::StorageError;
use crate::infrastructure::storage::ArtifactStorage;

/// Default number of previews kept on disk.
pub const DEFAULT_CAPACITY: usize = 100;

/// Recency index mapping cache keys to the extension of their artifact.
///
/// The map and the recency order live in one `LruCache` behind one lock, so
/// no caller can observe them out of sync. Evicting an entry also deletes its
/// backing file.
///
/// Disk is the source of truth only while [`PreviewCache::rebuild_from_disk`]
/// runs. Afterwards the index is authoritative and the directory must not be
/// modified externally.
pub struct PreviewCache {
    index: Mutex<LruCache<CacheKey, ImageExtension>>,
    storage: Arc<ArtifactStorage>,
    capacity: NonZeroUsize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl std::fmt::Debug for PreviewCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewCache")
            .field("capacity", &self.capacity)
            .field("root", &self.storage.root())
            .finish_non_exhaustive()
    }
}

impl PreviewCache {
    /// Builds the index from the artifacts already present in storage.
    ///
    /// Files are inserted in directory-listing order, which stands in for
    /// recency. If there are more previews than `capacity`, the usual eviction
    /// rule removes the surplus. Leftover transient and scratch files from an
    /// interrupted run are deleted. Foreign files are left alone.
    ///
    /// # Errors
    /// Returns error if the storage directory cannot be listed.
    pub async fn rebuild_from_disk(
        storage: Arc<ArtifactStorage>,
        capacity: NonZeroUsize,
    ) -> Result<Self, StorageError> {
        let names = storage.list_artifact_names().await?;

        let cache = Self {
            index: Mutex::new(LruCache::new(capacity)),
            storage,
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        };

        for name in names {
            match ArtifactName::classify(&name) {
                ArtifactKind::Preview(key, extension) => {
                    cache.set(key, extension).await;
                }
                ArtifactKind::Transient | ArtifactKind::Scratch => {
                    debug!(name = %name, "Removing leftover artifact");
                    if let Err(e) = cache.storage.delete(&name).await {
                        warn!(name = %name, error = %e, "Failed to remove leftover artifact");
                    }
                }
                ArtifactKind::Foreign => {
                    trace!(name = %name, "Ignoring foreign file in artifact dir");
                }
            }
        }

        info!(
            entries = cache.len().await,
            capacity = capacity.get(),
            evicted = cache.evictions.load(Ordering::Relaxed),
            "Rebuilt preview cache from disk"
        );

        Ok(cache)
    }

    /// Looks up a key and promotes it to most recently used.
    ///
    /// A hit is provisional: the artifact may have vanished since it was
    /// indexed.
    pub async fn get(&self, key: &CacheKey) -> Option<ImageExtension> {
        let mut index = self.index.lock().await;
        if let Some(extension) = index.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Preview cache hit");
            Some(*extension)
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(key = %key, "Preview cache miss");
            None
        }
    }

    /// Inserts or overwrites a key and promotes it.
    ///
    /// Returns true if the key was already present. Overwriting never evicts
    /// another key. Inserting a new key at capacity first evicts the least
    /// recently used entry and deletes its artifact. A failed delete is
    /// logged and otherwise ignored.
    pub async fn set(&self, key: CacheKey, extension: ImageExtension) -> bool {
        let mut index = self.index.lock().await;

        if let Some(current) = index.get_mut(&key) {
            let previous = std::mem::replace(current, extension);
            if previous != extension {
                let stale = ArtifactName::preview(&key, previous);
                if let Err(e) = self.storage.delete(stale.as_str()).await {
                    warn!(name = %stale, error = %e, "Failed to delete superseded preview");
                }
            }
            trace!(key = %key, "Preview cache entry refreshed");
            return true;
        }

        if index.len() >= self.capacity.get()
            && let Some((evicted, evicted_ext)) = index.pop_lru()
        {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            let name = ArtifactName::preview(&evicted, evicted_ext);
            match self.storage.delete(name.as_str()).await {
                Ok(()) => debug!(key = %evicted, "Evicted preview"),
                Err(e) => warn!(
                    key = %evicted,
                    error = %e,
                    "Evicted preview but failed to delete its file"
                ),
            }
        }

        index.put(key, extension);
        false
    }

    /// Drops every entry and deletes the backing artifacts.
    ///
    /// Delete failures are logged; the index is emptied regardless.
    pub async fn clear(&self) {
        let mut index = self.index.lock().await;
        let mut failed = 0usize;
        while let Some((key, extension)) = index.pop_lru() {
            let name = ArtifactName::preview(&key, extension);
            if let Err(e) = self.storage.delete(name.as_str()).await {
                warn!(name = %name, error = %e, "Failed to delete preview while clearing");
                failed += 1;
            }
        }
        debug!(failed, "Cleared preview cache");
    }

    /// Looks up a key without promoting it.
    pub async fn peek(&self, key: &CacheKey) -> Option<ImageExtension> {
        let index = self.index.lock().await;
        index.peek(key).copied()
    }

    /// Number of indexed previews.
    pub async fn len(&self) -> usize {
        self.index.lock().await.len()
    }

    /// Returns true if nothing is indexed.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns cache statistics.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: self.len().await,
            capacity: self.capacity.get(),
        }
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups that found an entry.
    pub hits: u64,
    /// Number of lookups that found nothing.
    pub misses: u64,
    /// Number of entries evicted for capacity.
    pub evictions: u64,
    /// Current number of entries.
    pub size: usize,
    /// Configured capacity.
    pub capacity: usize,
}

impl CacheStats {
    /// Hit rate as a percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {}/{} previews, {:.1}% hit rate ({} hits, {} misses, {} evictions)",
            self.size,
            self.capacity,
            self.hit_rate(),
            self.hits,
            self.misses,
            self.evictions
        )
    }
}
