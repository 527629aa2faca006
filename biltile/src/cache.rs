//! Bounded LRU cache of elevation tile state.
//!
//! The cache maps a [`TileKey`] to the terminal state of a tile load
//! (decoded bytes or a failure message). Eviction is strict least-recently-
//! used: `get` and `insert` refresh recency, `contains` does not.
//!
//! The cache is shared via `Arc` by the loader, the sampler, and every
//! elevation layer built on top of it — there is no module-level singleton.
//! Construct one at the composition root and pass it down.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use bytes::Bytes;
use lru::LruCache;

use crate::key::{TileCoord, TileKey};

/// Default cache capacity in tiles.
pub const DEFAULT_CAPACITY: usize = 100;

/// Terminal (or pre-registered) state of a tile load.
///
/// The loader only ever stores `Ready` and `Failed`. `Loading` is part of the
/// state vocabulary for producers that pre-register a tile before its fetch
/// resolves; the sampler reports it as `elevationLoading`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileState {
    /// A load for this tile has been announced but has not settled yet.
    Loading,
    /// The tile's raw BIL16 bytes.
    Ready(Bytes),
    /// The load failed; carries the originating error message.
    Failed(String),
}

/// The value stored in the cache for a tile key.
///
/// Entries are immutable after insertion; a re-fetch replaces the whole
/// entry under the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileEntry {
    /// The tile coordinates this entry was requested for.
    pub coord: TileCoord,
    /// Load state.
    pub state: TileState,
}

impl TileEntry {
    /// Create an entry holding successfully fetched tile bytes.
    pub fn ready(coord: TileCoord, data: Bytes) -> Self {
        Self {
            coord,
            state: TileState::Ready(data),
        }
    }

    /// Create an entry recording a failed load.
    pub fn failed(coord: TileCoord, message: impl Into<String>) -> Self {
        Self {
            coord,
            state: TileState::Failed(message.into()),
        }
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of tiles currently in the cache.
    pub entry_count: u64,
    /// Configured capacity in tiles.
    pub capacity: u64,
    /// Number of cache hits.
    pub hit_count: u64,
    /// Number of cache misses.
    pub miss_count: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// Bounded LRU cache of tile entries.
///
/// # Example
///
/// ```
/// use biltile::cache::{TileCache, TileEntry};
/// use biltile::key::{TileCoord, TileKey};
/// use bytes::Bytes;
///
/// let cache = TileCache::new(2);
/// let key = TileKey::new("dem", TileCoord::new(0, 0, 1));
/// cache.insert(key.clone(), TileEntry::ready(key.coord, Bytes::from_static(&[0, 1])));
/// assert!(cache.contains(&key));
/// ```
pub struct TileCache {
    inner: Mutex<LruCache<TileKey, TileEntry>>,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl TileCache {
    /// Create a cache bounded to `capacity` tiles.
    ///
    /// A zero capacity is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(Self::bound(capacity))),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        }
    }

    fn bound(capacity: usize) -> NonZeroUsize {
        NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
    }

    /// Check whether a key is present without refreshing its recency.
    pub fn contains(&self, key: &TileKey) -> bool {
        self.lock().contains(key)
    }

    /// Look up an entry, refreshing its recency on a hit.
    pub fn get(&self, key: &TileKey) -> Option<TileEntry> {
        let entry = self.lock().get(key).cloned();
        match entry {
            Some(e) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Some(e)
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or replace an entry, refreshing its recency.
    ///
    /// If the cache is at capacity, the least-recently-used entry is evicted.
    /// The entry is always replaced wholesale, never mutated in place.
    pub fn insert(&self, key: TileKey, entry: TileEntry) {
        self.lock().put(key, entry);
    }

    /// Discard all entries and optionally resize the bound.
    ///
    /// With `None`, the capacity returns to [`DEFAULT_CAPACITY`]. Hit/miss
    /// counters are reset as well.
    pub fn reset(&self, capacity: Option<usize>) {
        let mut cache = self.lock();
        cache.clear();
        cache.resize(Self::bound(capacity.unwrap_or(DEFAULT_CAPACITY)));
        self.hit_count.store(0, Ordering::Relaxed);
        self.miss_count.store(0, Ordering::Relaxed);
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity in tiles.
    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    /// Get cache usage statistics.
    pub fn stats(&self) -> CacheStats {
        let cache = self.lock();
        CacheStats {
            entry_count: cache.len() as u64,
            capacity: cache.cap().get() as u64,
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<TileKey, TileEntry>> {
        // A poisoned lock means a panic mid-mutation; the LRU map itself is
        // never left in a torn state by our single put/get calls.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
