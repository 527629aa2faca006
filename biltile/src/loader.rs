//! Asynchronous tile loading.
//!
//! The loader fetches a tile's raw bytes over HTTP and stores the outcome —
//! success or failure — as a terminal entry in the shared [`TileCache`].
//! Each key is fetched at most once: a key that already has a cached entry
//! (of either outcome) is never re-requested, and an explicit in-flight set
//! prevents a second concurrent fetch for a key whose first fetch has not
//! settled yet. A caller that wants to retry a failed tile must evict the
//! key (or reset the cache) first.
//!
//! The HTTP transport sits behind the [`TileFetcher`] trait so tests can
//! inject a mock client instead of hitting the network.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::cache::{TileCache, TileEntry};
use crate::error::{Result, TileError};
use crate::key::{TileCoord, TileKey};

/// Default timeout for tile requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Outcome of a [`TileLoader::load_tile`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A fetch was performed and its terminal state stored in the cache.
    Fetched,
    /// The key already had a cached entry; no network activity occurred.
    AlreadyCached,
    /// Another call is currently fetching this key; no second fetch issued.
    InFlight,
}

/// Async HTTP transport for tile bytes.
///
/// Implementations must return the full response body of a GET request, or
/// an error for transport failures and non-success HTTP statuses.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    /// Fetch the raw bytes at `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// [`TileFetcher`] backed by reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Create a fetcher with a custom request timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TileFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TileError::HttpStatus {
                key: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }
}

/// Loads elevation tiles into a shared cache, at most once per key.
pub struct TileLoader {
    cache: Arc<TileCache>,
    fetcher: Arc<dyn TileFetcher>,
    in_flight: Mutex<HashSet<TileKey>>,
}

/// Removes a key from the in-flight set when the fetch settles, success or
/// failure, including on panic unwind.
struct InFlightGuard<'a> {
    loader: &'a TileLoader,
    key: TileKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.loader.in_flight_remove(&self.key);
    }
}

impl TileLoader {
    /// Create a loader over the given cache with the default HTTP transport.
    pub fn new(cache: Arc<TileCache>) -> Result<Self> {
        Ok(Self::with_fetcher(cache, Arc::new(HttpFetcher::new()?)))
    }

    /// Create a loader with an injected transport.
    pub fn with_fetcher(cache: Arc<TileCache>, fetcher: Arc<dyn TileFetcher>) -> Self {
        Self {
            cache,
            fetcher,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// The cache this loader stores results into.
    pub fn cache(&self) -> &Arc<TileCache> {
        &self.cache
    }

    /// Fetch a tile's bytes and record the terminal outcome in the cache.
    ///
    /// Returns [`LoadOutcome::AlreadyCached`] without touching the network
    /// when the key already has an entry, and [`LoadOutcome::InFlight`] when
    /// another call is mid-fetch for the same key. Otherwise performs exactly
    /// one GET and exactly one cache insertion: a `Ready` entry on success,
    /// a `Failed` entry (plus the returned error) on failure.
    ///
    /// Loads for different keys proceed independently and in parallel; the
    /// loader imposes no concurrency cap of its own.
    pub async fn load_tile(&self, url: &str, coord: TileCoord, key: &TileKey) -> Result<LoadOutcome> {
        // Dedup check: any terminal state, success or error, short-circuits.
        // contains() leaves the entry's recency untouched.
        if self.cache.contains(key) {
            return Ok(LoadOutcome::AlreadyCached);
        }

        // Register in-flight before the first await point so a concurrent
        // call for the same key cannot issue a second fetch.
        if !self.in_flight_insert(key) {
            return Ok(LoadOutcome::InFlight);
        }
        let _guard = InFlightGuard {
            loader: self,
            key: key.clone(),
        };

        tracing::debug!(key = %key, url = url, "fetching elevation tile");

        match self.fetcher.fetch(url).await {
            Ok(data) => {
                self.cache.insert(key.clone(), TileEntry::ready(coord, data));
                Ok(LoadOutcome::Fetched)
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "elevation tile fetch failed");
                self.cache
                    .insert(key.clone(), TileEntry::failed(coord, err.to_string()));
                Err(err)
            }
        }
    }

    fn in_flight_insert(&self, key: &TileKey) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.clone())
    }

    fn in_flight_remove(&self, key: &TileKey) {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }

    /// Whether a fetch for this key is currently in flight.
    pub fn is_in_flight(&self, key: &TileKey) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TileState;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::Notify;

    /// Mock transport that counts fetches and returns a canned response.
    struct MockFetcher {
        response: std::result::Result<Vec<u8>, String>,
        calls: AtomicU64,
    }

    impl MockFetcher {
        fn ok(data: Vec<u8>) -> Self {
            Self {
                response: Ok(data),
                calls: AtomicU64::new(0),
            }
        }

        fn err(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                calls: AtomicU64::new(0),
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TileFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(data) => Ok(Bytes::from(data.clone())),
                Err(message) => Err(TileError::FetchFailed {
                    key: url.to_string(),
                    reason: message.clone(),
                }),
            }
        }
    }

    /// Transport that blocks until released, for in-flight dedup tests.
    struct BlockingFetcher {
        release: Notify,
        calls: AtomicU64,
    }

    impl BlockingFetcher {
        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TileFetcher for BlockingFetcher {
        async fn fetch(&self, _url: &str) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(Bytes::from_static(&[0x03, 0xE8]))
        }
    }

    fn key() -> TileKey {
        TileKey::new("dem", TileCoord::new(12, 42, 7))
    }

    #[tokio::test]
    async fn test_successful_load_inserts_ready_entry() {
        let cache = Arc::new(TileCache::default());
        let fetcher = Arc::new(MockFetcher::ok(vec![0x03, 0xE8]));
        let loader = TileLoader::with_fetcher(cache.clone(), fetcher.clone());

        let outcome = loader
            .load_tile("http://example.com/tile", TileCoord::new(12, 42, 7), &key())
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Fetched);
        assert_eq!(fetcher.calls(), 1);

        let entry = cache.get(&key()).unwrap();
        assert_eq!(entry.coord, TileCoord::new(12, 42, 7));
        assert_eq!(entry.state, TileState::Ready(Bytes::from_static(&[0x03, 0xE8])));
    }

    #[tokio::test]
    async fn test_second_load_is_deduplicated() {
        let cache = Arc::new(TileCache::default());
        let fetcher = Arc::new(MockFetcher::ok(vec![1, 2]));
        let loader = TileLoader::with_fetcher(cache, fetcher.clone());

        loader
            .load_tile("http://example.com/tile", TileCoord::new(12, 42, 7), &key())
            .await
            .unwrap();
        let outcome = loader
            .load_tile("http://example.com/tile", TileCoord::new(12, 42, 7), &key())
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::AlreadyCached);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_inserts_error_entry_and_rejects() {
        let cache = Arc::new(TileCache::default());
        let fetcher = Arc::new(MockFetcher::err("connection refused"));
        let loader = TileLoader::with_fetcher(cache.clone(), fetcher.clone());

        let result = loader
            .load_tile("http://example.com/tile", TileCoord::new(12, 42, 7), &key())
            .await;
        assert!(result.is_err());

        let entry = cache.get(&key()).unwrap();
        match entry.state {
            TileState::Failed(message) => assert!(message.contains("connection refused")),
            other => panic!("expected Failed state, got {:?}", other),
        }

        // The failure is terminal: no re-fetch on the next call
        let outcome = loader
            .load_tile("http://example.com/tile", TileCoord::new(12, 42, 7), &key())
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::AlreadyCached);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_loads_same_key_fetch_once() {
        let cache = Arc::new(TileCache::default());
        let fetcher = Arc::new(BlockingFetcher {
            release: Notify::new(),
            calls: AtomicU64::new(0),
        });
        let loader = Arc::new(TileLoader::with_fetcher(cache.clone(), fetcher.clone()));

        let first = tokio::spawn({
            let loader = loader.clone();
            async move {
                loader
                    .load_tile("http://example.com/tile", TileCoord::new(12, 42, 7), &key())
                    .await
            }
        });

        // Wait until the first fetch is parked inside the transport
        while fetcher.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(loader.is_in_flight(&key()));

        let outcome = loader
            .load_tile("http://example.com/tile", TileCoord::new(12, 42, 7), &key())
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::InFlight);

        fetcher.release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), LoadOutcome::Fetched);
        assert_eq!(fetcher.calls(), 1);
        assert!(!loader.is_in_flight(&key()));
        assert!(cache.contains(&key()));
    }

    #[tokio::test]
    async fn test_loads_for_different_keys_proceed_independently() {
        let cache = Arc::new(TileCache::default());
        let fetcher = Arc::new(MockFetcher::ok(vec![9, 9]));
        let loader = Arc::new(TileLoader::with_fetcher(cache.clone(), fetcher.clone()));

        let keys: Vec<TileKey> = (0..4)
            .map(|n| TileKey::new("dem", TileCoord::new(n, 0, 3)))
            .collect();

        let mut handles = Vec::new();
        for k in keys.clone() {
            let loader = loader.clone();
            handles.push(tokio::spawn(async move {
                loader.load_tile("http://example.com/tile", k.coord, &k).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), LoadOutcome::Fetched);
        }

        assert_eq!(fetcher.calls(), 4);
        for k in &keys {
            assert!(cache.contains(k));
        }
    }

    #[tokio::test]
    async fn test_retry_after_reset() {
        let cache = Arc::new(TileCache::default());
        let fetcher = Arc::new(MockFetcher::ok(vec![1]));
        let loader = TileLoader::with_fetcher(cache.clone(), fetcher.clone());

        loader
            .load_tile("http://example.com/tile", TileCoord::new(12, 42, 7), &key())
            .await
            .unwrap();
        cache.reset(None);

        let outcome = loader
            .load_tile("http://example.com/tile", TileCoord::new(12, 42, 7), &key())
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Fetched);
        assert_eq!(fetcher.calls(), 2);
    }
}
