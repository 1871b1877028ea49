//! In-memory TTL cache for provider response bodies.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Results older than this are refetched (one quarter hour, like a delayed feed).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(900);

/// How a single call interacts with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Serve a fresh entry when present, otherwise fetch and store.
    #[default]
    Use,
    /// Always fetch, then store the new body.
    Refresh,
    /// Always fetch, never read or write.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        matches!(self, Self::Use | Self::Refresh)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    default_ttl: Duration,
    hits: u64,
}

/// Thread-safe response cache shared between scans of a `watch` session.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl CacheStore {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                default_ttl,
                hits: 0,
            })),
        }
    }

    /// Cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Cache key for an endpoint: the URL without its volatile `crumb` parameter.
    pub fn key_for(url: &str) -> String {
        let Some((base, query)) = url.split_once('?') else {
            return url.to_owned();
        };
        let kept = query
            .split('&')
            .filter(|pair| !pair.starts_with("crumb="))
            .collect::<Vec<_>>();
        if kept.is_empty() {
            base.to_owned()
        } else {
            format!("{base}?{}", kept.join("&"))
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let mut store = self.inner.write().await;
        let body = store
            .map
            .get(key)
            .filter(|entry| Instant::now() <= entry.expires_at)
            .map(|entry| entry.body.clone());
        if body.is_some() {
            store.hits = store.hits.saturating_add(1);
        }
        body
    }

    /// No-op when the cache is disabled.
    pub async fn put(&self, key: String, body: String, ttl_override: Option<Duration>) {
        let mut store = self.inner.write().await;
        if store.default_ttl == Duration::ZERO {
            return;
        }
        let ttl = ttl_override.unwrap_or(store.default_ttl);
        store.map.insert(
            key,
            CacheEntry {
                body,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub async fn clear_expired(&self) {
        let now = Instant::now();
        self.inner
            .write()
            .await
            .map
            .retain(|_, entry| entry.expires_at > now);
    }

    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    /// Entry count, expired entries included.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn hits(&self) -> u64 {
        self.inner.read().await.hits
    }

    pub async fn is_disabled(&self) -> bool {
        self.inner.read().await.default_ttl == Duration::ZERO
    }
}
