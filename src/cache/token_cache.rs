use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tracing::info;

use crate::cache::token::TokenEntry;

/// Cache key: endpoint base url + application id.
///
/// Both parts are stored separately and compared field by field, so no choice
/// of base url or app id can make two tenants share a key. `Display` joins
/// them with `::` for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    base_url: String,
    app_id: String,
}

impl CacheKey {
    pub fn new(base_url: &str, app_id: &str) -> Self {
        Self { base_url: base_url.to_owned(), app_id: app_id.to_owned() }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.base_url, self.app_id)
    }
}

/// Keyed token store. `put` replaces any prior entry for the key; last writer wins.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> impl Future<Output = Option<TokenEntry>> + Send;

    fn put(&self, key: CacheKey, entry: TokenEntry) -> impl Future<Output = ()> + Send;
}

/// In-memory token store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<HashMap<CacheKey, TokenEntry>>>
}

// Lives as long as the hosting process; nothing is persisted.
static TOKEN_CACHE_INSTANCE: OnceCell<TokenCache> = OnceCell::const_new();

impl TokenCache {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Process-wide cache shared by every manager built with `TokenManager::global`.
    pub async fn global() -> &'static TokenCache {
        TOKEN_CACHE_INSTANCE.get_or_init(|| async {
            info!("Initializing static TokenCache ...");
            TokenCache::new()
        }).await
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl TokenStore for TokenCache {
    /// Returns the stored entry, expired or not; validity is the caller's decision.
    async fn get(&self, key: &CacheKey) -> Option<TokenEntry> {
        self.inner.read().await.get(key).cloned()
    }

    async fn put(&self, key: CacheKey, entry: TokenEntry) {
        self.inner.write().await.insert(key, entry);
    }
}

impl<S: TokenStore + ?Sized> TokenStore for &S {
    async fn get(&self, key: &CacheKey) -> Option<TokenEntry> {
        (**self).get(key).await
    }

    async fn put(&self, key: CacheKey, entry: TokenEntry) {
        (**self).put(key, entry).await
    }
}
