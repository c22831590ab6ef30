//! Token lifecycle manager.
//!
//! Serves a valid access token for a credential set: from the cache while it
//! is valid, otherwise through the acquisition strategy (refresh first, then
//! a new token request), writing the result back to the cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::RequestBuilder;
use tracing::{debug, error, info};

use crate::cache::token::TokenEntry;
use crate::cache::token_cache::{CacheKey, TokenCache, TokenStore};
use crate::config::credentials::CredentialSet;
use crate::error::{AuthenticationError, TokenError};
use crate::helpers::time::now_ms;
use crate::observability::metrics::get_metrics;
use crate::sources::strategy::AcquisitionStrategy;
use crate::utils::constants::{APPLICATION_JSON, USER_AGENT as USER_AGENT_VALUE};

static CACHE_HIT: &str = "hit";
static CACHE_MISS: &str = "miss";

pub struct TokenManager<S = TokenCache> {
    store: S,
    strategy: AcquisitionStrategy,
    // one acquisition at a time per key; the cache lock itself is never held across a request
    in_flight: Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl TokenManager<&'static TokenCache> {
    /// Manager backed by the process-wide cache.
    pub async fn global(strategy: AcquisitionStrategy) -> Self {
        Self::new(TokenCache::global().await, strategy)
    }
}

impl<S: TokenStore> TokenManager<S> {
    pub fn new(store: S, strategy: AcquisitionStrategy) -> Self {
        Self {
            store,
            strategy,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Valid token entry for `credentials`, acquiring one when needed.
    pub async fn token_entry(&self, credentials: &CredentialSet) -> Result<TokenEntry, AuthenticationError> {
        credentials.validate()?;
        let key = credentials.cache_key();

        if let Some(entry) = self.valid_entry(&key).await {
            return Ok(entry);
        }

        let flight = self.flight_lock(&key);
        let guard = flight.lock().await;
        let result = self.acquire_locked(credentials, &key).await;
        drop(guard);
        self.release_flight(&key, flight);
        result
    }

    async fn acquire_locked(&self, credentials: &CredentialSet, key: &CacheKey) -> Result<TokenEntry, AuthenticationError> {
        // another caller may have finished while we waited
        let current = self.store.get(key).await;
        if let Some(entry) = current.as_ref().filter(|e| e.is_valid()) {
            get_metrics().await.cache_lookups.with_label_values(&[CACHE_HIT]).inc();
            return Ok(entry.clone());
        }
        get_metrics().await.cache_lookups.with_label_values(&[CACHE_MISS]).inc();

        let refresh_token = current.as_ref().and_then(|e| e.refresh_token.as_deref());
        info!(%key, has_refresh_token = refresh_token.is_some(), "acquiring access token");

        let entry = self
            .strategy
            .acquire(credentials, refresh_token)
            .await
            .inspect_err(|err| error!(%key, reason = err.reason(), error = %err, "token acquisition failed"))?;

        self.store.put(key.clone(), entry.clone()).await;
        Ok(entry)
    }

    /// Raw access token for `credentials`.
    pub async fn access_token(&self, credentials: &CredentialSet) -> Result<String, AuthenticationError> {
        self.token_entry(credentials).await.map(|entry| entry.access_token)
    }

    /// Add the token and the JSON headers the SocialHub API expects to `request`.
    ///
    /// The token is sent as the raw `Authorization` value, without a scheme.
    /// Headers already on `request` with the same names are replaced.
    pub async fn authenticate(
        &self,
        credentials: &CredentialSet,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, AuthenticationError> {
        let token = self.access_token(credentials).await?;
        let authorization = HeaderValue::from_str(&token).map_err(|_| {
            TokenError::protocol(None, "API response format error: accessToken is not a valid header value")
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        Ok(request.headers(headers))
    }

    /// Check the credentials against the token endpoint. The cache is left untouched.
    pub async fn verify(&self, credentials: &CredentialSet) -> Result<(), AuthenticationError> {
        credentials.validate()?;
        self.strategy.acquire_fresh(credentials).await?;
        info!(app_id = %credentials.app_id, "credentials verified");
        Ok(())
    }

    async fn valid_entry(&self, key: &CacheKey) -> Option<TokenEntry> {
        let now = now_ms();
        let entry = self.store.get(key).await.filter(|e| e.is_valid_at(now))?;
        debug!(%key, expires_in_ms = entry.expires_at_ms - now, "serving cached access token");
        get_metrics().await.cache_lookups.with_label_values(&[CACHE_HIT]).inc();
        Some(entry)
    }

    fn flight_lock(&self, key: &CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.entry(key.clone()).or_default().clone()
    }

    // drop the key's lock once nobody else holds or awaits it
    fn release_flight(&self, key: &CacheKey, flight: Arc<tokio::sync::Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = in_flight
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, &flight) && Arc::strong_count(&flight) == 2);
        if idle {
            in_flight.remove(key);
        }
    }
}
