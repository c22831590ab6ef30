use reqwest::Client;
use tracing::{debug, info, warn};

use crate::cache::token::TokenEntry;
use crate::config::credentials::CredentialSet;
use crate::error::TokenError;
use crate::helpers::time::{get_instant, ms_to_rfc3339, now_ms};
use crate::observability::metrics::{get_metrics, KIND_NEW, KIND_REFRESH};
use crate::parser::expiry::ExpiryResolver;
use crate::parser::response::TokenPayload;
use crate::sources::endpoint::{refresh_access_token, request_access_token};

/// Decides between refreshing an existing token and requesting a new one.
#[derive(Debug, Clone)]
pub struct AcquisitionStrategy {
    client: Client,
    resolver: ExpiryResolver,
}

impl AcquisitionStrategy {
    pub fn new(client: Client, resolver: ExpiryResolver) -> Self {
        Self { client, resolver }
    }

    /// Refresh when a refresh token is known, otherwise (or when refresh fails)
    /// request a new token. Only new-token failures are returned.
    pub async fn acquire(
        &self,
        credentials: &CredentialSet,
        refresh_token: Option<&str>,
    ) -> Result<TokenEntry, TokenError> {
        if let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) {
            if let Some(entry) = self.try_refresh(credentials, refresh_token).await {
                return Ok(entry);
            }
        }
        self.acquire_fresh(credentials).await
    }

    /// `None` on any failure; the caller falls back to `acquire_fresh`.
    pub async fn try_refresh(&self, credentials: &CredentialSet, refresh_token: &str) -> Option<TokenEntry> {
        let result = observe(
            KIND_REFRESH,
            refresh_access_token(&self.client, credentials, refresh_token),
        )
        .await;

        match result {
            Ok(payload) => {
                let entry = self.build_entry(KIND_REFRESH, payload).await;
                info!(app_id = %credentials.app_id, expires_at = %ms_to_rfc3339(entry.expires_at_ms), "access token refreshed");
                Some(entry)
            }
            Err(err) => {
                warn!(app_id = %credentials.app_id, reason = err.reason(), error = %err, "token refresh failed, requesting a new token");
                get_metrics().await.refresh_fallbacks.inc();
                None
            }
        }
    }

    /// Full token request with application id and secret.
    pub async fn acquire_fresh(&self, credentials: &CredentialSet) -> Result<TokenEntry, TokenError> {
        credentials.validate()?;
        let payload = observe(KIND_NEW, request_access_token(&self.client, credentials)).await?;
        let entry = self.build_entry(KIND_NEW, payload).await;
        info!(app_id = %credentials.app_id, expires_at = %ms_to_rfc3339(entry.expires_at_ms), "access token issued");
        Ok(entry)
    }

    async fn build_entry(&self, kind: &str, payload: TokenPayload) -> TokenEntry {
        let expires_at_ms = self.resolver.resolve(&payload.data, now_ms());
        get_metrics().await.token_expiry_unix.with_label_values(&[kind]).set(expires_at_ms / 1000);
        TokenEntry::new(payload.access_token, payload.refresh_token, expires_at_ms)
    }
}

/// Record request count, duration and failures for one token endpoint call.
async fn observe<F>(kind: &str, call: F) -> Result<TokenPayload, TokenError>
where
    F: std::future::Future<Output = Result<TokenPayload, TokenError>>,
{
    let metrics = get_metrics().await;
    let start = get_instant();
    metrics.token_requests.with_label_values(&[kind]).inc();

    let result = call.await;
    metrics.token_request_duration.with_label_values(&[kind]).observe(start.elapsed().as_secs_f64());
    match &result {
        Ok(_) => debug!(kind, "token endpoint call succeeded"),
        Err(err) => metrics.token_failures.with_label_values(&[kind, err.reason()]).inc(),
    }
    result
}
