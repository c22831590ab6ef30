use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use serde_json::json;
use tracing::{info, warn};

use crate::cache::token_cache::TokenCache;
use crate::config::credentials::CredentialSet;
use crate::config::settings::SettingsConfig;
use crate::helpers::time::ms_to_rfc3339;
use crate::manager::token_manager::TokenManager;
use crate::observability::metrics::get_metrics;
use crate::observability::routes::MetricsState;

pub type SharedManager = Arc<TokenManager<&'static TokenCache>>;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub token_state: TokenState,
}

/// Profiles served over HTTP and the manager that holds their tokens.
#[derive(Clone)]
pub struct TokenState {
    manager: SharedManager,
    profiles: Arc<HashMap<String, CredentialSet>>,
}

impl TokenState {
    pub fn new(manager: SharedManager, profiles: HashMap<String, CredentialSet>) -> Self {
        Self { manager, profiles: Arc::new(profiles) }
    }

    pub fn router(&self) -> Router<AppState> {
        Router::new().route("/token/{profile}", get(get_token))
    }
}

/// Current token for a configured profile, acquiring or refreshing it as needed.
async fn get_token(State(state): State<AppState>, Path(profile): Path<String>) -> Response {
    let token_state = &state.token_state;
    let Some(credentials) = token_state.profiles.get(&profile) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("unknown profile '{}'", profile)})),
        )
            .into_response();
    };

    match token_state.manager.token_entry(credentials).await {
        Ok(entry) => Json(json!({
            "profile": profile,
            "accessToken": entry.access_token,
            "expiresAt": entry.expires_at_ms,
            "expiresAtRfc3339": ms_to_rfc3339(entry.expires_at_ms),
        }))
        .into_response(),
        Err(e) => {
            warn!(%profile, "token request failed: {}", e);
            (StatusCode::BAD_GATEWAY, Json(json!({"error": e.to_string()}))).into_response()
        }
    }
}

pub async fn router(settings_config: &SettingsConfig, token_state: TokenState) -> Router {
    let metrics = get_metrics().await;
    let state = AppState {
        metrics_state: MetricsState::new(metrics.registry.clone()),
        token_state,
    };

    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .merge(state.token_state.router())
        .with_state(state)
}

/// Serve token and metrics routes until the process is stopped.
pub async fn start(settings_config: &SettingsConfig, token_state: TokenState) -> Result<()> {
    let app = router(settings_config, token_state).await;

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("serving tokens on {}", bind_addr);

    get_metrics().await.up.set(1);
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
