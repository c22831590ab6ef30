// tests/common/mod.rs
use axum::Router;
use reqwest::Client;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::task::JoinHandle;

use crate::cache::token_cache::TokenCache;
use crate::manager::token_manager::TokenManager;
use crate::parser::expiry::ExpiryResolver;
use crate::sources::strategy::AcquisitionStrategy;

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// Base url of a port nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Manager over a fresh cache; the returned cache shares storage with it.
pub fn fresh_manager() -> (TokenManager<TokenCache>, TokenCache) {
    let cache = TokenCache::new();
    let strategy = AcquisitionStrategy::new(build_reqwest_client(), ExpiryResolver::default());
    (TokenManager::new(cache.clone(), strategy), cache)
}

/// Successful token response body.
pub fn token_body(access_token: &str, refresh_token: Option<&str>, expires_in: u64) -> Value {
    let mut data = json!({"accessToken": access_token, "expiresIn": expires_in});
    if let Some(refresh_token) = refresh_token {
        data["refreshToken"] = json!(refresh_token);
    }
    json!({"code": 200, "msg": "success", "data": data})
}
