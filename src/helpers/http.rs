use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::utils::constants::USER_AGENT;

/// Build the shared HTTP client. Every request it sends is bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}

/// Join a base url and an API path with exactly one `/` between them.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::join_url;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("https://api.example.com/", "/v1/auth/token"), "https://api.example.com/v1/auth/token");
        assert_eq!(join_url("https://api.example.com", "v1/member/1"), "https://api.example.com/v1/member/1");
        assert_eq!(join_url("https://api.example.com/openapi-prod", "/v1/x"), "https://api.example.com/openapi-prod/v1/x");
    }
}
