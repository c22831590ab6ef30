//! Calls to the SocialHub token endpoints.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::config::credentials::CredentialSet;
use crate::error::TokenError;
use crate::helpers::http::join_url;
use crate::parser::response::{first_message, validate_token_payload, TokenPayload, HTTP_ERROR_FIELDS};
use crate::utils::constants::{APPLICATION_JSON, REFRESH_TOKEN_PATH, TOKEN_PATH};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewTokenRequest<'a> {
    app_id: &'a str,
    app_secret: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenRequest<'a> {
    refresh_token: &'a str,
}

/// `POST {base}/v1/auth/token` with the application id and secret.
pub async fn request_access_token(
    client: &Client,
    credentials: &CredentialSet,
) -> Result<TokenPayload, TokenError> {
    let request = client
        .post(join_url(credentials.base_url(), TOKEN_PATH))
        .header(CONTENT_TYPE, APPLICATION_JSON)
        .header(ACCEPT, APPLICATION_JSON)
        .json(&NewTokenRequest {
            app_id: &credentials.app_id,
            app_secret: &credentials.app_secret,
        });

    send_token_request(request, credentials.base_url()).await
}

/// `POST {base}/v1/auth/refreshToken`; the refresh token travels in both the
/// body and the `Authorization` header.
pub async fn refresh_access_token(
    client: &Client,
    credentials: &CredentialSet,
    refresh_token: &str,
) -> Result<TokenPayload, TokenError> {
    let request = client
        .post(join_url(credentials.base_url(), REFRESH_TOKEN_PATH))
        .header(CONTENT_TYPE, APPLICATION_JSON)
        .header(ACCEPT, APPLICATION_JSON)
        .header(AUTHORIZATION, refresh_token)
        .json(&RefreshTokenRequest { refresh_token });

    send_token_request(request, credentials.base_url()).await
}

async fn send_token_request(request: RequestBuilder, base_url: &str) -> Result<TokenPayload, TokenError> {
    let connectivity = |source: reqwest::Error| TokenError::Connectivity {
        base_url: base_url.to_owned(),
        source,
    };

    let response = request.send().await.map_err(connectivity)?;
    let status = response.status();

    if !status.is_success() {
        // error bodies are best effort
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let detail = first_message(&body, &HTTP_ERROR_FIELDS)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown status").to_owned());
        return Err(TokenError::protocol(
            Some(status.as_u16()),
            format!("HTTP {}: {}", status.as_u16(), detail),
        ));
    }

    let body: Value = response.json().await.map_err(|e| {
        if e.is_decode() {
            TokenError::protocol(Some(status.as_u16()), format!("API response format error: {}", e))
        } else {
            connectivity(e)
        }
    })?;

    validate_token_payload(&body)
}
