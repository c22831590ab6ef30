use serde_json::Value;

use crate::error::TokenError;

/// Status code fields in priority order; the first truthy one is used.
pub const STATUS_FIELDS: [&str; 3] = ["code", "resultCode", "status"];
/// Error message fields of an API-level failure, in priority order.
pub const MESSAGE_FIELDS: [&str; 3] = ["resultMessage", "message", "msg"];
/// Error detail fields of a non-success HTTP response, in priority order.
pub const HTTP_ERROR_FIELDS: [&str; 2] = ["msg", "resultMessage"];

const SUCCESS_CODE: u16 = 200;

/// Validated token payload.
#[derive(Debug, Clone)]
pub struct TokenPayload {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// `data` section, kept for expiry resolution
    pub data: Value,
}

/// Check a token or refresh response body and extract its tokens.
///
/// The body must be non-empty, carry a success code of `200` (number or
/// string) and hold a non-empty `data.accessToken`.
pub fn validate_token_payload(body: &Value) -> Result<TokenPayload, TokenError> {
    if is_empty_payload(body) {
        return Err(TokenError::protocol(None, "API response error: empty response"));
    }

    let code = STATUS_FIELDS.iter().filter_map(|key| body.get(*key)).find(|v| is_truthy(v));
    if !code.is_some_and(is_success_code) {
        let message = first_message(body, &MESSAGE_FIELDS).unwrap_or_else(|| "Unknown error".to_owned());
        let code = code.map(render_scalar).unwrap_or_else(|| "missing".to_owned());
        return Err(TokenError::protocol(None, format!("API error {}: {}", code, message)));
    }

    let data = body.get("data").cloned().unwrap_or(Value::Null);
    let access_token = non_empty_str(&data, "accessToken")
        .ok_or_else(|| TokenError::protocol(None, "API response format error: missing accessToken"))?;
    let refresh_token = non_empty_str(&data, "refreshToken");

    Ok(TokenPayload { access_token, refresh_token, data })
}

/// First truthy string among `keys`.
pub fn first_message(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| body.get(*key))
        .filter(|v| is_truthy(v))
        .map(render_scalar)
        .next()
}

fn is_empty_payload(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn is_success_code(code: &Value) -> bool {
    match code {
        Value::Number(n) => n.as_f64() == Some(f64::from(SUCCESS_CODE)),
        Value::String(s) => s == "200",
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn non_empty_str(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
