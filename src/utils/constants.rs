//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 60;
/// Token lifetime assumed when the server reports none we can use.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 50 * 60;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

pub const APPLICATION_JSON: &str = "application/json";
pub const USER_AGENT: &str = concat!("socialhub-auth/", env!("CARGO_PKG_VERSION"));

// Token endpoints, relative to the configured base url
pub const TOKEN_PATH: &str = "/v1/auth/token";
pub const REFRESH_TOKEN_PATH: &str = "/v1/auth/refreshToken";
