use std::fmt;

use crate::helpers::time::now_ms;

/// Access token with its optional refresh token and absolute expiry.
///
/// Entries are replaced as a whole on refresh, never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenEntry {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at_ms: i64, // UNIX TIMESTAMP, milliseconds, safety margin already applied
}

impl TokenEntry {
    pub fn new(access_token: String, refresh_token: Option<String>, expires_at_ms: i64) -> Self {
        Self { access_token, refresh_token, expires_at_ms }
    }

    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms
    }

    /// Check if token can still be handed out
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_ms())
    }
}

impl fmt::Debug for TokenEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEntry")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}
