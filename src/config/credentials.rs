use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::cache::token_cache::CacheKey;
use crate::error::TokenError;

/// Application credentials for one SocialHub tenant.
///
/// Supplied by the caller on every authentication attempt. The secret is
/// redacted from `Debug` output and never logged.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct CredentialSet {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub base_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub app_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub app_secret: String,
}

// `app_secret: ${UNSET}` expands to a YAML null
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl CredentialSet {
    pub fn new(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    /// Base url without trailing slashes.
    pub fn base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.base_url(), &self.app_id)
    }

    /// Fail fast when a required field is blank, before any request is made.
    pub fn validate(&self) -> Result<(), TokenError> {
        let missing: Vec<&str> = [
            ("base_url", self.base_url()),
            ("app_id", self.app_id.as_str()),
            ("app_secret", self.app_secret.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(TokenError::Configuration(missing.join(", ")))
        }
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .field("app_secret", &"[REDACTED]")
            .finish()
    }
}
