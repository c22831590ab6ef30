//! Error taxonomy of token acquisition.

use thiserror::Error;

/// Failure of a single token request or refresh.
#[derive(Debug, Error)]
pub enum TokenError {
    /// One or more credential fields are absent. No request was sent.
    #[error("missing required authentication parameters: {0}")]
    Configuration(String),

    /// The endpoint could not be reached (connect failure, timeout, broken body stream).
    #[error("network connection failed, please check if base url is correct: {base_url}")]
    Connectivity {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a usable token.
    #[error("{message}")]
    Protocol {
        status: Option<u16>,
        message: String,
    },
}

impl TokenError {
    pub fn protocol(status: Option<u16>, message: impl Into<String>) -> Self {
        TokenError::Protocol {
            status,
            message: message.into(),
        }
    }

    /// Short label used for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Configuration(_) => "configuration",
            TokenError::Connectivity { .. } => "connectivity",
            TokenError::Protocol { .. } => "protocol",
        }
    }
}

/// Terminal error surfaced to callers when no token could be produced.
#[derive(Debug, Error)]
#[error("SocialHub authentication failed: {source}")]
pub struct AuthenticationError {
    #[from]
    source: TokenError,
}

impl AuthenticationError {
    pub fn cause(&self) -> &TokenError {
        &self.source
    }
}
