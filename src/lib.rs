//! # SocialHub Auth Library
//!
//! Acquires, caches and refreshes the access tokens used to authenticate
//! calls against the SocialHub loyalty/CRM API.
//!
//! Modules:
//! - `config`: credentials, service settings and YAML loading
//! - `cache`: token entries and the keyed token store
//! - `parser`: token response validation and expiry resolution
//! - `sources`: token endpoint calls and the acquisition strategy
//! - `manager`: the token lifecycle manager exposed to callers
//! - `server`: optional HTTP surface serving tokens and metrics

pub mod config;
pub mod cache;
pub mod error;
pub mod sources;
pub mod parser;
pub mod manager;
pub mod observability;
pub mod server;
pub mod helpers;
pub mod utils;

#[cfg(test)]
mod tests;


pub use crate::config::credentials::CredentialSet;
pub use crate::config::types::ServiceConfig;
pub use crate::error::{AuthenticationError, TokenError};
pub use crate::manager::token_manager::TokenManager;
