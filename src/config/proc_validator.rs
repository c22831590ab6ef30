//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - settings: timeouts, ttl vs safety margin, metrics path
//! - profiles: non-empty, absolute http(s) base url, app id and secret present

use reqwest::Url;
use tracing::{error, info};

use crate::config::credentials::CredentialSet;
use crate::config::settings::SettingsConfig;
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);

    if cfg.profiles.is_empty() {
        errors.push("config: 'profiles' is empty; at least one profile required".to_string());
    }

    let mut names: Vec<&String> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        validate_profile(name, &cfg.profiles[name], &mut errors);
    }

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        let metrics = get_metrics().await;
        for e in &errors {
            error!("config validation: {}", e);
            metrics.config_validation_errors.inc();
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.http_timeout_ms == Some(0) {
        errors.push("settings.http_timeout_ms must be > 0".to_string());
    }
    if settings.default_ttl_seconds == Some(0) {
        errors.push("settings.default_ttl_seconds must be > 0".to_string());
    }
    if settings.safety_margin() >= settings.default_ttl() {
        errors.push(format!(
            "settings.safety_margin_seconds ({}) must be lower than default_ttl_seconds ({})",
            settings.safety_margin().as_secs(),
            settings.default_ttl().as_secs()
        ));
    }
    if settings.metrics.is_enabled && !settings.metrics.path.starts_with('/') {
        errors.push(format!("settings.metrics.path '{}' must start with '/'", settings.metrics.path));
    }
}

fn validate_profile(name: &str, creds: &CredentialSet, errors: &mut Vec<String>) {
    match Url::parse(creds.base_url()) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "profiles['{}'].base_url: unsupported scheme '{}'",
            name,
            url.scheme()
        )),
        Err(e) => errors.push(format!(
            "profiles['{}'].base_url: '{}' is not an absolute url ({})",
            name, creds.base_url, e
        )),
    }
    if creds.app_id.trim().is_empty() {
        errors.push(format!("profiles['{}'].app_id is empty", name));
    }
    if creds.app_secret.trim().is_empty() {
        errors.push(format!("profiles['{}'].app_secret is empty", name));
    }
}
