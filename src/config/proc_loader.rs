use std::path::Path;
use crate::config::settings::{LogFormat, LoggingConfig};
use crate::config::types::ServiceConfig;
use crate::observability::metrics::get_metrics;
use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};
use crate::config::proc_validator;

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path).await?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_validation_errors.inc();
        })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }
    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config)
        .await
        .map_err(|errors| anyhow!("invalid config:\n  - {}", errors.join("\n  - ")))?;

    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with values from the environment.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn expands_env_vars_with_defaults() {
        std::env::set_var("SOCIALHUB_TEST_APP_ID", "app-from-env");
        std::env::remove_var("SOCIALHUB_TEST_MISSING");

        let out = expand_env_vars("id: ${SOCIALHUB_TEST_APP_ID}\nurl: ${SOCIALHUB_TEST_MISSING:https://fallback}\nx: ${SOCIALHUB_TEST_MISSING}").unwrap();
        assert_eq!(out, "id: app-from-env\nurl: https://fallback\nx: ");

        std::env::remove_var("SOCIALHUB_TEST_APP_ID");
    }

    #[tokio::test]
    async fn parse_config_applies_defaults() {
        let yaml = r#"
profiles:
  main:
    base_url: https://s1.socialhub.ai/openapi-prod
    app_id: A
    app_secret: S
"#;
        let cfg = parse_config(yaml.to_owned()).await.unwrap();
        let logging = cfg.settings.logging.clone().unwrap();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Compact);
        assert_eq!(cfg.settings.safety_margin().as_secs(), 60);
        assert_eq!(cfg.settings.default_ttl().as_secs(), 3000);
        assert_eq!(cfg.settings.metrics.path, "/metrics");
        assert_eq!(cfg.profile("main").unwrap().app_id, "A");
        assert!(cfg.profile("other").is_err());
    }

    #[tokio::test]
    async fn parse_config_rejects_invalid_profiles() {
        let yaml = r#"
settings:
  safety_margin_seconds: 600
  default_ttl_seconds: 300
profiles:
  broken:
    base_url: not-a-url
    app_id: ""
"#;
        let err = parse_config(yaml.to_owned()).await.unwrap_err().to_string();
        assert!(err.contains("profiles['broken'].base_url"), "{err}");
        assert!(err.contains("profiles['broken'].app_id"), "{err}");
        assert!(err.contains("profiles['broken'].app_secret"), "{err}");
        assert!(err.contains("safety_margin_seconds"), "{err}");
    }
}
