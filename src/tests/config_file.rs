#[cfg(test)]
mod test {

    use std::io::Write;

    use serial_test::serial;

    use crate::config::settings::LogFormat;
    use crate::utils::config_loader;

    #[tokio::test]
    #[serial]
    async fn loads_yaml_file_with_env_secrets() {
        std::env::set_var("SOCIALHUB_FILE_TEST_SECRET", "s3cr3t");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
settings:
  safety_margin_seconds: 30
  default_ttl_seconds: 1200
  http_timeout_ms: 2500
  logging:
    level: debug
    format: json
  metrics:
    is_enabled: true
profiles:
  main:
    base_url: ${{SOCIALHUB_FILE_TEST_URL:https://s1.socialhub.ai/openapi-prod/}}
    app_id: app-1
    app_secret: ${{SOCIALHUB_FILE_TEST_SECRET}}
"#
        )
        .unwrap();

        let cfg = config_loader::run(file.path().to_str().unwrap()).await.unwrap();
        let main = cfg.profile("main").unwrap();
        assert_eq!(main.base_url(), "https://s1.socialhub.ai/openapi-prod");
        assert_eq!(main.app_secret, "s3cr3t");

        let resolver = cfg.settings.expiry_resolver();
        assert_eq!(resolver.safety_margin_ms(), 30_000);
        assert_eq!(cfg.settings.http_timeout().as_millis(), 2500);
        assert_eq!(cfg.settings.logging.as_ref().unwrap().format, LogFormat::Json);
        assert!(cfg.settings.metrics.is_enabled);

        std::env::remove_var("SOCIALHUB_FILE_TEST_SECRET");
    }

    #[tokio::test]
    #[serial]
    async fn unresolved_secret_fails_validation() {
        std::env::remove_var("SOCIALHUB_FILE_TEST_SECRET");

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "profiles:\n  main:\n    base_url: https://api.example.com\n    app_id: app-1\n    app_secret: ${{SOCIALHUB_FILE_TEST_SECRET}}\n"
        )
        .unwrap();

        let err = config_loader::run(file.path().to_str().unwrap()).await.unwrap_err();
        assert!(err.to_string().contains("profiles['main'].app_secret is empty"), "{err}");
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = config_loader::run("/definitely/not/here.yaml").await.unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
