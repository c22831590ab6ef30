use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;
use socialhub_auth::helpers::http::{build_client, join_url};
use socialhub_auth::helpers::time::ms_to_rfc3339;
use socialhub_auth::manager::token_manager::TokenManager;
use socialhub_auth::server::server::{self, TokenState};
use socialhub_auth::sources::strategy::AcquisitionStrategy;
use socialhub_auth::utils::config_loader;
use socialhub_auth::utils::logging::{self, LogLevel};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "socialhub-auth.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a valid access token for a profile
    Token {
        #[arg(short, long, default_value = "main")]
        profile: String,
        /// print the expiry next to the token
        #[arg(long)]
        with_expiry: bool,
    },
    /// Check a profile's credentials against the token endpoint
    Verify {
        #[arg(short, long, default_value = "main")]
        profile: String,
    },
    /// Send an authenticated request to the SocialHub API and print the response
    Call {
        #[arg(short, long, default_value = "main")]
        profile: String,
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// API path relative to the profile base url, e.g. /v1/member/loyaltyprograms
        path: String,
        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },
    /// Serve tokens and metrics over HTTP
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(Some(&service_config), args.log_level);

    // -------------------------------
    // 2. Create request client and token manager
    // -------------------------------

    let settings = &service_config.settings;
    let client = build_client(settings.http_timeout())?;
    let strategy = AcquisitionStrategy::new(client.clone(), settings.expiry_resolver());
    let manager = TokenManager::global(strategy).await;

    // -------------------------------
    // 3. Run command
    // -------------------------------

    match args.command {
        Command::Token { profile, with_expiry } => {
            let credentials = service_config.profile(&profile)?;
            let entry = manager.token_entry(credentials).await?;
            if with_expiry {
                println!("{}\t{}", entry.access_token, ms_to_rfc3339(entry.expires_at_ms));
            } else {
                println!("{}", entry.access_token);
            }
        }
        Command::Verify { profile } => {
            let credentials = service_config.profile(&profile)?;
            manager.verify(credentials).await?;
            println!("SocialHub API authentication successful");
        }
        Command::Call { profile, method, path, body } => {
            let credentials = service_config.profile(&profile)?;
            let method = Method::from_bytes(method.to_uppercase().as_bytes())
                .map_err(|_| anyhow!("invalid HTTP method '{}'", method))?;

            let mut request = client.request(method, join_url(credentials.base_url(), &path));
            if let Some(body) = body {
                let body: Value = serde_json::from_str(&body).context("--body is not valid JSON")?;
                request = request.json(&body);
            }

            let response = manager
                .authenticate(credentials, request)
                .await?
                .send()
                .await
                .with_context(|| format!("request to {} failed", path))?;

            let status = response.status();
            let text = response.text().await?;
            match serde_json::from_str::<Value>(&text) {
                Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
                Err(_) => println!("{}", text),
            }
            if !status.is_success() {
                return Err(anyhow!("SocialHub API returned {}", status));
            }
        }
        Command::Serve => {
            let token_state = TokenState::new(Arc::new(manager), service_config.profiles.clone());
            info!("Service starting...");
            server::start(settings, token_state).await?;
        }
    }

    Ok(())
}
