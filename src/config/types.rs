use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::credentials::CredentialSet;
use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    /// named credential sets, e.g. one per SocialHub tenant
    pub profiles: HashMap<String, CredentialSet>,
}

impl ServiceConfig {
    pub fn profile(&self, name: &str) -> Result<&CredentialSet> {
        self.profiles.get(name).ok_or_else(|| {
            let mut known: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
            known.sort_unstable();
            anyhow!("unknown profile '{}', configured profiles: [{}]", name, known.join(", "))
        })
    }
}
