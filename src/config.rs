//! Optional TOML configuration file

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{NotifyError, Result};
use crate::webhook::WebhookDefaults;

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// `[webhook]` table: destination URL plus per-message defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WebhookConfig {
    pub url: Option<String>,
    #[serde(flatten)]
    pub defaults: WebhookDefaults,
}

impl WebhookConfig {
    /// Overlay `overrides` on top of this config; set values in `overrides` win.
    pub fn merge(self, overrides: WebhookConfig) -> WebhookConfig {
        WebhookConfig {
            url: overrides.url.or(self.url),
            defaults: WebhookDefaults {
                channel: overrides.defaults.channel.or(self.defaults.channel),
                username: overrides.defaults.username.or(self.defaults.username),
                icon_emoji: overrides.defaults.icon_emoji.or(self.defaults.icon_emoji),
                icon_url: overrides.defaults.icon_url.or(self.defaults.icon_url),
            },
        }
    }

    /// Returns the webhook URL, failing if none was configured
    pub fn require_url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                NotifyError::Config(
                    "no webhook URL configured (use --url, SLACK_WEBHOOK or [webhook].url)"
                        .to_string(),
                )
            })
    }
}

/// Load and parse the configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<NotifyConfig> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|e| {
        NotifyError::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let config: NotifyConfig = toml::from_str(&config_str)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}
