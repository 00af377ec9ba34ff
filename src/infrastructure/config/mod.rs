//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub transport: TransportConfig,
    pub data: DataConfig,
    pub digest: DigestConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

/// Update-delivery strategy: periodic long-polling or a webhook callback.
/// Selected once at startup, never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    Polling,
    Webhook,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransportConfig {
    pub mode: TransportMode,
    pub token: Option<String>,
    pub poll_timeout_seconds: i64,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WebhookConfig {
    pub listen: String,
    pub port: u16,
    pub path: String,
    /// Externally reachable base URL registered with the chat platform.
    /// When unset the webhook is assumed to be registered out of band.
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DataConfig {
    pub profile: PathBuf,
    pub employees: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DigestConfig {
    pub timezone: String,
    pub window_days: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchConfig {
    pub top_k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "orgdesk-bot".to_string(),
                prefix: "/".to_string(),
            },
            transport: TransportConfig {
                mode: TransportMode::Polling,
                token: None,
                poll_timeout_seconds: 30,
                webhook: WebhookConfig {
                    listen: "0.0.0.0".to_string(),
                    port: 8080,
                    path: "/webhook".to_string(),
                    public_url: None,
                },
            },
            data: DataConfig {
                profile: PathBuf::from("data.json"),
                employees: PathBuf::from("employees.csv"),
            },
            digest: DigestConfig {
                timezone: "Europe/Moscow".to_string(),
                window_days: 7,
            },
            search: SearchConfig { top_k: 5 },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn load_env() -> Self {
        // Load from environment variables on top of defaults
        let mut config = Config::default();

        if let Ok(token) = std::env::var("BOT_TOKEN") {
            config.transport.token = Some(token);
        }
        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            config.bot.prefix = prefix;
        }
        if let Ok(tz) = std::env::var("TIMEZONE") {
            config.digest.timezone = tz;
        }
        if std::env::var("USE_WEBHOOK").as_deref() == Ok("1") {
            config.transport.mode = TransportMode::Webhook;
        }

        config
    }

    /// Resolve the configured organizational time zone, falling back to
    /// Europe/Moscow with a warning when the identifier is invalid.
    pub fn timezone(&self) -> chrono_tz::Tz {
        match self.digest.timezone.parse() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!(
                    timezone = %self.digest.timezone,
                    "invalid timezone identifier, falling back to Europe/Moscow"
                );
                chrono_tz::Europe::Moscow
            }
        }
    }
}
