//! GroupBot configuration system.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GroupBotError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot application id used as the sender identity on outgoing messages.
    #[serde(default)]
    pub app_id: String,
    /// Directory tenant the bot operates in.
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    /// Cron expression driving the reminder sweep (UTC).
    #[serde(default = "default_notification_cron")]
    pub notification_cron: String,
    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_graph_base_url() -> String {
    "https://graph.microsoft.com".into()
}

fn default_notification_cron() -> String {
    "0 10,17 * * *".into()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            tenant_id: String::new(),
            graph_base_url: default_graph_base_url(),
            notification_cron: default_notification_cron(),
            retry: RetrySettings::default(),
        }
    }
}

impl BotConfig {
    /// Load config from the default path (~/.groupbot/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GroupBotError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| GroupBotError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| GroupBotError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".groupbot")
            .join("config.toml")
    }
}

/// Retry budget for transient external calls (notification posts and sweep
/// deliveries; channel creation itself is never retried).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    2
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}
