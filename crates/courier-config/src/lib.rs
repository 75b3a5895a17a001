//! Configuration file for Courier
//!
//! The mailer reads a single JSON file holding the default sender, the active
//! provider and one sub-object per provider. When the file is missing a
//! default one is written so it can be filled in by hand.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CONFIG_DIR_ENV: &str = "COURIER_CONFIG_DIR";

pub const MAILGUN_PROVIDER: &str = "mailgun";
pub const GMAIL_PROVIDER: &str = "gmail";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {details}")]
    InvalidConfiguration { details: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serialization(err.to_string())
    }
}

/// Mailgun API region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// api.mailgun.net
    #[default]
    #[serde(alias = "us")]
    Default,
    /// api.eu.mailgun.net
    Eu,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailgunConfig {
    pub domain: String,
    pub api_key: String,
    pub region: Region,
    /// Key for webhook signatures. Falls back to the API key when unset.
    pub webhook_signing_key: Option<String>,
}

impl MailgunConfig {
    pub fn is_configured(&self) -> bool {
        !self.domain.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailConfig {
    #[serde(default)]
    pub username: String,
    /// App password, not the account password
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
        }
    }
}

impl GmailConfig {
    pub fn is_configured(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeoutConfig {
    pub send_secs: u64,
    pub attachment_send_secs: u64,
    /// Extra seconds granted per started MiB of attachment data
    pub per_attachment_mib_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            send_secs: 30,
            attachment_send_secs: 180,
            per_attachment_mib_secs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailerConfig {
    #[serde(default)]
    pub sender: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub mailgun: MailgunConfig,
    #[serde(default)]
    pub gmail: GmailConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

fn default_provider() -> String {
    MAILGUN_PROVIDER.to_string()
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            sender: String::new(),
            provider: default_provider(),
            mailgun: MailgunConfig::default(),
            gmail: GmailConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl MailerConfig {
    /// Load `config.json` from `dir`, writing a default file first if none exists
    pub fn load_or_create(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);

        if path.exists() {
            return Self::load(&path);
        }

        fs::create_dir_all(dir)?;
        let config = Self::default();
        config.save(&path)?;

        info!("Created default mailer configuration at {}", path.display());

        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading mailer configuration from {}", path.display());

        let contents = fs::read_to_string(path)?;
        let config: MailerConfig = serde_json::from_str(&contents)?;

        if config.provider.trim().is_empty() {
            return Err(ConfigError::InvalidConfiguration {
                details: format!("'provider' is empty in {}", path.display()),
            });
        }

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Directory holding the configuration file.
///
/// `COURIER_CONFIG_DIR` wins; otherwise the platform config directory joined
/// with `courier`.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("courier"))
        .ok_or_else(|| ConfigError::InvalidConfiguration {
            details: "could not determine a configuration directory".to_string(),
        })
}
