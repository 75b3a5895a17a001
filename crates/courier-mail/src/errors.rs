//! Error types for the mailer

use std::time::Duration;
use thiserror::Error;

use courier_config::ConfigError;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Invalid credentials: domain and API key are required")]
    InvalidCredentials,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("No sender given and no default sender set")]
    NoDefaultSender,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("{provider} error: {message}")]
    Transport { provider: String, message: String },

    #[error("Send timed out after {0:?}")]
    Timeout(Duration),

    #[error("Send cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EmailError {
    pub(crate) fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        EmailError::Transport {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// True when the provider call itself failed or timed out
    pub fn is_transport(&self) -> bool {
        matches!(self, EmailError::Transport { .. } | EmailError::Timeout(_))
    }
}
