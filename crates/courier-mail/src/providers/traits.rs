//! Email provider trait definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::EmailError;
use crate::message::Attachment;

/// Supported email provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProviderType {
    /// Mailgun HTTP API
    Mailgun,
    /// Gmail SMTP relay
    Gmail,
}

impl std::fmt::Display for EmailProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailProviderType::Mailgun => write!(f, "mailgun"),
            EmailProviderType::Gmail => write!(f, "gmail"),
        }
    }
}

impl EmailProviderType {
    pub fn from_str(s: &str) -> Result<Self, EmailError> {
        match s.trim().to_lowercase().as_str() {
            "mailgun" | "mg" => Ok(EmailProviderType::Mailgun),
            "gmail" | "google" => Ok(EmailProviderType::Gmail),
            _ => Err(EmailError::UnknownProvider(s.to_string())),
        }
    }
}

/// Request handed to a provider, already validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendEmailRequest {
    /// Resolved sender address
    pub from: String,
    /// Recipient email addresses
    pub to: Vec<String>,
    pub subject: String,
    /// Plain text body
    pub text: Option<String>,
    /// HTML body
    pub html: Option<String>,
    /// `In-Reply-To` header value
    pub in_reply_to: Option<String>,
    /// `References` header value, space-joined
    pub references: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl SendEmailRequest {
    pub fn attachment_bytes(&self) -> usize {
        self.attachments.iter().map(|a| a.data.len()).sum()
    }
}

/// Normalized provider response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    /// Human readable status from the provider, e.g. "Queued. Thank you."
    pub status_message: String,
    /// Provider's message ID
    pub message_id: String,
}

/// Email provider trait for abstracting different email services
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send an email
    async fn send(&self, email: &SendEmailRequest) -> Result<SendResult, EmailError>;

    /// Check an inbound webhook signature.
    ///
    /// `Ok(false)` means the signature does not match.
    fn verify_webhook_signature(
        &self,
        timestamp: &str,
        token: &str,
        signature: &str,
    ) -> Result<bool, EmailError>;

    /// Get the provider type
    fn provider_type(&self) -> EmailProviderType;
}
