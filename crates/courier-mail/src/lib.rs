//! Transactional email for Courier
//!
//! This crate sends email through pluggable providers:
//! - Mailgun HTTP API (default and EU regions)
//! - Gmail over authenticated SMTP
//!
//! Features:
//! - Sender, recipient and Message-ID shape validation before any network call
//! - HTML or plain-text bodies, reply threading headers, in-memory attachments
//! - Bounded send timeouts and caller cancellation
//! - Mailgun webhook signature verification

pub mod client;
pub mod credentials;
pub mod dispatcher;
pub mod errors;
pub mod message;
pub mod providers;
pub mod validation;
pub mod webhook;

// Re-export main types
pub use client::{Mailer, SendOptions, TimeoutPolicy};
pub use courier_config::{MailerConfig, Region};
pub use credentials::Credentials;
pub use dispatcher::ProviderDispatcher;
pub use errors::EmailError;
pub use message::{Attachment, Message};
pub use providers::{
    EmailProvider, EmailProviderType, GmailProvider, MailgunProvider, SendEmailRequest, SendResult,
};
pub use tokio_util::sync::CancellationToken;
pub use validation::{validate_email, validate_message_id};
