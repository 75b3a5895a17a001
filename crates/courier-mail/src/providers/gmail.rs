//! Gmail provider over authenticated SMTP

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment as MailAttachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials as SmtpCredentials,
    AsyncSmtpTransport, AsyncTransport, Message as MailMessage, Tokio1Executor,
};
use tracing::{debug, error};
use uuid::Uuid;

use super::traits::{EmailProvider, EmailProviderType, SendEmailRequest, SendResult};
use crate::errors::EmailError;
use courier_config::GmailConfig;

/// Gmail SMTP provider. Uses an app password for authentication.
pub struct GmailProvider {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl GmailProvider {
    pub fn new(config: &GmailConfig) -> Result<Self, EmailError> {
        if !config.is_configured() {
            return Err(EmailError::InvalidCredentials);
        }

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| {
                EmailError::Configuration(format!(
                    "Invalid SMTP relay {}: {}",
                    config.smtp_host, e
                ))
            })?
            .port(config.smtp_port)
            .credentials(SmtpCredentials::new(
                config.username.trim().to_string(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { mailer })
    }

    fn gmail_error(message: impl Into<String>) -> EmailError {
        EmailError::transport("gmail", message)
    }

    /// Message-ID in the sender's domain
    fn generate_message_id(from: &str) -> String {
        let host = from.rsplit_once('@').map(|(_, d)| d).unwrap_or("localhost");
        format!("<{}@{}>", Uuid::new_v4(), host)
    }

    fn build_message(email: &SendEmailRequest, message_id: &str) -> Result<MailMessage, EmailError> {
        let from: Mailbox = email
            .from
            .parse()
            .map_err(|e| EmailError::InvalidFormat(format!("invalid sender {}: {}", email.from, e)))?;

        let mut builder = MailMessage::builder()
            .from(from)
            .subject(email.subject.clone())
            .message_id(Some(message_id.to_string()));

        for to in &email.to {
            let mailbox: Mailbox = to
                .parse()
                .map_err(|e| EmailError::InvalidFormat(format!("invalid recipient {}: {}", to, e)))?;
            builder = builder.to(mailbox);
        }

        if let Some(in_reply_to) = &email.in_reply_to {
            builder = builder.in_reply_to(in_reply_to.clone());
        }
        if let Some(references) = &email.references {
            builder = builder.references(references.clone());
        }

        let body = match &email.html {
            Some(html) => MultiPart::alternative_plain_html(
                email.text.clone().unwrap_or_default(),
                html.clone(),
            ),
            None => MultiPart::mixed()
                .singlepart(SinglePart::plain(email.text.clone().unwrap_or_default())),
        };

        let body = email.attachments.iter().fold(
            MultiPart::mixed().multipart(body),
            |parts, attachment| {
                parts.singlepart(
                    MailAttachment::new(attachment.name.clone())
                        .body(attachment.data.clone(), octet_stream()),
                )
            },
        );

        builder
            .multipart(body)
            .map_err(|e| Self::gmail_error(format!("Failed to build message: {}", e)))
    }
}

fn octet_stream() -> ContentType {
    ContentType::parse("application/octet-stream").unwrap_or(ContentType::TEXT_PLAIN)
}

#[async_trait]
impl EmailProvider for GmailProvider {
    async fn send(&self, email: &SendEmailRequest) -> Result<SendResult, EmailError> {
        debug!(
            "Sending email via Gmail from: {} to {} recipient(s)",
            email.from,
            email.to.len()
        );

        let message_id = Self::generate_message_id(&email.from);
        let message = Self::build_message(email, &message_id)?;

        let response = self.mailer.send(message).await.map_err(|e| {
            error!("Failed to send email via Gmail: {}", e);
            Self::gmail_error(format!("Failed to send email: {}", e))
        })?;

        let status_message = response.message().collect::<Vec<_>>().join(" ");

        debug!("Email sent successfully, message_id: {}", message_id);

        Ok(SendResult {
            status_message,
            message_id,
        })
    }

    fn verify_webhook_signature(
        &self,
        _timestamp: &str,
        _token: &str,
        _signature: &str,
    ) -> Result<bool, EmailError> {
        Err(EmailError::Configuration(
            "gmail does not sign webhooks".to_string(),
        ))
    }

    fn provider_type(&self) -> EmailProviderType {
        EmailProviderType::Gmail
    }
}
