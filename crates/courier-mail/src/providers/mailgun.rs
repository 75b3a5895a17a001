//! Mailgun HTTP API provider implementation

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use super::traits::{EmailProvider, EmailProviderType, SendEmailRequest, SendResult};
use crate::credentials::{Credentials, Region};
use crate::errors::EmailError;
use crate::webhook;

/// Mailgun provider bound to one sending domain
pub struct MailgunProvider {
    client: Client,
    domain: String,
    api_key: String,
    signing_key: String,
    api_base: String,
}

impl MailgunProvider {
    pub const API_BASE: &'static str = "https://api.mailgun.net";
    pub const API_BASE_EU: &'static str = "https://api.eu.mailgun.net";

    /// Create a provider for the domain, key and region in `credentials`
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            client: Client::new(),
            domain: credentials.domain.clone(),
            api_key: credentials.api_key.clone(),
            signing_key: credentials.api_key.clone(),
            api_base: Self::api_base_for(credentials.region).to_string(),
        }
    }

    /// Use a dedicated webhook signing key instead of the API key
    pub fn with_signing_key(mut self, signing_key: impl Into<String>) -> Self {
        self.signing_key = signing_key.into();
        self
    }

    /// Point the client at a different API base, e.g. a local test server
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base_for(region: Region) -> &'static str {
        match region {
            Region::Default => Self::API_BASE,
            Region::Eu => Self::API_BASE_EU,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn messages_url(&self) -> String {
        format!("{}/v3/{}/messages", self.api_base, self.domain)
    }

    /// Text fields of the multipart form, in the order they are sent
    fn form_fields(email: &SendEmailRequest) -> Vec<(&'static str, String)> {
        let mut fields = vec![("from", email.from.clone())];

        fields.extend(email.to.iter().map(|to| ("to", to.clone())));
        fields.push(("subject", email.subject.clone()));

        if let Some(text) = email.text.as_ref().filter(|t| !t.is_empty()) {
            fields.push(("text", text.clone()));
        }
        if let Some(html) = &email.html {
            fields.push(("html", html.clone()));
        }
        if let Some(in_reply_to) = &email.in_reply_to {
            fields.push(("h:In-Reply-To", in_reply_to.clone()));
        }
        if let Some(references) = &email.references {
            fields.push(("h:References", references.clone()));
        }

        fields
    }

    fn build_form(email: &SendEmailRequest) -> Form {
        let mut form = Form::new();

        for (name, value) in Self::form_fields(email) {
            form = form.text(name, value);
        }

        for attachment in &email.attachments {
            let part = Part::bytes(attachment.data.clone()).file_name(attachment.name.clone());
            form = form.part("attachment", part);
        }

        form
    }
}

#[derive(Debug, Deserialize)]
struct MailgunSendResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    message: String,
}

#[async_trait]
impl EmailProvider for MailgunProvider {
    async fn send(&self, email: &SendEmailRequest) -> Result<SendResult, EmailError> {
        debug!(
            "Sending email via Mailgun ({}) from: {} to {} recipient(s), {} attachment(s)",
            self.domain,
            email.from,
            email.to.len(),
            email.attachments.len()
        );

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(&self.api_key))
            .multipart(Self::build_form(email))
            .send()
            .await
            .map_err(|e| {
                EmailError::transport("mailgun", format!("Failed to send email: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Failed to send email via Mailgun ({}): {}", status, body);
            return Err(EmailError::transport(
                "mailgun",
                format!("Failed to send email ({}): {}", status, body),
            ));
        }

        let send_response: MailgunSendResponse = response.json().await.map_err(|e| {
            EmailError::transport("mailgun", format!("Failed to parse send response: {}", e))
        })?;

        debug!("Email sent successfully, message_id: {}", send_response.id);

        Ok(SendResult {
            status_message: send_response.message,
            message_id: send_response.id,
        })
    }

    fn verify_webhook_signature(
        &self,
        timestamp: &str,
        token: &str,
        signature: &str,
    ) -> Result<bool, EmailError> {
        webhook::verify(&self.signing_key, timestamp, token, signature)
    }

    fn provider_type(&self) -> EmailProviderType {
        EmailProviderType::Mailgun
    }
}
