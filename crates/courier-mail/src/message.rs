//! Outgoing message value object

use serde::{Deserialize, Serialize};

use crate::errors::EmailError;
use crate::providers::SendEmailRequest;
use crate::validation::{validate_email, validate_message_id};

/// File attached from memory. The caller reads the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// One outgoing email
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Sender address. Blank means "use the default sender".
    pub sender: String,
    pub subject: String,
    pub body: String,
    /// Send `body` as HTML instead of plain text
    pub is_html: bool,
    /// Message-ID this message replies to
    pub in_reply_to: Option<String>,
    /// Message-IDs of the thread, oldest first
    pub references: Vec<String>,
    pub attachments: Vec<Attachment>,
}

impl Message {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn html(mut self) -> Self {
        self.is_html = true;
        self
    }

    /// Mark this message as a reply within an existing thread
    pub fn reply_to(
        mut self,
        in_reply_to: impl Into<String>,
        references: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.in_reply_to = Some(in_reply_to.into());
        self.references = references.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attachment(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.attachments.push(Attachment::new(name, data));
        self
    }

    pub fn is_reply(&self) -> bool {
        self.in_reply_to.is_some() || !self.references.is_empty()
    }

    /// Pick the explicit sender, or fall back to `default_sender`.
    pub fn resolve_sender(&self, default_sender: Option<&str>) -> Result<String, EmailError> {
        let sender = self.sender.trim();

        if sender.is_empty() {
            return default_sender
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .ok_or(EmailError::NoDefaultSender);
        }

        validate_email(sender)?;
        Ok(sender.to_string())
    }

    /// Validate `In-Reply-To` and every `References` entry.
    pub fn validate_threading(&self) -> Result<(), EmailError> {
        if let Some(in_reply_to) = &self.in_reply_to {
            validate_message_id(in_reply_to)?;
        }

        for reference in &self.references {
            validate_message_id(reference)?;
        }

        Ok(())
    }

    /// Build the provider request for an already resolved sender.
    ///
    /// Recipients and threading fields are validated here; nothing is sent.
    pub fn to_request(
        &self,
        from: String,
        recipients: &[String],
    ) -> Result<SendEmailRequest, EmailError> {
        if recipients.is_empty() {
            return Err(EmailError::InvalidFormat(
                "at least one recipient is required".to_string(),
            ));
        }
        for recipient in recipients {
            validate_email(recipient.trim())?;
        }

        if self.is_reply() {
            self.validate_threading()?;
        }

        let (text, html) = if self.is_html {
            (None, Some(self.body.clone()))
        } else {
            (Some(self.body.clone()), None)
        };

        let references = if self.references.is_empty() {
            None
        } else {
            Some(self.references.join(" "))
        };

        Ok(SendEmailRequest {
            from,
            to: recipients.iter().map(|r| r.trim().to_string()).collect(),
            subject: self.subject.clone(),
            text,
            html,
            in_reply_to: self.in_reply_to.clone(),
            references,
            attachments: self.attachments.clone(),
        })
    }
}
