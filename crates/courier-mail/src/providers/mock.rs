//! Mock email provider for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::EmailError;
use crate::providers::{EmailProvider, EmailProviderType, SendEmailRequest, SendResult};
use crate::webhook;

/// Mock email provider for testing
#[derive(Debug, Clone)]
pub struct MockEmailProvider {
    /// Counter for tracking calls
    pub send_count: Arc<AtomicUsize>,
    /// Every request the provider observed, in order
    pub requests: Arc<Mutex<Vec<SendEmailRequest>>>,

    /// Configurable responses
    pub should_fail_send: bool,
    pub delay: Option<Duration>,
    pub provider_type: EmailProviderType,
    pub signing_key: String,
}

impl Default for MockEmailProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmailProvider {
    pub fn new() -> Self {
        Self {
            send_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            should_fail_send: false,
            delay: None,
            provider_type: EmailProviderType::Mailgun,
            signing_key: "mock-signing-key".to_string(),
        }
    }

    pub fn with_send_failure(mut self) -> Self {
        self.should_fail_send = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_provider_type(mut self, provider_type: EmailProviderType) -> Self {
        self.provider_type = provider_type;
        self
    }

    pub fn send_call_count(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SendEmailRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &SendEmailRequest) -> Result<SendResult, EmailError> {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(email.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail_send {
            return Err(EmailError::transport(
                self.provider_type.to_string(),
                "Mock send failure",
            ));
        }

        Ok(SendResult {
            status_message: "Queued. Thank you.".to_string(),
            message_id: format!("<mock-message-{}@mock.example.com>", uuid::Uuid::new_v4()),
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
        self.provider_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SendEmailRequest {
        SendEmailRequest {
            from: "sender@example.com".to_string(),
            to: vec!["recipient@example.com".to_string()],
            subject: "Test".to_string(),
            text: None,
            html: Some("<p>Test</p>".to_string()),
            in_reply_to: None,
            references: None,
            attachments: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_mock_provider_send_email() {
        let provider = MockEmailProvider::new();

        let response = provider.send(&request()).await.unwrap();

        assert!(response.message_id.starts_with("<mock-message-"));
        assert_eq!(response.status_message, "Queued. Thank you.");
        assert_eq!(provider.send_call_count(), 1);
        assert_eq!(provider.last_request().unwrap(), request());
    }

    #[tokio::test]
    async fn test_mock_provider_send_failure() {
        let provider = MockEmailProvider::new().with_send_failure();

        let result = provider.send(&request()).await;

        assert!(matches!(result, Err(ref e) if e.is_transport()));
        assert_eq!(provider.send_call_count(), 1);
    }

    #[test]
    fn test_mock_provider_type() {
        let provider = MockEmailProvider::new().with_provider_type(EmailProviderType::Gmail);
        assert_eq!(provider.provider_type(), EmailProviderType::Gmail);
    }
}
