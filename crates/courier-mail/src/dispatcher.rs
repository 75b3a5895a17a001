//! Routes send requests to the provider registered for a tag

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::errors::EmailError;
use crate::providers::{EmailProvider, EmailProviderType, SendEmailRequest, SendResult};

#[derive(Clone, Default)]
pub struct ProviderDispatcher {
    providers: HashMap<EmailProviderType, Arc<dyn EmailProvider>>,
}

impl std::fmt::Debug for ProviderDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDispatcher")
            .field("providers", &self.registered())
            .finish()
    }
}

impl ProviderDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under its own type, replacing any previous one
    pub fn register(&mut self, provider: Arc<dyn EmailProvider>) {
        self.providers.insert(provider.provider_type(), provider);
    }

    pub fn registered(&self) -> Vec<EmailProviderType> {
        let mut types: Vec<_> = self.providers.keys().copied().collect();
        types.sort_by_key(|t| t.to_string());
        types
    }

    /// Look up the provider for `tag`
    pub fn provider(&self, tag: &str) -> Result<Arc<dyn EmailProvider>, EmailError> {
        let provider_type = EmailProviderType::from_str(tag)?;

        self.providers
            .get(&provider_type)
            .cloned()
            .ok_or_else(|| EmailError::ProviderNotConfigured(provider_type.to_string()))
    }

    /// Send `request` through the provider for `tag`
    pub async fn dispatch(
        &self,
        tag: &str,
        request: &SendEmailRequest,
    ) -> Result<SendResult, EmailError> {
        let provider = self.provider(tag)?;
        debug!("Dispatching email to {} provider", provider.provider_type());
        provider.send(request).await
    }
}
