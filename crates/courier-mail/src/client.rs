//! Mailer client
//!
//! A `Mailer` owns its credentials, the active provider tag and the registered
//! provider adapters. They live in one snapshot behind a reader-writer lock:
//! each send clones the snapshot once, so a concurrent `initialize` never
//! tears the view of an in-flight send.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use courier_config::{MailerConfig, TimeoutConfig};

use crate::credentials::{Credentials, Region};
use crate::dispatcher::ProviderDispatcher;
use crate::errors::EmailError;
use crate::message::Message;
use crate::providers::{
    EmailProvider, EmailProviderType, GmailProvider, MailgunProvider, SendEmailRequest, SendResult,
};

const MIB: usize = 1024 * 1024;

/// How long a single provider call may take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    /// Messages without attachments
    pub send: Duration,
    /// Messages with at least one attachment
    pub attachment_send: Duration,
    /// Added per started MiB of attachment data
    pub per_attachment_mib: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}

impl From<&TimeoutConfig> for TimeoutPolicy {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            send: Duration::from_secs(config.send_secs),
            attachment_send: Duration::from_secs(config.attachment_send_secs),
            per_attachment_mib: Duration::from_secs(config.per_attachment_mib_secs),
        }
    }
}

impl TimeoutPolicy {
    pub fn timeout_for(&self, request: &SendEmailRequest) -> Duration {
        if request.attachments.is_empty() {
            return self.send;
        }

        let mib = request.attachment_bytes().div_ceil(MIB);
        let extra = self
            .per_attachment_mib
            .saturating_mul(u32::try_from(mib).unwrap_or(u32::MAX));

        self.attachment_send.saturating_add(extra)
    }
}

/// Per-call send options
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Overrides the timeout policy for this call
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
}

impl SendOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

#[derive(Debug, Clone)]
struct MailerState {
    credentials: Credentials,
    /// Overrides the API key for Mailgun webhook checks
    webhook_signing_key: Option<String>,
    provider: String,
    providers: ProviderDispatcher,
    timeouts: TimeoutPolicy,
}

impl Default for MailerState {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            webhook_signing_key: None,
            provider: EmailProviderType::Mailgun.to_string(),
            providers: ProviderDispatcher::new(),
            timeouts: TimeoutPolicy::default(),
        }
    }
}

pub struct Mailer {
    state: RwLock<Arc<MailerState>>,
}

impl Default for Mailer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailer {
    /// An uninitialized mailer. Call [`Mailer::initialize`] before sending
    /// through Mailgun.
    pub fn new() -> Self {
        Self::with_state(MailerState::default())
    }

    fn with_state(state: MailerState) -> Self {
        Self {
            state: RwLock::new(Arc::new(state)),
        }
    }

    /// Build a mailer from a loaded configuration file.
    ///
    /// Every provider with credentials is registered. The active provider
    /// must have credentials; an unrecognized provider tag is accepted here
    /// and rejected when sending.
    pub fn from_config(config: &MailerConfig) -> Result<Self, EmailError> {
        let active = EmailProviderType::from_str(&config.provider).ok();
        let mut providers = ProviderDispatcher::new();
        let webhook_signing_key = config
            .mailgun
            .webhook_signing_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        let credentials = if config.mailgun.is_configured() {
            let credentials = Credentials::new(
                &config.mailgun.domain,
                &config.mailgun.api_key,
                &config.sender,
                config.mailgun.region,
            )?;

            providers.register(mailgun_provider(&credentials, webhook_signing_key.as_deref()));

            credentials
        } else {
            if active == Some(EmailProviderType::Mailgun) {
                return Err(EmailError::InvalidCredentials);
            }

            let mut credentials = Credentials::default();
            if !config.sender.trim().is_empty() {
                credentials.set_default_sender(&config.sender)?;
            }
            credentials
        };

        if config.gmail.is_configured() {
            providers.register(Arc::new(GmailProvider::new(&config.gmail)?));
        } else if active == Some(EmailProviderType::Gmail) {
            return Err(EmailError::InvalidCredentials);
        }

        info!(
            "Mailer configured with provider '{}', registered: {:?}",
            config.provider,
            providers.registered()
        );

        Ok(Self::with_state(MailerState {
            credentials,
            webhook_signing_key,
            provider: config.provider.trim().to_string(),
            providers,
            timeouts: TimeoutPolicy::from(&config.timeouts),
        }))
    }

    /// Load (or create) `config.json` in `dir` and build a mailer from it
    pub fn from_config_dir(dir: &Path) -> Result<Self, EmailError> {
        let config = MailerConfig::load_or_create(dir)?;
        Self::from_config(&config)
    }

    async fn snapshot(&self) -> Arc<MailerState> {
        self.state.read().await.clone()
    }

    async fn update<F>(&self, f: F) -> Result<(), EmailError>
    where
        F: FnOnce(&mut MailerState) -> Result<(), EmailError>,
    {
        let mut guard = self.state.write().await;
        let mut next = MailerState::clone(&guard);
        f(&mut next)?;
        *guard = Arc::new(next);
        Ok(())
    }

    async fn modify<F>(&self, f: F)
    where
        F: FnOnce(&mut MailerState),
    {
        let mut guard = self.state.write().await;
        let mut next = MailerState::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }

    /// Set the Mailgun credentials and rebuild the Mailgun adapter.
    ///
    /// A webhook signing key loaded from configuration is kept.
    /// Fails with `InvalidCredentials` when the domain or API key is blank,
    /// or `InvalidFormat` when a non-blank default sender is malformed.
    pub async fn initialize(
        &self,
        domain: &str,
        api_key: &str,
        default_sender: &str,
        region: Region,
    ) -> Result<(), EmailError> {
        let credentials = Credentials::new(domain, api_key, default_sender, region)?;

        self.modify(|state| {
            let mailgun = mailgun_provider(&credentials, state.webhook_signing_key.as_deref());
            state.providers.register(mailgun);
            state.credentials = credentials;
        })
        .await;

        info!("Mailer initialized for Mailgun domain {} ({:?})", domain.trim(), region);
        Ok(())
    }

    pub async fn set_default_sender(&self, sender: &str) -> Result<(), EmailError> {
        self.update(|state| state.credentials.set_default_sender(sender))
            .await
    }

    /// Switch the active provider. The tag is checked when sending.
    pub async fn set_provider(&self, tag: &str) {
        let tag = tag.trim().to_string();
        self.modify(|state| state.provider = tag).await;
    }

    pub async fn register_provider(&self, provider: Arc<dyn EmailProvider>) {
        self.modify(|state| state.providers.register(provider))
            .await;
    }

    pub async fn set_timeouts(&self, timeouts: TimeoutPolicy) {
        self.modify(|state| state.timeouts = timeouts).await;
    }

    pub async fn credentials(&self) -> Credentials {
        self.snapshot().await.credentials.clone()
    }

    pub async fn provider(&self) -> String {
        self.snapshot().await.provider.clone()
    }

    /// Validate `message` and send it to `recipients` through the active provider.
    ///
    /// All validation happens before the provider is called. The provider is
    /// called at most once and its error is returned unchanged.
    pub async fn send(
        &self,
        message: &Message,
        recipients: &[String],
        options: SendOptions,
    ) -> Result<SendResult, EmailError> {
        let state = self.snapshot().await;

        let from = message.resolve_sender(state.credentials.default_sender.as_deref())?;
        let request = message.to_request(from, recipients)?;
        let timeout = options
            .timeout
            .unwrap_or_else(|| state.timeouts.timeout_for(&request));

        debug!(
            "Sending '{}' from {} via {} (timeout {:?})",
            request.subject, request.from, state.provider, timeout
        );

        let sending = tokio::time::timeout(
            timeout,
            state.providers.dispatch(&state.provider, &request),
        );

        let outcome = match &options.cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        warn!("Send of '{}' cancelled by caller", request.subject);
                        return Err(EmailError::Cancelled);
                    }
                    outcome = sending => outcome,
                }
            }
            None => sending.await,
        };

        let result = outcome.map_err(|_| {
            warn!("Send of '{}' timed out after {:?}", request.subject, timeout);
            EmailError::Timeout(timeout)
        })??;

        info!(
            "Email sent via {}, message_id: {}",
            state.provider, result.message_id
        );

        Ok(result)
    }

    /// Verify an inbound webhook with the active provider's algorithm
    pub async fn verify_webhook_signature(
        &self,
        timestamp: &str,
        token: &str,
        signature: &str,
    ) -> Result<bool, EmailError> {
        let state = self.snapshot().await;
        let provider = state.providers.provider(&state.provider)?;

        let valid = provider.verify_webhook_signature(timestamp, token, signature)?;
        if !valid {
            debug!("Webhook signature mismatch for token {}", token);
        }
        Ok(valid)
    }
}

fn mailgun_provider(
    credentials: &Credentials,
    signing_key: Option<&str>,
) -> Arc<dyn EmailProvider> {
    let mailgun = MailgunProvider::new(credentials);
    match signing_key {
        Some(key) => Arc::new(mailgun.with_signing_key(key)),
        None => Arc::new(mailgun),
    }
}
