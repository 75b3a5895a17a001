//! Provider credentials and the default sender

pub use courier_config::Region;

use crate::errors::EmailError;
use crate::validation::validate_email;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub domain: String,
    pub api_key: String,
    pub region: Region,
    pub default_sender: Option<String>,
}

// The API key stays out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("domain", &self.domain)
            .field("api_key", &"<redacted>")
            .field("region", &self.region)
            .field("default_sender", &self.default_sender)
            .finish()
    }
}

impl Credentials {
    /// Validate and build credentials.
    ///
    /// Domain and API key must be non-blank. A non-blank default sender must
    /// be a valid address.
    pub fn new(
        domain: &str,
        api_key: &str,
        default_sender: &str,
        region: Region,
    ) -> Result<Self, EmailError> {
        let domain = domain.trim();
        let api_key = api_key.trim();

        if domain.is_empty() || api_key.is_empty() {
            return Err(EmailError::InvalidCredentials);
        }

        Ok(Self {
            domain: domain.to_string(),
            api_key: api_key.to_string(),
            region,
            default_sender: normalize_sender(default_sender)?,
        })
    }

    pub fn is_initialized(&self) -> bool {
        !self.domain.is_empty() && !self.api_key.is_empty()
    }

    /// Replace only the default sender
    pub fn set_default_sender(&mut self, sender: &str) -> Result<(), EmailError> {
        let sender = sender.trim();
        validate_email(sender)?;
        self.default_sender = Some(sender.to_string());
        Ok(())
    }
}

fn normalize_sender(sender: &str) -> Result<Option<String>, EmailError> {
    let sender = sender.trim();
    if sender.is_empty() {
        return Ok(None);
    }
    validate_email(sender)?;
    Ok(Some(sender.to_string()))
}
