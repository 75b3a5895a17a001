//! Webhook signature verification
//!
//! Mailgun signs event callbacks with a hex HMAC-SHA256 of `timestamp + token`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::EmailError;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(signing_key: &str, timestamp: &str, token: &str) -> Result<HmacSha256, EmailError> {
    let mut mac = HmacSha256::new_from_slice(signing_key.as_bytes())
        .map_err(|e| EmailError::Configuration(format!("Invalid signing key: {}", e)))?;
    mac.update(timestamp.as_bytes());
    mac.update(token.as_bytes());
    Ok(mac)
}

/// Compute the hex signature for a webhook payload
pub fn sign(signing_key: &str, timestamp: &str, token: &str) -> Result<String, EmailError> {
    let mac = mac_for(signing_key, timestamp, token)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Compare `signature` against the expected one in constant time.
///
/// A malformed signature is a mismatch, not an error.
pub fn verify(
    signing_key: &str,
    timestamp: &str,
    token: &str,
    signature: &str,
) -> Result<bool, EmailError> {
    if signing_key.is_empty() {
        return Err(EmailError::Configuration(
            "webhook signing key is empty".to_string(),
        ));
    }

    let Ok(provided) = hex::decode(signature.trim()) else {
        return Ok(false);
    };

    let mac = mac_for(signing_key, timestamp, token)?;
    Ok(mac.verify_slice(&provided).is_ok())
}
