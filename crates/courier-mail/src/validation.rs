//! Shape checks for addresses and threading identifiers
//!
//! These are deliberately shallow: no DNS lookups and no RFC 5322 grammar.

use crate::errors::EmailError;

/// Check that `email` looks like `local@domain.tld`.
pub fn validate_email(email: &str) -> Result<(), EmailError> {
    let invalid = || EmailError::InvalidFormat(format!("invalid email: {:?}", email));

    if !email.contains('@') || !email.contains('.') {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(invalid());
    }

    // Last label after the final dot
    match labels.last() {
        Some(tld) if !tld.trim().is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Check that `id` contains the characters every `<local@host.tld>` message id has.
///
/// Order is not checked.
pub fn validate_message_id(id: &str) -> Result<(), EmailError> {
    if ['<', '>', '@', '.'].iter().all(|c| id.contains(*c)) {
        Ok(())
    } else {
        Err(EmailError::InvalidFormat(format!(
            "invalid message id/references format: {:?}",
            id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_accepts() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last@mail.example.com").is_ok());
        assert!(validate_email("user+tag@example.org").is_ok());
    }

    #[test]
    fn test_validate_email_rejects() {
        for email in [
            "", "a@b", "@b.com", "a@", "a.b.com", "a@b.", "a@b. ", "plain", "a@.",
        ] {
            assert!(
                matches!(validate_email(email), Err(EmailError::InvalidFormat(_))),
                "expected {:?} to be rejected",
                email
            );
        }
    }

    #[test]
    fn test_validate_email_requires_at_and_dot() {
        for email in ["abc", "a@bc", "a.bc", "...", "@@@"] {
            assert!(validate_email(email).is_err(), "{:?}", email);
        }
    }

    #[test]
    fn test_validate_email_splits_on_first_at() {
        // domain part "c@d.com" still has a dot-separated tail
        assert!(validate_email("a@c@d.com").is_ok());
        assert!(validate_email("a@@d.com").is_ok());
    }

    #[test]
    fn test_validate_message_id() {
        assert!(validate_message_id("<123@host.com>").is_ok());
        assert!(validate_message_id(">host.com@123<").is_ok());
        assert!(matches!(
            validate_message_id("123"),
            Err(EmailError::InvalidFormat(_))
        ));
        assert!(validate_message_id("<123@hostcom>").is_err());
        assert!(validate_message_id("123@host.com").is_err());
    }
}
