//! Local, pre-flight validation.
//!
//! A [`ValidationError`] never reaches the network: it stops a submission
//! before any request is built.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

/// A rejected input, optionally tied to one form field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the offending field, when there is one.
    pub field: Option<String>,
    /// Human readable explanation.
    pub message: String,
}

impl ValidationError {
    /// Error about a specific field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Error about the input as a whole.
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

/// Returns true if `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Checks an email field.
pub fn validate_email(field: &str, email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::field(field, "L'email est requis"));
    }
    if !is_valid_email(email.trim()) {
        return Err(ValidationError::field(field, "Format d'email invalide"));
    }
    Ok(())
}

/// Checks that a text field is not blank, failing with `message`.
pub fn require(field: &str, value: &str, message: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::field(field, message));
    }
    Ok(())
}

/// Checks a `YYYY-MM-DD` date.
pub fn validate_date(field: &str, value: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::field(field, "Date invalide (AAAA-MM-JJ)");
    let mut parts = value.trim().split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };
    if y.len() != 4 || m.len() != 2 || d.len() != 2 {
        return Err(invalid());
    }
    let (Ok(_), Ok(m), Ok(d)) = (y.parse::<u16>(), m.parse::<u8>(), d.parse::<u8>()) else {
        return Err(invalid());
    };
    if !(1..=12).contains(&m) || !(1..=31).contains(&d) {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails() {
        assert!(is_valid_email("eleve@lycee.fr"));
        assert!(is_valid_email("a.b+c@x.y.z"));
        assert!(!is_valid_email("eleve@lycee"));
        assert!(!is_valid_email("eleve lycee@x.fr"));
        assert!(!is_valid_email("@x.fr"));

        let err = validate_email("email", "  ").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("email"));
    }

    #[test]
    fn dates() {
        assert!(validate_date("d", "2008-02-29").is_ok());
        assert!(validate_date("d", "2008-13-01").is_err());
        assert!(validate_date("d", "08-01-01").is_err());
        assert!(validate_date("d", "2008-01-01-01").is_err());
        assert!(validate_date("d", "").is_err());
    }
}
