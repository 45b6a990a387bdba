//! Registration keys.
//!
//! A key both grants signup eligibility and encodes the role the account will
//! get: `PROF_<year>_<6 alnum>` or `ELEVE_<year>_<6 alnum>`. Keys are
//! single-use, which only the backend can enforce.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{user::Role, validation::ValidationError};

static KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(PROF|ELEVE)_[0-9]{4}_[A-Z0-9]{6}$").expect("static regex"));

/// Returns true if `key` has the registration key format. Case-sensitive.
pub fn is_valid_key(key: &str) -> bool {
    KEY_RE.is_match(key)
}

/// Role encoded in the key prefix, or `None` for anything else.
///
/// Only the prefix is looked at; the rest of the key is not validated here.
pub fn role_from_key(key: &str) -> Option<Role> {
    if key.starts_with("PROF_") {
        Some(Role::Professeur)
    } else if key.starts_with("ELEVE_") {
        Some(Role::Eleve)
    } else {
        None
    }
}

/// School year encoded in a well-formed key.
pub fn key_year(key: &str) -> Option<u16> {
    if !is_valid_key(key) {
        return None;
    }
    key.split('_').nth(1)?.parse().ok()
}

/// Checks the registration key field.
pub fn validate_key(field: &str, key: &str) -> Result<Role, ValidationError> {
    if key.trim().is_empty() {
        return Err(ValidationError::field(field, "La clé d'inscription est requise"));
    }
    if !is_valid_key(key) {
        return Err(ValidationError::field(
            field,
            "Format de clé invalide (PROF_AAAA_XXXXXX ou ELEVE_AAAA_XXXXXX)",
        ));
    }
    role_from_key(key).ok_or_else(|| ValidationError::field(field, "Préfixe de clé inconnu"))
}
