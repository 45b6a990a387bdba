//! Password policy.
//!
//! The rules here are advisory: they give immediate feedback while typing.
//! The backend performs the authoritative check.

use std::fmt::Display;

use crate::{constants::limits::PASSWORD_MIN_LEN, validation::ValidationError};

/// One rule of the password policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    /// At least [`PASSWORD_MIN_LEN`] characters.
    MinLength,
    /// At least one ASCII lowercase letter.
    Lowercase,
    /// At least one ASCII uppercase letter.
    Uppercase,
    /// At least one ASCII digit.
    Digit,
}

impl Display for PasswordRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            PasswordRule::MinLength => "Au moins 8 caractères",
            PasswordRule::Lowercase => "Au moins une minuscule",
            PasswordRule::Uppercase => "Au moins une majuscule",
            PasswordRule::Digit => "Au moins un chiffre",
        };
        f.write_str(msg)
    }
}

/// Outcome of [`validate_password`]: the rules the password breaks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PasswordCheck {
    /// Broken rules, in policy order.
    pub failed: Vec<PasswordRule>,
}

impl PasswordCheck {
    /// True when no rule is broken.
    pub fn is_valid(&self) -> bool {
        self.failed.is_empty()
    }

    /// Turns the check into a field error listing every broken rule.
    pub fn into_result(self, field: &str) -> Result<(), ValidationError> {
        if self.is_valid() {
            return Ok(());
        }
        let message = self
            .failed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Err(ValidationError::field(field, message))
    }
}

/// Checks `password` against the policy.
pub fn validate_password(password: &str) -> PasswordCheck {
    let mut failed = Vec::new();
    if password.chars().count() < PASSWORD_MIN_LEN {
        failed.push(PasswordRule::MinLength);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        failed.push(PasswordRule::Lowercase);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        failed.push(PasswordRule::Uppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        failed.push(PasswordRule::Digit);
    }
    PasswordCheck { failed }
}

/// Coarse strength grade shown next to the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    /// Breaks the policy.
    Weak,
    /// Meets the policy.
    Medium,
    /// Meets the policy, is at least 12 characters and has a symbol.
    Strong,
}

/// Grades `password`.
pub fn password_strength(password: &str) -> PasswordStrength {
    if !validate_password(password).is_valid() {
        return PasswordStrength::Weak;
    }
    let long = password.chars().count() >= 12;
    let symbol = password.chars().any(|c| !c.is_alphanumeric());
    if long && symbol {
        PasswordStrength::Strong
    } else {
        PasswordStrength::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy() {
        assert!(validate_password("Abcdefg1").is_valid());
        assert_eq!(
            validate_password("abcdefg1").failed,
            vec![PasswordRule::Uppercase]
        );
        assert_eq!(
            validate_password("ABCDEFG1").failed,
            vec![PasswordRule::Lowercase]
        );
        assert_eq!(
            validate_password("Abcdefgh").failed,
            vec![PasswordRule::Digit]
        );
        assert_eq!(
            validate_password("Abc1").failed,
            vec![PasswordRule::MinLength]
        );
        assert_eq!(validate_password("").failed.len(), 4);
    }

    #[test]
    fn every_rule_is_required() {
        let samples = [
            "Password1", "password1", "PASSWORD1", "Password", "Pass1", "Pa1aaaaa", "12345678",
            "éééééééE1", "Aa1!Aa1!",
        ];
        for pw in samples {
            let expected = pw.chars().count() >= 8
                && pw.chars().any(|c| c.is_ascii_lowercase())
                && pw.chars().any(|c| c.is_ascii_uppercase())
                && pw.chars().any(|c| c.is_ascii_digit());
            assert_eq!(validate_password(pw).is_valid(), expected, "{pw}");
        }
    }

    #[test]
    fn field_message() {
        let err = validate_password("abc").into_result("password").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("password"));
        assert!(err.message.contains("Au moins une majuscule"));
    }

    #[test]
    fn strength() {
        assert_eq!(password_strength("weak"), PasswordStrength::Weak);
        assert_eq!(password_strength("Abcdefg1"), PasswordStrength::Medium);
        assert_eq!(password_strength("Abcdefg1!xyz"), PasswordStrength::Strong);
    }
}
