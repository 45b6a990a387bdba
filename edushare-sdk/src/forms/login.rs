//! Sign-in form.

use edushare_common::validation::{require, validate_email};

use super::state::{Field, FieldKind, FormMachine, FormSpec};
use crate::{
    api::auth::{AuthClient, AuthResponse, Credentials},
    errors::{Result, ValidationError},
};

/// Values of the sign-in form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Email as typed.
    pub email: String,
    /// Password as typed.
    pub password: String,
    /// Keep the session across restarts.
    pub remember_me: bool,
}

/// What a valid sign-in form submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginValues {
    /// Trimmed email and password.
    pub credentials: Credentials,
    /// Keep the session across restarts.
    pub remember_me: bool,
}

pub(crate) fn parse_checkbox(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes" | "oui"
    )
}

impl FormSpec for LoginForm {
    type Values = LoginValues;

    const TITLE: &'static str = "Connexion";
    const SUBMIT_LABEL: &'static str = "Se connecter";

    fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("email", "Email", FieldKind::Email, &self.email),
            Field::new("password", "Mot de passe", FieldKind::Password, &self.password),
            Field::new(
                "remember_me",
                "Se souvenir de moi",
                FieldKind::Checkbox,
                &self.remember_me.to_string(),
            )
            .optional(),
        ]
    }

    fn set(&mut self, name: &str, value: &str) -> std::result::Result<(), ValidationError> {
        match name {
            "email" => self.email = value.to_string(),
            "password" => self.password = value.to_string(),
            "remember_me" => self.remember_me = parse_checkbox(value),
            other => return Err(ValidationError::field(other, "Champ inconnu")),
        }
        Ok(())
    }

    fn check(&self, name: &str) -> std::result::Result<(), ValidationError> {
        match name {
            "email" => validate_email("email", &self.email),
            "password" => require("password", &self.password, "Le mot de passe est requis"),
            _ => Ok(()),
        }
    }

    fn build(&self) -> LoginValues {
        LoginValues {
            credentials: Credentials::new(self.email.trim(), self.password.clone()),
            remember_me: self.remember_me,
        }
    }
}

impl FormMachine<LoginForm> {
    /// Submits the form through `auth`. A successful sign-in stores the
    /// session; a rejected one shows the backend message in the banner.
    ///
    /// A 401 here means wrong credentials, so the call is not dispatched
    /// through the session-rejection policy.
    pub async fn login(&mut self, auth: &AuthClient) -> Option<Result<AuthResponse>> {
        self.submit(|values| async move {
            auth.login(&values.credentials, values.remember_me).await
        })
        .await
    }
}
