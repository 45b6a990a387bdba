//! `/auth`: accounts, sessions and registration keys.

use edushare_common::{key, Role, User};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{segment, Ack, Entity};
use crate::{
    client::transport::{RequestOptions, Transport},
    errors::{RequestError, Result},
    session::core::SessionStore,
};

/// Email and password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    /// Clear-text password, only ever sent over the transport.
    pub password: String,
}

impl Credentials {
    /// Builds credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Signup payload. The role is not sent: the backend derives it from the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Registration {
    /// `PROF_<year>_<6 alnum>` or `ELEVE_<year>_<6 alnum>`.
    pub registration_key: String,
    /// Login email.
    pub email: String,
    /// Clear-text password.
    pub password: String,
    /// Family name.
    pub nom: String,
    /// Given name.
    pub prenom: String,
    /// Birth date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_naissance: Option<String>,
    /// Class, for student keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classe: Option<String>,
    /// Subject, for teacher keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matiere: Option<String>,
}

/// Answer of `login` and `register`.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct AuthResponse {
    /// Bearer token, absent when the account still needs confirming.
    #[serde(default)]
    pub token: Option<String>,
    /// The signed-in user.
    #[serde(default)]
    pub user: Option<User>,
    /// Optional text from the backend.
    #[serde(default)]
    pub message: Option<String>,
}

/// Answer of `validate_key`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct KeyValidation {
    /// Whether the key can still be used.
    #[serde(default)]
    pub valid: bool,
    /// Role the account will get.
    #[serde(default)]
    pub role: Option<Role>,
    /// Optional text from the backend.
    #[serde(default)]
    pub message: Option<String>,
}

/// Editable profile fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ProfileUpdate {
    /// Family name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    /// Given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    /// Class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classe: Option<String>,
    /// Subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matiere: Option<String>,
    /// Birth date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_naissance: Option<String>,
}

/// Client of the `/auth` namespace.
///
/// Successful `login`/`register` calls store the token and user in the
/// session, which the transport then presents on every request.
#[derive(Debug, Clone)]
pub struct AuthClient {
    transport: Transport,
}

impl AuthClient {
    /// Client over `transport`.
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    fn session(&self) -> &SessionStore {
        self.transport.session()
    }

    fn persist(&self, response: &AuthResponse) -> Result<()> {
        match (&response.token, &response.user) {
            (Some(token), Some(user)) => {
                self.session().set(token, user)?;
                tracing::info!(user = %user.id, "signed in");
                Ok(())
            }
            (Some(_), None) => Err(RequestError::Unknown {
                message: "authentication response has a token but no user".into(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    /// Creates an account. When the answer carries a token the new user is
    /// signed in right away.
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        let response: AuthResponse = self.transport.post("/auth/register", registration).await?;
        self.persist(&response)?;
        Ok(response)
    }

    /// Signs in and stores the session.
    pub async fn login(&self, credentials: &Credentials, remember_me: bool) -> Result<AuthResponse> {
        let response: AuthResponse = self.transport.post("/auth/login", credentials).await?;
        self.persist(&response)?;
        self.session().set_remember_me(remember_me)?;
        Ok(response)
    }

    /// Signs out.
    ///
    /// The local session is cleared whatever happens to the request; a failed
    /// request is logged, not returned. Calling it while signed out only
    /// clears again.
    pub async fn logout(&self) -> Result<()> {
        if matches!(self.session().token(), Ok(Some(_))) {
            if let Err(e) = self.transport.post::<Ack, _>("/auth/logout", &json!({})).await {
                tracing::warn!(error = %e, "logout request failed, clearing local session anyway");
            }
        } else {
            tracing::debug!("logout without a session, nothing to tell the server");
        }
        self.session().clear()?;
        tracing::info!("signed out");
        Ok(())
    }

    /// Fetches the signed-in user and refreshes the cached copy.
    pub async fn me(&self) -> Result<User> {
        let user: User = self
            .transport
            .get::<Entity<User>>("/auth/me", Default::default())
            .await?
            .into_inner();
        self.session().update_user(&user)?;
        Ok(user)
    }

    /// Checks a registration key with the backend.
    ///
    /// The format is checked locally first. This call runs before any session
    /// exists, so its errors, including a 401, are meant to be shown as-is
    /// and must not go through the [`crate::Dispatcher`].
    pub async fn validate_key(&self, registration_key: &str) -> Result<KeyValidation> {
        let role = key::validate_key("registration_key", registration_key)?;
        let path = format!("/auth/validate-key/{}", segment(registration_key));
        let mut validation: KeyValidation = self.transport.get(&path, Default::default()).await?;
        if validation.valid && validation.role.is_none() {
            validation.role = Some(role);
        }
        Ok(validation)
    }

    /// Updates the profile and refreshes the cached user.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let user: User = self
            .transport
            .put::<Entity<User>, _>("/auth/profile", update)
            .await?
            .into_inner();
        self.session().update_user(&user)?;
        Ok(user)
    }

    /// Changes the password of the signed-in user.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<Ack> {
        self.transport
            .put(
                "/auth/password",
                &json!({
                    "current_password": current_password,
                    "new_password": new_password,
                }),
            )
            .await
    }

    /// Asks for a password reset email.
    pub async fn forgot_password(&self, email: &str) -> Result<Ack> {
        self.transport
            .post("/auth/forgot-password", &json!({ "email": email }))
            .await
    }

    /// Sets a new password with the token received by email.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<Ack> {
        self.transport
            .post(
                "/auth/reset-password",
                &json!({ "token": token, "password": new_password }),
            )
            .await
    }

    /// Confirms an email address with the token received by email.
    pub async fn verify_email(&self, token: &str) -> Result<Ack> {
        self.transport
            .post("/auth/verify-email", &json!({ "token": token }))
            .await
    }

    /// Sends the confirmation email again.
    pub async fn resend_verification(&self, email: &str) -> Result<Ack> {
        self.transport
            .post("/auth/resend-verification", &json!({ "email": email }))
            .await
    }

    /// Deletes the account, then clears the session.
    pub async fn delete_account(&self, password: &str) -> Result<Ack> {
        let ack = self
            .transport
            .request(
                Method::DELETE,
                "/auth/account",
                RequestOptions::new().json(&json!({ "password": password }))?,
            )
            .await?;
        self.session().clear()?;
        Ok(ack)
    }

    /// Stored bearer token.
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.session().token()?)
    }

    /// Cached user.
    pub fn current_user(&self) -> Result<Option<User>> {
        Ok(self.session().user()?)
    }

    /// True when a token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }
}
