//! The one place where a rejected session is handled.

use std::sync::Arc;

use crate::{
    errors::Result,
    session::core::SessionStore,
    views::{Navigator, Route},
};

/// Runs authenticated calls and applies the 401 policy to their results.
///
/// When a call fails with HTTP 401 the session is cleared (token and user
/// together) and, unless [`Route::Login`] is already shown, the navigator is
/// sent there, once per failed call. The error itself is handed back
/// unchanged.
///
/// Calls that are expected to fail with 401 as part of their normal
/// operation, like [`crate::api::auth::AuthClient::validate_key`] or a login
/// attempt, must be awaited directly instead.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl Dispatcher {
    /// Dispatcher clearing `session` and redirecting through `navigator`.
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }

    /// Awaits `call` and applies the 401 policy to its result.
    pub async fn run<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let result = call.await;
        if let Err(e) = &result {
            if e.is_unauthorized() {
                self.reject_session();
            }
        }
        result
    }

    /// Clears the session and redirects to the login page if needed.
    pub fn reject_session(&self) {
        if let Err(e) = self.session.clear() {
            tracing::error!(error = %e, "could not clear rejected session");
        }
        if self.navigator.current() == Route::Login {
            tracing::debug!("session rejected while on the login page");
            return;
        }
        tracing::warn!("session rejected by the server, redirecting to login");
        self.navigator.navigate(Route::Login);
    }
}
