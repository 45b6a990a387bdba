//! Unified error types for the `edushare` crate.
//!
//! Every failure a caller can observe is one of:
//! - a **validation error**, raised locally before any request is built;
//! - an **API error**, the backend answered with a non-success status;
//! - a **transport error**, the backend could not be reached;
//! - an **unknown error**, anything else that went wrong around a request.
//!
//! The last three live in [`RequestError`]; [`ApiError`] is their normalized,
//! serializable view (`message`, `status`, `details`) handed to forms and
//! views for display.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use edushare_common::ValidationError;

/// Message used for every transport failure.
pub const CONNECTION_ERROR: &str = "connection error";
/// Message used for failures that are neither HTTP nor transport errors.
pub const UNKNOWN_ERROR: &str = "unknown error";

// --- Build-Time Error ---

/// Errors that can occur while building an [`crate::EduHttpClient`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to build the HTTP client (reqwest configuration).
    #[error("Failed to build the HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// The API base URL is not an absolute http(s) URL.
    #[error("Invalid API base URL: {0}")]
    BaseUrl(String),
}

// --- The Main Operational Error Enum ---

/// The crate's top-level error type.
///
/// Most lower-level errors automatically convert into this enum via `From`.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request/response failed (server status, transport, decoding).
    #[error("Request failed: {0}")]
    Request(#[from] RequestError),

    /// Input rejected locally; no request was sent.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Reading or writing the persisted session failed.
    #[error("Session storage failed: {0}")]
    Session(#[from] SessionError),

    /// URL parsing failed while preparing a request.
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] url::ParseError),

    /// Building the client failed.
    #[error("Client build failed: {0}")]
    Build(#[from] BuildError),

    /// The configuration could not be loaded.
    #[error("Configuration failed: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl Error {
    /// HTTP status of the failure, using 500 for transport and unknown errors.
    /// `None` for local failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Request(e) => Some(e.status()),
            _ => None,
        }
    }

    /// True when the backend answered 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Error::Request(RequestError::Server { status, .. }) if *status == StatusCode::UNAUTHORIZED
        )
    }

    /// Normalized view of a request failure.
    pub fn api_error(&self) -> Option<ApiError> {
        match self {
            Error::Request(e) => Some(e.into()),
            _ => None,
        }
    }

    /// Form field the error is about, if any.
    ///
    /// Local validation errors carry it directly. API errors carry it in
    /// their details, either as `field` or as the first entry of `errors`.
    pub fn field(&self) -> Option<String> {
        match self {
            Error::Validation(v) => v.field.clone(),
            Error::Request(RequestError::Server {
                details: Some(details),
                ..
            }) => field_from_details(details),
            _ => None,
        }
    }

    /// Message suitable for an error banner.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(v) => v.message.clone(),
            Error::Request(e) => e.message().to_string(),
            other => other.to_string(),
        }
    }
}

fn field_from_details(details: &Value) -> Option<String> {
    if let Some(field) = details.get("field").and_then(Value::as_str) {
        return Some(field.to_string());
    }
    details
        .get("errors")?
        .as_array()?
        .iter()
        .find_map(|e| e.get("field").and_then(Value::as_str))
        .map(str::to_string)
}

// --- Consolidated Request Error ---

/// Transport and server-side HTTP errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The server returned a non-success status.
    #[error("Server responded with an error: {status} - {message}")]
    Server {
        /// The HTTP status code returned by the server.
        status: StatusCode,
        /// `message` of the JSON error body, or the canonical reason.
        message: String,
        /// The rest of the JSON error body.
        details: Option<Value>,
    },

    /// The backend could not be reached (DNS, refused connection, timeout).
    #[error("HTTP transport error: {0}")]
    Connection(reqwest::Error),

    /// Anything else: undecodable bodies, interrupted reads, bad requests.
    #[error("Unexpected request failure: {message}")]
    Unknown {
        /// Description of the underlying failure.
        message: String,
    },
}

impl RequestError {
    /// HTTP status, 500 for anything that is not a server answer.
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::Server { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to users.
    pub fn message(&self) -> &str {
        match self {
            RequestError::Server { message, .. } => message,
            RequestError::Connection(_) => CONNECTION_ERROR,
            RequestError::Unknown { .. } => UNKNOWN_ERROR,
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            RequestError::Connection(err)
        } else {
            RequestError::Unknown {
                message: err.to_string(),
            }
        }
    }
}

/// Normalized API failure: `{ message, status, details }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    /// Human readable message.
    pub message: String,
    /// HTTP status code; 500 for transport and unknown errors.
    pub status: u16,
    /// Structured details from the error body, or the original error text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&RequestError> for ApiError {
    fn from(err: &RequestError) -> Self {
        let details = match err {
            RequestError::Server { details, .. } => details.clone(),
            RequestError::Connection(_) => None,
            RequestError::Unknown { message } => Some(Value::String(message.clone())),
        };
        ApiError {
            message: err.message().to_string(),
            status: err.status().as_u16(),
            details,
        }
    }
}

// --- Session Storage Error ---

/// Failures of the durable session storage.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The storage file could not be read or written.
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value is not valid JSON.
    #[error("Stored session is corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),

    /// Another thread panicked while holding the storage lock.
    #[error("Session storage lock poisoned")]
    Poisoned,
}

/// A specialized `Result` type for `edushare` operations.
pub type Result<T> = std::result::Result<T, Error>;

// Ergonomic "Staircase" From Implementations ---
macro_rules! impl_from_for_error {
    ($from_type:ty, $to_variant:path) => {
        impl From<$from_type> for Error {
            fn from(err: $from_type) -> Self {
                $to_variant(err.into())
            }
        }
    };
}

// Request Errors
impl_from_for_error!(reqwest::Error, Error::Request);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn server(status: u16, details: Option<Value>) -> Error {
        Error::Request(RequestError::Server {
            status: StatusCode::from_u16(status).unwrap(),
            message: "nope".into(),
            details,
        })
    }

    #[test]
    fn unauthorized_is_detected() {
        assert!(server(401, None).is_unauthorized());
        assert!(!server(403, None).is_unauthorized());
        assert!(!Error::from(ValidationError::general("x")).is_unauthorized());
    }

    #[test]
    fn field_from_api_details() {
        let e = server(400, Some(json!({ "field": "email" })));
        assert_eq!(e.field().as_deref(), Some("email"));

        let e = server(
            400,
            Some(json!({ "errors": [{ "msg": "x" }, { "field": "password" }] })),
        );
        assert_eq!(e.field().as_deref(), Some("password"));

        assert_eq!(server(409, Some(json!({ "code": 1 }))).field(), None);
    }

    #[test]
    fn normalized_view() {
        let e = server(404, Some(json!({ "id": 3 })));
        let api = e.api_error().unwrap();
        assert_eq!(api.status, 404);
        assert_eq!(api.message, "nope");
        assert_eq!(api.details, Some(json!({ "id": 3 })));

        let unknown = RequestError::Unknown {
            message: "boom".into(),
        };
        let api = ApiError::from(&unknown);
        assert_eq!(api.status, 500);
        assert_eq!(api.message, UNKNOWN_ERROR);
        assert_eq!(api.details, Some(json!("boom")));

        assert_eq!(Error::from(ValidationError::general("x")).api_error(), None);
    }
}
