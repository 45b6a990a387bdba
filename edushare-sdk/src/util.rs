use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{Error, RequestError, Result};

/// Convert non-2xx responses into a structured error built from the JSON body.
///
/// If the status is successful (2xx), the original response is returned.
/// Otherwise the body is consumed: its `message` becomes the error message and
/// the remaining fields become `details`.
pub(crate) async fn check_http_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.bytes().await.unwrap_or_default();
    let (message, details) = parse_error_body(status, &body);

    Err(Error::from(RequestError::Server {
        status,
        message,
        details,
    }))
}

/// Splits an error body into `(message, details)`.
///
/// `message` falls back to `error`, then to a short plain-text body, then to
/// the canonical reason of `status`.
pub(crate) fn parse_error_body(status: StatusCode, body: &[u8]) -> (String, Option<Value>) {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("Unknown Error")
            .to_string()
    };

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut fields)) => {
            let message = ["message", "error"]
                .iter()
                .find_map(|key| match fields.get(*key) {
                    Some(Value::String(s)) => Some(s.clone()),
                    _ => None,
                })
                .unwrap_or_else(fallback);
            fields.remove("message");
            let details = (!fields.is_empty()).then_some(Value::Object(fields));
            (message, details)
        }
        Ok(other) if !other.is_null() => (fallback(), Some(other)),
        _ => {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            if text.is_empty() || text.len() > 200 {
                (fallback(), None)
            } else {
                (text.to_string(), None)
            }
        }
    }
}

/// Decodes a success body; an empty body decodes as JSON `null`.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| {
        Error::from(RequestError::Unknown {
            message: format!("invalid JSON response: {e}"),
        })
    })
}
