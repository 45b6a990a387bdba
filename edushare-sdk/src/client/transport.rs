//! Session-aware request transport.
//!
//! Every API client sends through a [`Transport`]: it resolves the route,
//! attaches `Authorization: Bearer <token>` when the session holds one,
//! encodes JSON bodies, decodes JSON answers and normalizes failures into
//! [`crate::errors::Error`].

use std::path::Path;

use edushare_common::resource::validate_upload;
use reqwest::{header, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{core::EduHttpClient, query::Query};
use crate::{
    errors::{RequestError, Result, ValidationError},
    session::core::SessionStore,
    util::{check_http_status, decode_json},
};

/// Query string and JSON body of one request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query parameters; unset options are already filtered out.
    pub query: Query,
    /// JSON body, sent with `Content-Type: application/json`.
    pub body: Option<Value>,
}

impl RequestOptions {
    /// No query, no body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query string.
    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Serializes `body` as the JSON payload.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| RequestError::Unknown {
            message: format!("cannot encode request body: {e}"),
        })?;
        self.body = Some(value);
        Ok(self)
    }
}

/// A file to send as `multipart/form-data`.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Name announced to the server; its extension is checked locally.
    pub file_name: String,
    /// File content.
    pub bytes: Vec<u8>,
    /// MIME type, left to the server to guess when `None`.
    pub mime: Option<String>,
}

impl FileUpload {
    /// Upload from in-memory bytes.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            mime: None,
        }
    }

    /// Sets the MIME type.
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Reads a file from disk, checking its size before loading it.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ValidationError::field("fichier", "Nom de fichier invalide"))?
            .to_string();
        let unreadable = |e: std::io::Error| {
            ValidationError::field("fichier", format!("Fichier illisible : {e}"))
        };
        let size = tokio::fs::metadata(path).await.map_err(unreadable)?.len();
        validate_upload(&file_name, size)?;
        let bytes = tokio::fs::read(path).await.map_err(unreadable)?;
        Ok(Self::new(file_name, bytes))
    }

    /// Checks size and extension against the upload rules.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_upload(&self.file_name, self.bytes.len() as u64)
    }
}

/// HTTP client plus the session whose token it presents.
#[derive(Debug, Clone)]
pub struct Transport {
    client: EduHttpClient,
    session: SessionStore,
}

impl Transport {
    /// Binds `client` to `session`.
    pub fn new(client: EduHttpClient, session: SessionStore) -> Self {
        Self { client, session }
    }

    /// The injected session.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &EduHttpClient {
        &self.client
    }

    fn prepare(&self, method: Method, path: &str, query: &Query) -> Result<RequestBuilder> {
        let mut url = self.client.url(path)?;
        query.apply(&mut url);

        tracing::debug!(%method, %url, "sending request");
        let mut rb = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = self.session.token()? {
            rb = rb.bearer_auth(token);
        }
        Ok(rb)
    }

    async fn execute<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T> {
        let response = rb.send().await.map_err(RequestError::from)?;
        let response = check_http_status(response).await.inspect_err(|e| {
            tracing::debug!(status = ?e.status(), "request failed");
        })?;
        let body = response.bytes().await.map_err(RequestError::from)?;
        decode_json(&body)
    }

    /// Sends one JSON request and decodes the JSON answer into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let mut rb = self.prepare(method, path, &options.query)?;
        if let Some(body) = &options.body {
            rb = rb.json(body);
        }
        self.execute(rb).await
    }

    /// `GET path?query`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Query) -> Result<T> {
        self.request(Method::GET, path, RequestOptions::new().query(query))
            .await
    }

    /// `POST path` with a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, RequestOptions::new().json(body)?)
            .await
    }

    /// `PUT path` with a JSON body.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, RequestOptions::new().json(body)?)
            .await
    }

    /// `DELETE path`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::DELETE, path, RequestOptions::new())
            .await
    }

    /// `POST path` as `multipart/form-data`: the file under `file` plus the
    /// given text fields.
    ///
    /// Size and extension are checked first; a rejected file fails with a
    /// validation error and nothing is sent. No `Content-Type` is forced so
    /// that reqwest sets the multipart boundary.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        file: FileUpload,
        fields: Vec<(String, String)>,
    ) -> Result<T> {
        file.validate()?;

        let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime) = &file.mime {
            part = part.mime_str(mime).map_err(RequestError::from)?;
        }
        let mut form = reqwest::multipart::Form::new();
        for (key, value) in fields {
            form = form.text(key, value);
        }
        let form = form.part("file", part);

        let rb = self.prepare(Method::POST, path, &Query::new())?.multipart(form);
        self.execute(rb).await
    }
}
