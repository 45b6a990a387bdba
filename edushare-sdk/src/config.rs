//! Client configuration.
//!
//! All default values live in `config.default.toml`, embedded at compile
//! time. User files are layered on top of it, then `EDUSHARE_API_URL`
//! overrides the backend URL.

use std::{
    fmt::{self, Display},
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::{
    client::core::{EduHttpClient, EduHttpClientBuilder},
    errors::BuildError,
    session::core::SessionStore,
};

/// Embedded copy of the default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("config.default.toml");

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "EDUSHARE_API_URL";

/// Error that can occur when reading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file did not exist or could not be read.
    #[error("config file not found: {0}")]
    NotFound(#[from] std::io::Error),
    /// The TOML was syntactically invalid or did not match the schema.
    #[error("config file is not valid TOML: {0}")]
    NotValid(#[from] toml::de::Error),
    /// The values parsed but cannot be used together.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// `[api]`: how to reach the backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ApiToml {
    /// Base URL including the `/api` prefix.
    pub base_url: String,
    /// Per-request timeout; 0 disables it.
    pub request_timeout_ms: u64,
    /// Extra user agent token.
    #[serde(default)]
    pub user_agent_extra: Option<String>,
}

/// Where the session is kept.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStorage {
    /// Lost on exit.
    #[default]
    Memory,
    /// JSON file at `session.path`.
    File,
}

/// `[session]`: persistence of the session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionToml {
    /// Storage kind.
    pub storage: SessionStorage,
    /// File used by [`SessionStorage::File`].
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// A `tracing` level filter read from a string such as `"debug"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLevel(pub LevelFilter);

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .map(LogLevel)
            .map_err(|_| ConfigError::Invalid(format!("invalid log level: {s}")))
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel(LevelFilter::INFO)
    }
}

/// `[logging]`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct LoggingToml {
    /// Default level of the front end's subscriber.
    pub level: LogLevel,
}

/// The whole client configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend access.
    pub api: ApiToml,
    /// Session persistence.
    pub session: SessionToml,
    /// Logging defaults.
    pub logging: LoggingToml,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::from_str(DEFAULT_CONFIG).expect("embedded config.default.toml must be valid")
    }
}

impl FromStr for ClientConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

/// Overlays `user` on `base`: tables merge key by key, anything else is
/// replaced.
fn merge(base: toml::Value, user: toml::Value) -> toml::Value {
    match (base, user) {
        (toml::Value::Table(mut base), toml::Value::Table(user)) => {
            for (key, value) in user {
                let merged = match base.remove(&key) {
                    Some(existing) => merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            toml::Value::Table(base)
        }
        (_, user) => user,
    }
}

impl ClientConfig {
    /// Reads a file and overlays it on the embedded defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_str_with_defaults(&raw)
    }

    /// Parses TOML and overlays it on the embedded defaults.
    pub fn from_str_with_defaults(raw: &str) -> Result<Self, ConfigError> {
        let defaults: toml::Value = DEFAULT_CONFIG.parse()?;
        let user: toml::Value = raw.parse()?;
        let config: ClientConfig = merge(defaults, user).try_into()?;
        config.check()?;
        Ok(config)
    }

    /// Applies the `EDUSHARE_API_URL` override from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`, so tests need not touch the
    /// process environment.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            tracing::debug!(%url, "api.base_url overridden from {API_URL_ENV}");
            self.api.base_url = url;
        }
        self
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.session.storage == SessionStorage::File && self.session.path.is_none() {
            return Err(ConfigError::Invalid(
                "session.storage = \"file\" needs session.path".into(),
            ));
        }
        Ok(())
    }

    /// Builder preloaded with the `[api]` section.
    pub fn http_builder(&self) -> EduHttpClientBuilder {
        let mut builder = EduHttpClient::builder();
        builder.base_url(self.api.base_url.clone());
        if self.api.request_timeout_ms > 0 {
            builder.request_timeout(Duration::from_millis(self.api.request_timeout_ms));
        }
        if let Some(extra) = &self.api.user_agent_extra {
            builder.user_agent_extra(extra.clone());
        }
        builder
    }

    /// HTTP client for the `[api]` section.
    pub fn http_client(&self) -> Result<EduHttpClient, BuildError> {
        self.http_builder().build()
    }

    /// Session store for the `[session]` section.
    pub fn session_store(&self) -> Result<SessionStore, ConfigError> {
        self.check()?;
        Ok(match (&self.session.storage, &self.session.path) {
            (SessionStorage::File, Some(path)) => SessionStore::file(path.clone()),
            _ => SessionStore::in_memory(),
        })
    }
}
