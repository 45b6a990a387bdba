use std::fmt::Debug;
use std::time::Duration;

use url::Url;

use crate::errors::BuildError;

const DEFAULT_USER_AGENT: &str = concat!("edushare", "@", env!("CARGO_PKG_VERSION"),);

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone)]
#[must_use]
/// Configures an [`EduHttpClient`] before construction.
///
/// # Defaults
/// - Base URL: [`DEFAULT_BASE_URL`]
/// - HTTP request timeout: reqwest default (no global timeout) unless set via
///   [`Self::request_timeout`]
/// - User-agent: `edushare@<crate-version>` plus any [`Self::user_agent_extra`]
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// # use edushare::EduHttpClient;
/// let client = EduHttpClient::builder()
///     .base_url("https://ecole.example/api")
///     .request_timeout(Duration::from_secs(10))
///     .user_agent_extra("cartable/1.2.3")
///     .build()?;
/// # Ok::<_, edushare::BuildError>(())
/// ```
pub struct EduHttpClientBuilder {
    base_url: String,
    http_request_timeout: Option<Duration>,

    /// Optional user-agent segment appended to the default UA.
    user_agent_extra: Option<String>,
}

impl Default for EduHttpClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_request_timeout: None,
            user_agent_extra: None,
        }
    }
}

impl EduHttpClientBuilder {
    /// Root of the API, every route path is appended to it (`.../api`).
    pub fn base_url<S: Into<String>>(&mut self, url: S) -> &mut Self {
        self.base_url = url.into();
        self
    }

    /// Set HTTP requests timeout.
    pub fn request_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.http_request_timeout = Some(timeout);
        self
    }

    /// Append an extra user-agent segment after the default `edushare@<version>`.
    pub fn user_agent_extra<S: Into<String>>(&mut self, extra: S) -> &mut Self {
        self.user_agent_extra = Some(extra.into());
        self
    }

    /// Build [EduHttpClient]
    pub fn build(&self) -> Result<EduHttpClient, BuildError> {
        let base_url =
            Url::parse(&self.base_url).map_err(|e| BuildError::BaseUrl(format!("{}: {e}", self.base_url)))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(BuildError::BaseUrl(self.base_url.clone()));
        }

        // Compose user agent with optional extra part.
        let user_agent = match &self.user_agent_extra {
            Some(extra) if !extra.trim().is_empty() => {
                format!("{DEFAULT_USER_AGENT} {}", extra.trim())
            }
            _ => DEFAULT_USER_AGENT.to_string(),
        };

        let mut http_builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = self.http_request_timeout {
            http_builder = http_builder.timeout(timeout);
        }

        Ok(EduHttpClient {
            http: http_builder.build()?,
            base_url,
        })
    }
}

/// Stateless HTTP engine bound to one API root.
///
/// `EduHttpClient` knows nothing about sessions: it resolves route paths
/// against the base URL and hands out `reqwest` request builders. Bearer
/// tokens are attached one level up, by [`crate::Transport`].
///
/// Cheap to clone; clones share the connection pool.
///
/// ```no_run
/// # use edushare::EduHttpClient;
/// let client = EduHttpClient::new("http://localhost:3000/api")?;
/// assert_eq!(
///     client.url("/auth/me").unwrap().as_str(),
///     "http://localhost:3000/api/auth/me"
/// );
/// # Ok::<_, edushare::BuildError>(())
/// ```
#[derive(Clone, Debug)]
pub struct EduHttpClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
}

impl EduHttpClient {
    /// Creates a client for `base_url` with default settings.
    pub fn new<S: Into<String>>(base_url: S) -> Result<EduHttpClient, BuildError> {
        Self::builder().base_url(base_url).build()
    }

    /// Returns a builder to edit settings before creating [`EduHttpClient`].
    pub fn builder() -> EduHttpClientBuilder {
        EduHttpClientBuilder::default()
    }

    /// API root every route is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a route path such as `/collections/3` under the base URL.
    ///
    /// Unlike [`Url::join`], a leading `/` does not discard the base path.
    pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            Url::parse(base)
        } else {
            Url::parse(&format!("{base}/{path}"))
        }
    }

    /// Start building a request for an already resolved URL.
    pub fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.http.request(method, url)
    }
}
