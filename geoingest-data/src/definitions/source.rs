//! The [`DefinitionSource`] trait and its HTTP implementation.

use std::{rc::Rc, time::Duration};

use async_trait::async_trait;
use geoingest_core::CrsCode;
use reqwest::Client;
use url::Url;

use super::{BaseUrl, DefinitionUrl, SourceBuildError, TransportError, util::sanitise_base_url};

/// Default user agent for definition requests.
pub const DEFAULT_USER_AGENT: &str = "geoingest-proj4/0.1";

/// Definition service used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/proj4def/";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Something that can produce PROJ.4 text for a CRS code.
#[async_trait(?Send)]
pub trait DefinitionSource {
    /// Fetch the raw definition text for `code`.
    async fn fetch_definition(&self, code: &CrsCode) -> Result<String, TransportError>;
}

#[async_trait(?Send)]
impl<S: DefinitionSource + ?Sized> DefinitionSource for Rc<S> {
    async fn fetch_definition(&self, code: &CrsCode) -> Result<String, TransportError> {
        (**self).fetch_definition(code).await
    }
}

/// Configuration for [`HttpDefinitionSource`].
#[derive(Debug, Clone)]
pub struct HttpDefinitionSourceConfig {
    /// Service prefix; the CRS code is appended verbatim.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpDefinitionSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpDefinitionSourceConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches definitions with `GET {base_url}{code}`.
#[derive(Debug)]
pub struct HttpDefinitionSource {
    client: Client,
    base_url: BaseUrl,
    timeout: Duration,
}

impl HttpDefinitionSource {
    /// Create a source for `base_url` with default timeout and user agent.
    ///
    /// # Errors
    /// Returns [`SourceBuildError`] when the URL is not absolute or the HTTP
    /// client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceBuildError> {
        Self::with_config(HttpDefinitionSourceConfig::new(base_url))
    }

    /// Create a source with explicit configuration.
    ///
    /// # Errors
    /// Returns [`SourceBuildError`] when the URL is not absolute or the HTTP
    /// client cannot be built.
    pub fn with_config(config: HttpDefinitionSourceConfig) -> Result<Self, SourceBuildError> {
        let base_url = sanitise_base_url(config.base_url);
        Url::parse(&base_url).map_err(|source| SourceBuildError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url,
            timeout: config.timeout,
        })
    }

    /// Base URL the CRS code is appended to.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &DefinitionUrl) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return TransportError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        TransportError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl DefinitionSource for HttpDefinitionSource {
    async fn fetch_definition(&self, code: &CrsCode) -> Result<String, TransportError> {
        let url = self.base_url.definition_url(code);
        log::debug!("requesting projection definition from {url}");
        let body = self
            .client
            .get(url.as_ref())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        if body.trim().is_empty() {
            return Err(TransportError::EmptyBody {
                url: url.into_inner(),
            });
        }
        Ok(body)
    }
}
