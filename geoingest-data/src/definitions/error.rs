//! Error types produced by definition sources.

use thiserror::Error;

/// Errors encountered while fetching a projection definition.
///
/// These never escape [`crate::ProjectionResolver::ensure_definition`]; the
/// resolver logs them and reports the code as unsupported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description supplied by the client.
        message: String,
    },
    /// The request failed before a response arrived.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// Error reported by the transport.
        message: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
        /// Timeout that elapsed, in seconds.
        timeout_secs: u64,
    },
    /// The server answered successfully but sent no definition text.
    #[error("request to {url} returned an empty definition")]
    EmptyBody {
        /// Fully qualified request URL.
        url: String,
    },
    /// The source has no definition for the requested code.
    #[error("no projection definition is known for {code}")]
    Unknown {
        /// The requested CRS code.
        code: String,
    },
}

/// Errors raised while constructing an [`super::HttpDefinitionSource`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceBuildError {
    /// The configured base URL is not an absolute URL.
    #[error("invalid definition service URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Parser diagnostic.
        source: url::ParseError,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {source}")]
    HttpClient {
        /// Underlying client error.
        #[from]
        source: reqwest::Error,
    },
}
