//! Test utilities for definition sources.
//!
//! [`StubDefinitionSource`] answers from an in-memory table and counts the
//! requests it receives, so tests can assert whether the cache was consulted.

use std::{cell::Cell, collections::HashMap, future::Future};

use async_trait::async_trait;
use geoingest_core::CrsCode;

use super::{DefinitionSource, TransportError};

/// PROJ.4 text for spherical Web Mercator (`EPSG:3857`).
pub const WEB_MERCATOR: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +wktext +no_defs";

/// PROJ.4 text for UTM zone 33 north on WGS 84 (`EPSG:32633`).
pub const UTM_33N: &str = "+proj=utm +zone=33 +datum=WGS84 +units=m +no_defs";

/// In-memory [`DefinitionSource`] returning canned responses.
///
/// # Example
///
/// ```
/// use geoingest_core::CrsCode;
/// use geoingest_data::definitions::DefinitionSource;
/// use geoingest_data::definitions::test_support::{StubDefinitionSource, WEB_MERCATOR, block_on_for_tests};
///
/// let stub = StubDefinitionSource::new().with_definition(CrsCode::epsg(3857), WEB_MERCATOR);
/// let text = block_on_for_tests(stub.fetch_definition(&CrsCode::epsg(3857))).expect("known code");
/// assert_eq!(text, WEB_MERCATOR);
/// assert_eq!(stub.requests(), 1);
/// ```
#[derive(Debug, Default)]
pub struct StubDefinitionSource {
    responses: HashMap<CrsCode, Result<String, TransportError>>,
    requests: Cell<usize>,
}

impl StubDefinitionSource {
    /// Create a stub that knows no codes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `code` with `text`.
    #[must_use]
    pub fn with_definition(mut self, code: CrsCode, text: impl Into<String>) -> Self {
        self.responses.insert(code, Ok(text.into()));
        self
    }

    /// Fail requests for `code` with `error`.
    #[must_use]
    pub fn with_error(mut self, code: CrsCode, error: TransportError) -> Self {
        self.responses.insert(code, Err(error));
        self
    }

    /// Number of fetches served so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

#[async_trait(?Send)]
impl DefinitionSource for StubDefinitionSource {
    async fn fetch_definition(&self, code: &CrsCode) -> Result<String, TransportError> {
        self.requests.set(self.requests.get() + 1);
        self.responses
            .get(code)
            .cloned()
            .unwrap_or_else(|| {
                Err(TransportError::Unknown {
                    code: code.to_string(),
                })
            })
    }
}

/// Drive `future` to completion on a fresh current-thread runtime.
///
/// # Panics
/// Panics when the runtime cannot be created.
#[expect(clippy::expect_used, reason = "test helper fails loudly")]
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build test runtime")
        .block_on(future)
}
