//! Offline definition lookup backed by the `crs-definitions` EPSG database.

use async_trait::async_trait;
use geoingest_core::CrsCode;

use super::{DefinitionSource, TransportError};

/// Answers from the EPSG registry compiled into the binary.
///
/// Only `EPSG:<n>` codes whose number fits the registry range are known;
/// anything else fails with [`TransportError::Unknown`].
///
/// # Examples
/// ```
/// use geoingest_core::CrsCode;
/// use geoingest_data::definitions::{BundledDefinitionSource, DefinitionSource, test_support::block_on_for_tests};
///
/// let text = block_on_for_tests(BundledDefinitionSource.fetch_definition(&CrsCode::epsg(3857)))
///     .expect("web mercator is registered");
/// assert!(text.contains("+proj=merc"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledDefinitionSource;

impl BundledDefinitionSource {
    /// Synchronous lookup used by the async trait method.
    #[must_use]
    pub fn lookup(code: &CrsCode) -> Option<&'static str> {
        code.epsg_number()
            .and_then(crs_definitions::from_code)
            .map(|definition| definition.proj4)
    }
}

#[async_trait(?Send)]
impl DefinitionSource for BundledDefinitionSource {
    async fn fetch_definition(&self, code: &CrsCode) -> Result<String, TransportError> {
        Self::lookup(code)
            .map(str::to_owned)
            .ok_or_else(|| TransportError::Unknown {
                code: code.to_string(),
            })
    }
}
