//! Sources of projection definition text.
//!
//! A [`DefinitionSource`] turns a [`geoingest_core::CrsCode`] into PROJ.4
//! text. [`HttpDefinitionSource`] asks a definition service over HTTP,
//! appending the code to a base URL, while [`BundledDefinitionSource`]
//! answers offline from the EPSG database compiled into `crs-definitions`.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use geoingest_core::CrsCode;
//! use geoingest_data::definitions::{
//!     DefinitionSource, HttpDefinitionSource, HttpDefinitionSourceConfig,
//! };
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpDefinitionSourceConfig::new("https://maps.example.org/proj4def/")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_user_agent("atlas-importer/2.1");
//! let source = HttpDefinitionSource::with_config(config)?;
//! let text = source.fetch_definition(&CrsCode::epsg(28356)).await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

mod bundled;
mod error;
mod source;
mod types;
mod util;

#[doc(hidden)]
pub mod test_support;

pub use bundled::BundledDefinitionSource;
pub use error::{SourceBuildError, TransportError};
pub use source::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, DefinitionSource, HttpDefinitionSource,
    HttpDefinitionSourceConfig,
};
pub use types::{BaseUrl, DefinitionUrl};
