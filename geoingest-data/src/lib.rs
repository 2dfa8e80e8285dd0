//! Projection lookup and reprojection for geoingest.
//!
//! Responsibilities:
//! - Obtain projection definitions from HTTP services or the bundled EPSG
//!   database and memoise them in a [`geoingest_core::ProjectionCache`].
//! - Transform coordinates from projected systems to `EPSG:4326`.
//! - Run the ingestion pipeline: unwrap, reproject, compute the extent.
//!
//! Boundaries:
//! - Tree walking, CRS parsing and extent maths live in `geoingest-core`.
//! - Reading documents from disk belongs to the caller.
//!
//! Invariants:
//! - Nothing is cached for a code whose definition failed to load.
//! - A document's `crs` member is restamped before any fallible step.

pub mod definitions;
mod pipeline;
mod reproject;
mod resolver;

pub use pipeline::{IngestError, IngestedDocument, ingest_document, reproject_to_geographic};
pub use reproject::{PointReprojector, ReprojectError, reproject_point};
pub use resolver::ProjectionResolver;
