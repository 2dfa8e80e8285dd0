//! Facade crate for the geoingest GeoJSON ingestion core.
//!
//! This crate re-exports the document model and tree walkers from
//! `geoingest-core` and, behind the `data` feature, the projection lookup
//! and reprojection pipeline from `geoingest-data`.

#![forbid(unsafe_code)]

pub use geoingest_core::{
    CrsCode, Extent, GeometryError, ProjectionCache, ProjectionDefinition, compute_extent,
    flatten_topology, is_topology, map_point_tree, resolve_crs_code, stamp_geographic,
};

#[cfg(feature = "data")]
pub use geoingest_data::{
    IngestError, IngestedDocument, PointReprojector, ProjectionResolver, ReprojectError,
    definitions, ingest_document, reproject_point, reproject_to_geographic,
};
