//! Geometry model for the geoingest pipeline.
//!
//! Documents are handled as untyped [`serde_json::Value`] trees so any
//! GeoJSON or TopoJSON shape can be normalised without a schema. This crate
//! holds the pieces that need no I/O: CRS declarations, the projection
//! definition cache, coordinate tree walkers, topology flattening and extent
//! computation. Fetching definitions and transforming points lives in
//! `geoingest-data`.
//!
//! # Examples
//!
//! ```
//! use geo::Coord;
//! use geoingest_core::{Extent, GeometryError, compute_extent, map_point_tree};
//! use serde_json::json;
//!
//! let line = json!({"type": "LineString", "coordinates": [[1, 1], [3, 2]]});
//! let shifted = map_point_tree(&line["coordinates"], |p: Coord| {
//!     Ok::<_, GeometryError>(Coord { x: p.x + 1.0, y: p.y })
//! })?;
//! assert_eq!(shifted, json!([[2.0, 1], [4.0, 2]]));
//!
//! let extent = compute_extent(&line)?;
//! assert_eq!(extent, Extent { west: 1.0, south: 1.0, east: 3.0, north: 2.0 });
//! # Ok::<(), GeometryError>(())
//! ```

pub mod cache;
pub mod crs;
pub mod error;
pub mod extent;
pub mod topology;
pub mod walker;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use cache::{ProjectionCache, ProjectionDefinition};
pub use crs::{CRS_MEMBER, CrsCode, resolve_crs_code, stamp_geographic};
pub use error::GeometryError;
pub use extent::{Extent, compute_extent};
pub use topology::{flatten_topology, is_topology};
pub use walker::{
    COORDINATES, Shape, for_each_coordinates, for_each_coordinates_member, for_each_point,
    map_point_tree,
};
