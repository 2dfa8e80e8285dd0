//! Geographic bounding extents of geometry documents.

use geo::{Coord, Rect};
use serde_json::Value;

use crate::{
    GeometryError,
    topology::{flatten_topology, is_topology},
    walker::{for_each_coordinates, for_each_point},
};

/// Axis-aligned bounding rectangle in degrees.
///
/// A fresh extent is seeded inverted (`west = 180`, `east = -180`,
/// `south = 90`, `north = -90`) so the first point always widens it. An
/// extent no point touched stays inverted and reports [`Extent::is_empty`].
/// Longitudes are compared naively; geometries crossing the antimeridian
/// produce a rectangle spanning the whole range between their extremes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extent {
    /// Minimum longitude.
    pub west: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Maximum latitude.
    pub north: f64,
}

impl Extent {
    /// The inverted seed used before any point is seen.
    pub const SEED: Self = Self {
        west: 180.0,
        south: 90.0,
        east: -180.0,
        north: -90.0,
    };

    /// Widen the extent to include `point`.
    pub const fn include(&mut self, point: Coord) {
        self.west = self.west.min(point.x);
        self.east = self.east.max(point.x);
        self.south = self.south.min(point.y);
        self.north = self.north.max(point.y);
    }

    /// Whether the extent is still inverted, i.e. covers no point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.west > self.east || self.south > self.north
    }

    /// Convert to a [`geo::Rect`], or `None` for an empty extent.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use geoingest_core::Extent;
    ///
    /// let mut extent = Extent::default();
    /// assert!(extent.to_rect().is_none());
    ///
    /// extent.include(Coord { x: 151.0, y: -33.0 });
    /// let rect = extent.to_rect().expect("one point was included");
    /// assert_eq!(rect.min(), Coord { x: 151.0, y: -33.0 });
    /// ```
    #[must_use]
    pub fn to_rect(&self) -> Option<Rect<f64>> {
        if self.is_empty() {
            return None;
        }
        Some(Rect::new(
            Coord {
                x: self.west,
                y: self.south,
            },
            Coord {
                x: self.east,
                y: self.north,
            },
        ))
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::SEED
    }
}

/// Compute the extent of every coordinate pair reachable from `document`.
///
/// Topology documents are flattened into plain features first, since their
/// geometries reference shared arcs instead of carrying coordinates. A
/// document without points yields the inverted seed.
///
/// # Errors
/// Returns [`GeometryError`] when a `coordinates` member is malformed or a
/// topology cannot be decoded.
///
/// # Examples
/// ```
/// use geoingest_core::{Extent, GeometryError, compute_extent};
/// use serde_json::json;
///
/// let polygon = json!({
///     "type": "Polygon",
///     "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]
/// });
/// let extent = compute_extent(&polygon)?;
/// assert_eq!(extent, Extent { west: 0.0, south: 0.0, east: 10.0, north: 10.0 });
/// # Ok::<(), GeometryError>(())
/// ```
pub fn compute_extent(document: &Value) -> Result<Extent, GeometryError> {
    if is_topology(document) {
        let features = Value::Array(flatten_topology(document)?);
        log::debug!(
            "computing extent over {} flattened topology objects",
            features.as_array().map_or(0, Vec::len)
        );
        return extent_of(&features);
    }
    extent_of(document)
}

fn extent_of(subject: &Value) -> Result<Extent, GeometryError> {
    let mut extent = Extent::SEED;
    for_each_coordinates(subject, &mut |payload: &Value| {
        for_each_point(payload, |point| extent.include(point))
    })?;
    Ok(extent)
}
