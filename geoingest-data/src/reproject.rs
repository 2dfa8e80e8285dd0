//! Forward transforms from a projected CRS to geographic `EPSG:4326`.

use std::fmt;

use geo::Coord;
use geoingest_core::{CrsCode, GeometryError, ProjectionCache, ProjectionDefinition};
use proj4rs::{proj::Proj, transform::transform};
use thiserror::Error;

/// PROJ.4 text of the geographic destination CRS.
const GEOGRAPHIC: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Errors raised while reprojecting a document or point.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ReprojectError {
    /// No usable definition could be obtained for the declared CRS.
    #[error("the CRS {code} is not supported")]
    UnsupportedCrs {
        /// The declared CRS code.
        code: CrsCode,
    },
    /// The cache holds no definition for the CRS.
    #[error("no projection definition is cached for {code}")]
    MissingDefinition {
        /// The requested CRS code.
        code: CrsCode,
    },
    /// The projection library rejected the definition or the point.
    #[error("failed to transform from {code}: {message}")]
    Transform {
        /// Source CRS code.
        code: CrsCode,
        /// Diagnostic from the projection library.
        message: String,
    },
    /// A `coordinates` member could not be interpreted.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// A prepared transform from one source CRS to `EPSG:4326`.
///
/// Both projections are parsed once, so reprojecting a whole document costs
/// one parse regardless of its size.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use geoingest_core::{CrsCode, ProjectionDefinition};
/// use geoingest_data::{PointReprojector, ReprojectError};
///
/// let mercator = ProjectionDefinition::from("+proj=merc +a=6378137 +b=6378137 +units=m +no_defs");
/// let reprojector = PointReprojector::from_definition(&CrsCode::epsg(3857), &mercator)?;
/// let origin = reprojector.reproject(Coord { x: 0.0, y: 0.0 })?;
/// assert!(origin.x.abs() < 1e-9 && origin.y.abs() < 1e-9);
/// # Ok::<(), ReprojectError>(())
/// ```
pub struct PointReprojector {
    code: CrsCode,
    source: Proj,
    destination: Proj,
    source_is_lat_long: bool,
}

impl fmt::Debug for PointReprojector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointReprojector")
            .field("code", &self.code)
            .field("source_is_lat_long", &self.source_is_lat_long)
            .finish_non_exhaustive()
    }
}

impl PointReprojector {
    /// Prepare a transform from the CRS described by `definition`.
    ///
    /// # Errors
    /// Returns [`ReprojectError::Transform`] when the definition does not
    /// parse.
    pub fn from_definition(
        code: &CrsCode,
        definition: &ProjectionDefinition,
    ) -> Result<Self, ReprojectError> {
        let parse = |text: &str| {
            Proj::from_proj_string(text).map_err(|err| ReprojectError::Transform {
                code: code.clone(),
                message: format!("invalid projection {text:?}: {err:?}"),
            })
        };
        Ok(Self {
            code: code.clone(),
            source: parse(definition.as_str())?,
            destination: parse(GEOGRAPHIC)?,
            source_is_lat_long: definition.is_lat_long(),
        })
    }

    /// The source CRS this reprojector was prepared for.
    #[must_use]
    pub const fn code(&self) -> &CrsCode {
        &self.code
    }

    /// Transform `point` to longitude/latitude degrees.
    ///
    /// # Errors
    /// Returns [`ReprojectError::Transform`] when the projection library
    /// cannot transform the point.
    pub fn reproject(&self, point: Coord) -> Result<Coord, ReprojectError> {
        let mut xyz = if self.source_is_lat_long {
            (point.x.to_radians(), point.y.to_radians(), 0.0)
        } else {
            (point.x, point.y, 0.0)
        };
        transform(&self.source, &self.destination, &mut xyz).map_err(|err| {
            ReprojectError::Transform {
                code: self.code.clone(),
                message: format!("point ({}, {}): {err:?}", point.x, point.y),
            }
        })?;
        Ok(Coord {
            x: xyz.0.to_degrees(),
            y: xyz.1.to_degrees(),
        })
    }
}

/// Reproject a single point using the definition cached for `code`.
///
/// # Errors
/// Returns [`ReprojectError::MissingDefinition`] when `cache` holds nothing
/// for `code`, or [`ReprojectError::Transform`] when the transform fails.
pub fn reproject_point(
    cache: &ProjectionCache,
    point: Coord,
    code: &CrsCode,
) -> Result<Coord, ReprojectError> {
    let definition = cache
        .get(code)
        .ok_or_else(|| ReprojectError::MissingDefinition { code: code.clone() })?;
    PointReprojector::from_definition(code, &definition)?.reproject(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::test_support::{UTM_33N, WEB_MERCATOR};
    use rstest::{fixture, rstest};

    fn assert_near(actual: Coord, expected: Coord, tolerance: f64) {
        assert!(
            (actual.x - expected.x).abs() <= tolerance && (actual.y - expected.y).abs() <= tolerance,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[fixture]
    fn cache() -> ProjectionCache {
        let cache = ProjectionCache::new();
        cache.insert(CrsCode::epsg(3857), ProjectionDefinition::from(WEB_MERCATOR));
        cache.insert(CrsCode::epsg(32633), ProjectionDefinition::from(UTM_33N));
        cache.insert(
            CrsCode::epsg(4269),
            ProjectionDefinition::from("+proj=longlat +datum=NAD83 +no_defs"),
        );
        cache
    }

    #[rstest]
    fn mercator_origin_maps_to_null_island(cache: ProjectionCache) {
        let point = reproject_point(&cache, Coord { x: 0.0, y: 0.0 }, &CrsCode::epsg(3857))
            .expect("origin reprojects");
        assert_near(point, Coord { x: 0.0, y: 0.0 }, 1e-9);
    }

    #[rstest]
    fn mercator_point_maps_to_known_lon_lat(cache: ProjectionCache) {
        let point = reproject_point(
            &cache,
            Coord {
                x: 16_832_000.0,
                y: -4_011_000.0,
            },
            &CrsCode::epsg(3857),
        )
        .expect("point reprojects");
        assert_near(
            point,
            Coord {
                x: 151.2044,
                y: -33.8673,
            },
            1e-3,
        );
    }

    #[rstest]
    fn utm_central_meridian_maps_to_fifteen_east(cache: ProjectionCache) {
        let point = reproject_point(
            &cache,
            Coord {
                x: 500_000.0,
                y: 5_761_038.0,
            },
            &CrsCode::epsg(32633),
        )
        .expect("point reprojects");
        assert_near(point, Coord { x: 15.0, y: 52.0 }, 1e-3);
    }

    #[rstest]
    fn lat_long_sources_round_trip_in_degrees(cache: ProjectionCache) {
        let point = reproject_point(&cache, Coord { x: -77.0, y: 38.9 }, &CrsCode::epsg(4269))
            .expect("point reprojects");
        assert_near(point, Coord { x: -77.0, y: 38.9 }, 1e-6);
    }

    #[rstest]
    fn uncached_codes_fail_with_missing_definition(cache: ProjectionCache) {
        let err = reproject_point(&cache, Coord { x: 1.0, y: 1.0 }, &CrsCode::epsg(28356))
            .expect_err("not cached");
        assert_eq!(
            err,
            ReprojectError::MissingDefinition {
                code: CrsCode::epsg(28356)
            }
        );
    }

    #[rstest]
    fn unparsable_definitions_fail_with_transform_error() {
        let err = PointReprojector::from_definition(
            &CrsCode::epsg(9999),
            &ProjectionDefinition::from("+proj=does-not-exist"),
        )
        .expect_err("unknown projection");
        assert!(matches!(err, ReprojectError::Transform { .. }));
    }
}
