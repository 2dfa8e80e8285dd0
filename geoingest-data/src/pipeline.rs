//! Normalising whole documents to geographic coordinates.

use geoingest_core::{
    CrsCode, Extent, GeometryError, compute_extent, for_each_coordinates_member, is_topology,
    map_point_tree, resolve_crs_code, stamp_geographic,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{PointReprojector, ProjectionResolver, ReprojectError};

/// Errors raised by [`ingest_document`].
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum IngestError {
    /// Reprojection to geographic coordinates failed.
    #[error("failed to reproject document: {0}")]
    Reproject(#[from] ReprojectError),
    /// The extent of the normalised document could not be computed.
    #[error("failed to compute document extent: {0}")]
    Extent(#[from] GeometryError),
}

/// A document normalised to `EPSG:4326` together with its extent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestedDocument {
    /// Name taken from a single-member wrapper object, if there was one.
    pub name: Option<String>,
    /// CRS the document declared before normalisation.
    pub source_crs: Option<CrsCode>,
    /// The normalised document.
    pub document: Value,
    /// Bounding extent of every coordinate pair in the document.
    pub extent: Extent,
}

/// Rewrite `document` in place so every coordinate is longitude/latitude.
///
/// The `crs` member is always replaced with an `EPSG:4326` declaration,
/// even when reprojection then fails. Documents without a declaration, or
/// declaring `EPSG:4326`/`EPSG:4283`, are otherwise left untouched.
/// Coordinates are rewritten on a staged copy, so on error every
/// `coordinates` member still holds its original values.
///
/// Topologies are not arc-decoded: only explicit `coordinates` members,
/// such as those of `Point` objects, are transformed and `arcs` stay as
/// they were.
///
/// # Errors
/// Returns [`ReprojectError::UnsupportedCrs`] when no definition can be
/// obtained for the declared CRS, [`ReprojectError::Geometry`] for malformed
/// `coordinates` members and [`ReprojectError::Transform`] when a point
/// cannot be transformed.
///
/// # Examples
/// ```
/// use geoingest_core::{CrsCode, ProjectionCache};
/// use geoingest_data::{ProjectionResolver, ReprojectError, reproject_to_geographic};
/// use geoingest_data::definitions::test_support::{StubDefinitionSource, block_on_for_tests};
/// use serde_json::json;
///
/// let resolver = ProjectionResolver::with_cache(ProjectionCache::new(), StubDefinitionSource::new());
/// let mut doc = json!({
///     "type": "Point",
///     "crs": {"type": "EPSG", "properties": {"code": "28356"}},
///     "coordinates": [334000, 6252000]
/// });
/// let outcome = block_on_for_tests(reproject_to_geographic(&mut doc, &resolver));
/// assert_eq!(outcome, Err(ReprojectError::UnsupportedCrs { code: CrsCode::epsg(28356) }));
/// assert_eq!(doc["crs"]["properties"]["code"], json!("4326"));
/// ```
pub async fn reproject_to_geographic(
    document: &mut Value,
    resolver: &ProjectionResolver,
) -> Result<(), ReprojectError> {
    let declared = resolve_crs_code(document);
    stamp_geographic(document);
    let Some(code) = declared.filter(|code| !code.is_geographic()) else {
        return Ok(());
    };
    if !resolver.ensure_definition(&code).await {
        return Err(ReprojectError::UnsupportedCrs { code });
    }
    let definition = resolver
        .cache()
        .get(&code)
        .ok_or_else(|| ReprojectError::MissingDefinition { code: code.clone() })?;
    if is_topology(document) {
        log::warn!("topology declared in {code} is reprojected without decoding its arcs");
    }
    let reprojector = PointReprojector::from_definition(&code, &definition)?;
    let mut staged = document.clone();
    let mut rewritten = 0_usize;
    for_each_coordinates_member(&mut staged, &mut |owner, key| {
        if let Some(payload) = owner.get(key) {
            let mapped = map_point_tree(payload, |point| reprojector.reproject(point))?;
            owner.insert(key.to_owned(), mapped);
            rewritten += 1;
        }
        Ok::<(), ReprojectError>(())
    })?;
    *document = staged;
    log::debug!("reprojected {rewritten} coordinates members from {code}");
    Ok(())
}

/// Normalise a raw document and compute its extent.
///
/// An object with exactly one member is treated as a named wrapper: the key
/// becomes [`IngestedDocument::name`] and its value the document. The
/// document is reprojected before its extent is computed.
///
/// # Errors
/// Returns [`IngestError`] when reprojection or extent computation fails.
///
/// # Examples
/// ```
/// use geoingest_core::ProjectionCache;
/// use geoingest_data::{IngestError, ProjectionResolver, ingest_document};
/// use geoingest_data::definitions::test_support::{StubDefinitionSource, block_on_for_tests};
/// use serde_json::json;
///
/// let resolver = ProjectionResolver::with_cache(ProjectionCache::new(), StubDefinitionSource::new());
/// let wrapped = json!({"depots": {"type": "Point", "coordinates": [151, -33]}});
/// let ingested = block_on_for_tests(ingest_document(wrapped, &resolver))?;
/// assert_eq!(ingested.name.as_deref(), Some("depots"));
/// assert_eq!(ingested.extent.west, 151.0);
/// # Ok::<(), IngestError>(())
/// ```
pub async fn ingest_document(
    document: Value,
    resolver: &ProjectionResolver,
) -> Result<IngestedDocument, IngestError> {
    let (name, mut document) = unwrap_named(document);
    let source_crs = resolve_crs_code(&document);
    reproject_to_geographic(&mut document, resolver).await?;
    let extent = compute_extent(&document)?;
    Ok(IngestedDocument {
        name,
        source_crs,
        document,
        extent,
    })
}

fn unwrap_named(document: Value) -> (Option<String>, Value) {
    match document {
        Value::Object(members) if members.len() == 1 => members
            .into_iter()
            .next()
            .map_or((None, Value::Null), |(name, inner)| (Some(name), inner)),
        other => (None, other),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use geoingest_core::{CrsCode, ProjectionCache, test_support};
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::definitions::test_support::{
        StubDefinitionSource, WEB_MERCATOR, block_on_for_tests,
    };

    #[fixture]
    fn stub() -> Rc<StubDefinitionSource> {
        Rc::new(StubDefinitionSource::new().with_definition(CrsCode::epsg(3857), WEB_MERCATOR))
    }

    #[fixture]
    fn resolver(stub: Rc<StubDefinitionSource>) -> ProjectionResolver {
        ProjectionResolver::with_cache(ProjectionCache::new(), stub)
    }

    #[rstest]
    #[case(test_support::square_polygon())]
    #[case(test_support::mixed_collection())]
    fn undeclared_documents_are_only_stamped(resolver: ProjectionResolver, #[case] original: Value) {
        let mut document = original.clone();
        block_on_for_tests(reproject_to_geographic(&mut document, &resolver))
            .expect("nothing to transform");
        let mut expected = original;
        stamp_geographic(&mut expected);
        assert_eq!(document, expected);
    }

    #[rstest]
    #[case(json!({"type": "EPSG", "properties": {"code": 4283}}))]
    #[case(json!({"type": "EPSG", "properties": {"code": 4326.0}}))]
    #[case(json!({"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}}))]
    fn geographic_documents_skip_the_source(
        stub: Rc<StubDefinitionSource>,
        #[case] crs: Value,
    ) {
        let resolver = ProjectionResolver::with_cache(ProjectionCache::new(), Rc::clone(&stub));
        let mut document = json!({"type": "Point", "crs": crs, "coordinates": [151, -33]});
        block_on_for_tests(reproject_to_geographic(&mut document, &resolver))
            .expect("geographic input");
        assert_eq!(document["coordinates"], json!([151, -33]));
        assert_eq!(document["crs"]["properties"]["code"], json!("4326"));
        assert_eq!(stub.requests(), 0);
    }

    #[rstest]
    fn projected_points_are_rewritten(resolver: ProjectionResolver) {
        let mut document = test_support::projected_point(3857, 0.0, 0.0);
        block_on_for_tests(reproject_to_geographic(&mut document, &resolver))
            .expect("mercator is known");
        let coordinates = document
            .pointer("/geometry/coordinates")
            .and_then(Value::as_array)
            .expect("coordinates survive");
        let lon = coordinates.first().and_then(Value::as_f64).expect("lon");
        let lat = coordinates.get(1).and_then(Value::as_f64).expect("lat");
        assert!(lon.abs() < 1e-9 && lat.abs() < 1e-9);
    }

    #[rstest]
    fn elevations_survive_reprojection(resolver: ProjectionResolver) {
        let mut document = json!({
            "type": "LineString",
            "crs": {"type": "name", "properties": {"name": "EPSG:3857"}},
            "coordinates": [[0, 0, 12.5], [1000, 1000, 14]]
        });
        block_on_for_tests(reproject_to_geographic(&mut document, &resolver))
            .expect("mercator is known");
        assert_eq!(document.pointer("/coordinates/0/2"), Some(&json!(12.5)));
        assert_eq!(document.pointer("/coordinates/1/2"), Some(&json!(14)));
    }

    #[rstest]
    fn unsupported_codes_fail_after_stamping(resolver: ProjectionResolver) {
        let mut document = test_support::projected_point(28356, 334_000.0, 6_252_000.0);
        let err = block_on_for_tests(reproject_to_geographic(&mut document, &resolver))
            .expect_err("no definition for 28356");
        assert_eq!(
            err,
            ReprojectError::UnsupportedCrs {
                code: CrsCode::epsg(28356)
            }
        );
        assert_eq!(document["crs"]["properties"]["code"], json!("4326"));
        assert_eq!(document["geometry"]["coordinates"], json!([334_000.0, 6_252_000.0]));
    }

    #[rstest]
    fn malformed_coordinates_surface_as_geometry_errors(resolver: ProjectionResolver) {
        let mut document = json!({
            "type": "Point",
            "crs": {"type": "EPSG", "properties": {"code": "3857"}},
            "coordinates": "0,0"
        });
        let err = block_on_for_tests(reproject_to_geographic(&mut document, &resolver))
            .expect_err("string coordinates");
        assert!(matches!(
            err,
            ReprojectError::Geometry(GeometryError::UnexpectedShape { .. })
        ));
    }

    #[rstest]
    fn failed_reprojection_leaves_coordinates_untouched(resolver: ProjectionResolver) {
        let original = json!({
            "type": "FeatureCollection",
            "crs": {"type": "EPSG", "properties": {"code": "3857"}},
            "features": [
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {"type": "Point", "coordinates": [16_832_000, -4_011_000]}
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {"type": "LineString", "coordinates": [[0, 0], ["east", 0]]}
                }
            ]
        });
        let mut document = original.clone();
        let err = block_on_for_tests(reproject_to_geographic(&mut document, &resolver))
            .expect_err("second feature is malformed");
        assert!(matches!(err, ReprojectError::Geometry(_)));
        let mut expected = original;
        stamp_geographic(&mut expected);
        assert_eq!(document, expected);
    }

    #[rstest]
    fn projected_topologies_rewrite_points_and_keep_arcs(resolver: ProjectionResolver) {
        let arcs = json!([[[16_832_000, -4_011_000], [16_833_000, -4_012_000]]]);
        let mut document = json!({
            "type": "Topology",
            "crs": {"type": "name", "properties": {"name": "EPSG:3857"}},
            "arcs": arcs.clone(),
            "objects": {
                "ferry": {"type": "Point", "coordinates": [16_832_000, -4_011_000]},
                "route": {"type": "LineString", "arcs": [0]}
            }
        });
        block_on_for_tests(reproject_to_geographic(&mut document, &resolver))
            .expect("mercator is known");

        let lon = document
            .pointer("/objects/ferry/coordinates/0")
            .and_then(Value::as_f64)
            .expect("lon");
        let lat = document
            .pointer("/objects/ferry/coordinates/1")
            .and_then(Value::as_f64)
            .expect("lat");
        assert!((lon - 151.2044).abs() < 1e-3, "lon {lon}");
        assert!((lat - -33.8673).abs() < 1e-3, "lat {lat}");
        assert_eq!(document["arcs"], arcs);
        assert_eq!(document.pointer("/objects/route/arcs"), Some(&json!([0])));
        assert_eq!(document["crs"]["properties"]["code"], json!("4326"));
    }

    #[rstest]
    fn wrapper_objects_are_unwrapped(resolver: ProjectionResolver) {
        let wrapped = json!({"harbour": test_support::mixed_collection()});
        let ingested =
            block_on_for_tests(ingest_document(wrapped, &resolver)).expect("ingests cleanly");
        assert_eq!(ingested.name.as_deref(), Some("harbour"));
        assert_eq!(ingested.source_crs, None);
        assert_eq!(ingested.document["type"], json!("FeatureCollection"));
        assert_eq!(ingested.extent.west, 151.2093);
        assert_eq!(ingested.extent.north, -33.8523);
    }

    #[rstest]
    fn ingestion_records_the_declared_crs(resolver: ProjectionResolver) {
        let wrapped = json!({"depot": test_support::projected_point(3857, 0.0, 0.0)});
        let ingested =
            block_on_for_tests(ingest_document(wrapped, &resolver)).expect("ingests cleanly");
        assert_eq!(ingested.source_crs, Some(CrsCode::epsg(3857)));
        assert_eq!(ingested.document["crs"]["properties"]["code"], json!("4326"));
        assert!(ingested.extent.west.abs() < 1e-9 && ingested.extent.north.abs() < 1e-9);
    }

    #[rstest]
    fn multi_member_objects_are_not_unwrapped(resolver: ProjectionResolver) {
        let ingested = block_on_for_tests(ingest_document(test_support::square_polygon(), &resolver))
            .expect("ingests cleanly");
        assert_eq!(ingested.name, None);
        assert_eq!(
            ingested.extent,
            Extent {
                west: 0.0,
                south: 0.0,
                east: 10.0,
                north: 10.0
            }
        );
    }
}
