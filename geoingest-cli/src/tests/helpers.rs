//! Test helpers for writing documents and stubbing definition lookups.

use super::*;
use crate::normalise::{NormaliseConfig, ResolverBuilder};
use camino::{Utf8Path, Utf8PathBuf};
use geoingest_core::{CrsCode, ProjectionCache};
use geoingest_data::ProjectionResolver;
use geoingest_data::definitions::test_support::{StubDefinitionSource, WEB_MERCATOR};
use serde_json::{Value, json};
use tempfile::TempDir;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

pub(super) fn temp_workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// A point feature declared in `EPSG:<code>`.
pub(super) fn projected_feature(code: u32, x: f64, y: f64) -> Value {
    json!({
        "type": "Feature",
        "crs": {"type": "EPSG", "properties": {"code": code.to_string()}},
        "properties": {},
        "geometry": {"type": "Point", "coordinates": [x, y]}
    })
}

/// Resolves only Web Mercator, into a private cache.
pub(super) struct StubResolverBuilder;

impl ResolverBuilder for StubResolverBuilder {
    fn build(&self, _config: &NormaliseConfig) -> Result<ProjectionResolver, CliError> {
        let source =
            StubDefinitionSource::new().with_definition(CrsCode::epsg(3857), WEB_MERCATOR);
        Ok(ProjectionResolver::with_cache(ProjectionCache::new(), source))
    }
}
