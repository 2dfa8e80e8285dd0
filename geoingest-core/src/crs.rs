//! Coordinate reference system declarations.
//!
//! GeoJSON documents written before RFC 7946 may carry a `crs` member naming
//! the projection their coordinates use. This module reads that member into a
//! canonical [`CrsCode`] and re-stamps documents once they have been
//! normalised to geographic coordinates.

use std::{fmt, ops::Deref};

use serde_json::{Number, Value, json};

/// Member holding the CRS declaration.
pub const CRS_MEMBER: &str = "crs";

const EPSG_PREFIX: &str = "EPSG:";
const OGC_URN_PREFIX: &str = "urn:ogc:def:crs:EPSG::";
const CRS84_MARKER: &str = "CRS84";

/// Canonical `EPSG:<n>` identifier for a coordinate reference system.
///
/// # Examples
/// ```
/// use geoingest_core::CrsCode;
///
/// let code = CrsCode::epsg(28356);
/// assert_eq!(code.as_ref(), "EPSG:28356");
/// assert!(!code.is_geographic());
/// assert!(CrsCode::wgs84().is_geographic());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct CrsCode(String);

impl CrsCode {
    /// Code of the canonical geographic CRS (WGS 84).
    pub const WGS84: &'static str = "EPSG:4326";
    /// Code of GDA94, close enough to WGS 84 to need no transform.
    pub const GDA94: &'static str = "EPSG:4283";

    /// Wrap an already canonical code such as `EPSG:3857`.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build a code from a bare EPSG number or numeric string.
    pub fn epsg(number: impl fmt::Display) -> Self {
        Self(format!("{EPSG_PREFIX}{number}"))
    }

    /// The canonical geographic CRS, `EPSG:4326`.
    #[must_use]
    pub fn wgs84() -> Self {
        Self::new(Self::WGS84)
    }

    /// Whether coordinates in this CRS are already longitude/latitude degrees.
    #[must_use]
    pub fn is_geographic(&self) -> bool {
        self.0 == Self::WGS84 || self.0 == Self::GDA94
    }

    /// The numeric part of the code, when it fits an EPSG registry number.
    #[must_use]
    pub fn epsg_number(&self) -> Option<u16> {
        self.0.strip_prefix(EPSG_PREFIX)?.parse().ok()
    }

    /// Consume the wrapper and return the inner [`String`].
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for CrsCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for CrsCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for CrsCode {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the CRS declared by `document`, if any.
///
/// Recognises `{"type": "EPSG", "properties": {"code": ..}}` and
/// `{"type": "name", "properties": {"name": ..}}` where the name is
/// `EPSG:<n>`, `urn:ogc:def:crs:EPSG::<n>` or mentions `CRS84`. Anything
/// else, including a missing member, yields `None` and the document is
/// assumed to be geographic already.
///
/// # Examples
/// ```
/// use geoingest_core::{CrsCode, resolve_crs_code};
/// use serde_json::json;
///
/// let doc = json!({
///     "type": "FeatureCollection",
///     "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::28356"}},
///     "features": []
/// });
/// assert_eq!(resolve_crs_code(&doc), Some(CrsCode::epsg(28356)));
/// ```
#[must_use]
pub fn resolve_crs_code(document: &Value) -> Option<CrsCode> {
    let crs = document.get(CRS_MEMBER)?;
    let properties = crs.get("properties");
    match crs.get("type").and_then(Value::as_str)? {
        "EPSG" => match properties?.get("code")? {
            Value::String(code) => Some(CrsCode::epsg(code)),
            Value::Number(code) => Some(epsg_from_number(code)),
            _ => None,
        },
        "name" => parse_crs_name(properties?.get("name")?.as_str()?),
        _ => None,
    }
}

/// Integral floats such as `4326.0` name the same code as `4326`.
fn epsg_from_number(code: &Number) -> CrsCode {
    match code.as_f64() {
        Some(value) if code.is_f64() && value.is_finite() && value.fract().abs() < f64::EPSILON => {
            CrsCode::epsg(format!("{value:.0}"))
        }
        _ => CrsCode::epsg(code),
    }
}

fn parse_crs_name(name: &str) -> Option<CrsCode> {
    if name.starts_with(EPSG_PREFIX) {
        Some(CrsCode::new(name))
    } else if let Some(number) = name.strip_prefix(OGC_URN_PREFIX) {
        Some(CrsCode::epsg(number))
    } else if name.contains(CRS84_MARKER) {
        Some(CrsCode::wgs84())
    } else {
        None
    }
}

/// Overwrite the document's `crs` member with an `EPSG:4326` declaration.
///
/// Non-object documents are left untouched.
pub fn stamp_geographic(document: &mut Value) {
    if let Some(members) = document.as_object_mut() {
        members.insert(
            CRS_MEMBER.to_owned(),
            json!({ "type": "EPSG", "properties": { "code": "4326" } }),
        );
    }
}
