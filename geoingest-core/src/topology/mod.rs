//! Flattening of topology-encoded (TopoJSON) documents.
//!
//! A topology stores shared boundaries once in an `arcs` table and lets its
//! named `objects` reference them by index. Plain geometry walkers cannot see
//! those coordinates, so [`flatten_topology`] rebuilds every named object as
//! an ordinary feature. The input is never mutated.

mod codec;

use serde_json::{Map, Value, json};

use self::codec::{ArcTable, Transform, dequantise};
use crate::GeometryError;

const TOPOLOGY_TYPE: &str = "Topology";

/// Whether `document` declares itself a topology.
#[must_use]
pub fn is_topology(document: &Value) -> bool {
    type_of(document) == Some(TOPOLOGY_TYPE)
}

/// Convert each named object of a topology into a plain feature value.
///
/// A `GeometryCollection` object becomes a `FeatureCollection`; any other
/// object becomes a `Feature` carrying its `id`, `bbox` and `properties`
/// (an empty object when absent). Objects are emitted in member order and a
/// topology without `objects` yields no features.
///
/// # Errors
/// Returns [`GeometryError::InvalidTopology`] for structurally broken input
/// and [`GeometryError::ArcOutOfRange`] for references to missing arcs.
///
/// # Examples
/// ```
/// use geoingest_core::{GeometryError, flatten_topology};
/// use serde_json::json;
///
/// let topology = json!({
///     "type": "Topology",
///     "arcs": [[[0, 0], [3, 4]]],
///     "objects": {"road": {"type": "LineString", "arcs": [0]}}
/// });
/// let features = flatten_topology(&topology)?;
/// assert_eq!(features[0]["geometry"]["coordinates"], json!([[0, 0], [3, 4]]));
/// # Ok::<(), GeometryError>(())
/// ```
pub fn flatten_topology(topology: &Value) -> Result<Vec<Value>, GeometryError> {
    let objects = match topology.get("objects") {
        None => return Ok(Vec::new()),
        Some(Value::Object(objects)) => objects,
        Some(_) => return Err(GeometryError::invalid_topology("`objects` is not an object")),
    };
    let decoder = Decoder::new(topology)?;
    objects.values().map(|object| decoder.object(object)).collect()
}

struct Decoder {
    arcs: ArcTable,
    transform: Option<Transform>,
}

impl Decoder {
    fn new(topology: &Value) -> Result<Self, GeometryError> {
        let transform = Transform::from_topology(topology)?;
        let arcs = ArcTable::decode(topology, transform)?;
        Ok(Self { arcs, transform })
    }

    fn object(&self, object: &Value) -> Result<Value, GeometryError> {
        if type_of(object) != Some("GeometryCollection") {
            return self.feature(object);
        }
        let features = sequence(object, "geometries")?
            .iter()
            .map(|member| self.feature(member))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(json!({ "type": "FeatureCollection", "features": features }))
    }

    fn feature(&self, object: &Value) -> Result<Value, GeometryError> {
        let mut feature = Map::new();
        feature.insert("type".to_owned(), json!("Feature"));
        for member in ["id", "bbox"] {
            if let Some(value) = object.get(member) {
                feature.insert(member.to_owned(), value.clone());
            }
        }
        let properties = object
            .get("properties")
            .filter(|properties| !properties.is_null())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        feature.insert("properties".to_owned(), properties);
        feature.insert("geometry".to_owned(), self.geometry(object)?);
        Ok(Value::Object(feature))
    }

    fn geometry(&self, object: &Value) -> Result<Value, GeometryError> {
        let Some(kind) = type_of(object) else {
            return Ok(Value::Null);
        };
        let coordinates = match kind {
            "GeometryCollection" => {
                let geometries = sequence(object, "geometries")?
                    .iter()
                    .map(|member| self.geometry(member))
                    .collect::<Result<Vec<_>, _>>()?;
                return Ok(json!({ "type": kind, "geometries": geometries }));
            }
            "Point" => {
                let position = object.get("coordinates").ok_or_else(|| {
                    GeometryError::invalid_topology("point has no `coordinates`")
                })?;
                dequantise(position, self.transform)?
            }
            "MultiPoint" => each(sequence(object, "coordinates")?, |position| {
                dequantise(position, self.transform)
            })?,
            "LineString" => Value::Array(self.arcs.line(sequence(object, "arcs")?)?),
            "MultiLineString" => each(sequence(object, "arcs")?, |line| {
                Ok(Value::Array(self.arcs.line(as_sequence(line, "line")?)?))
            })?,
            "Polygon" => self.polygon(sequence(object, "arcs")?)?,
            "MultiPolygon" => each(sequence(object, "arcs")?, |polygon| {
                self.polygon(as_sequence(polygon, "polygon")?)
            })?,
            _ => return Ok(Value::Null),
        };
        Ok(json!({ "type": kind, "coordinates": coordinates }))
    }

    fn polygon(&self, rings: &[Value]) -> Result<Value, GeometryError> {
        each(rings, |ring| {
            Ok(Value::Array(self.arcs.ring(as_sequence(ring, "ring")?)?))
        })
    }
}

fn each<F>(items: &[Value], convert: F) -> Result<Value, GeometryError>
where
    F: FnMut(&Value) -> Result<Value, GeometryError>,
{
    items
        .iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn type_of(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}

fn sequence<'a>(object: &'a Value, member: &str) -> Result<&'a [Value], GeometryError> {
    object
        .get(member)
        .ok_or_else(|| GeometryError::invalid_topology(format!("missing `{member}` member")))
        .and_then(|value| as_sequence(value, member))
}

fn as_sequence<'a>(value: &'a Value, what: &str) -> Result<&'a [Value], GeometryError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| GeometryError::invalid_topology(format!("`{what}` is not an array")))
}
