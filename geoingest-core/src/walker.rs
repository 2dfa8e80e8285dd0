//! Traversals over untyped geometry documents.
//!
//! Two walks cooperate to reach every coordinate pair in a document:
//!
//! - the key-directed walk finds each `coordinates` member wherever it sits
//!   (features, geometry collections, flattened topologies, or wrappers the
//!   ingestion layer does not understand);
//! - the depth-flattening walk descends one `coordinates` payload, whose
//!   nesting depth depends on the geometry kind, down to individual points.
//!
//! Neither walk consults the geometry `type`; shape is discovered from the
//! values themselves.

use geo::Coord;
use serde_json::{Map, Number, Value};

use crate::GeometryError;

/// Member holding a point or point tree.
pub const COORDINATES: &str = "coordinates";

/// Structural classification of one point tree level.
///
/// Derived from the first element only: a `Polygon` is `Nested` (rings of
/// points), a `LineString` is `Points`, a `Point` is `Point`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// The level is a single position, e.g. `[x, y]`.
    Point,
    /// The level is a flat list of positions.
    Points,
    /// The level is a list of deeper point trees.
    Nested,
}

impl Shape {
    /// Classify a point tree level by inspecting its first element.
    #[must_use]
    pub fn of(items: &[Value]) -> Self {
        match items.first() {
            Some(Value::Array(inner)) => match inner.first() {
                Some(Value::Array(_)) => Self::Nested,
                _ => Self::Points,
            },
            _ => Self::Point,
        }
    }
}

/// Visit every `coordinates` member reachable from `node`.
///
/// `visit` receives the object owning the member together with the member
/// name, so it may replace the payload in place. The payload itself is not
/// descended; everything else (objects and arrays alike) is.
///
/// # Errors
/// Propagates the first error returned by `visit`.
///
/// # Examples
/// ```
/// use geoingest_core::walker::{COORDINATES, for_each_coordinates_member};
/// use serde_json::json;
///
/// let mut doc = json!({
///     "type": "FeatureCollection",
///     "features": [
///         {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2]}},
///         {"type": "Feature", "geometry": {"type": "Point", "coordinates": [3, 4]}}
///     ]
/// });
/// let mut seen = 0;
/// for_each_coordinates_member(&mut doc, &mut |owner, key| {
///     owner.insert(key.to_owned(), json!([0, 0]));
///     seen += 1;
///     Ok::<(), std::convert::Infallible>(())
/// })?;
/// assert_eq!(seen, 2);
/// assert_eq!(doc["features"][1]["geometry"][COORDINATES], json!([0, 0]));
/// # Ok::<(), std::convert::Infallible>(())
/// ```
pub fn for_each_coordinates_member<F, E>(node: &mut Value, visit: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Map<String, Value>, &str) -> Result<(), E>,
{
    match node {
        Value::Object(members) => {
            if members.contains_key(COORDINATES) {
                visit(members, COORDINATES)?;
            }
            for (key, child) in members.iter_mut() {
                if key != COORDINATES {
                    for_each_coordinates_member(child, visit)?;
                }
            }
            Ok(())
        }
        Value::Array(items) => items
            .iter_mut()
            .try_for_each(|child| for_each_coordinates_member(child, visit)),
        _ => Ok(()),
    }
}

/// Read-only twin of [`for_each_coordinates_member`] yielding each payload.
///
/// # Errors
/// Propagates the first error returned by `visit`.
pub fn for_each_coordinates<F, E>(node: &Value, visit: &mut F) -> Result<(), E>
where
    F: FnMut(&Value) -> Result<(), E>,
{
    match node {
        Value::Object(members) => {
            if let Some(payload) = members.get(COORDINATES) {
                visit(payload)?;
            }
            members
                .iter()
                .filter(|(key, _)| key.as_str() != COORDINATES)
                .try_for_each(|(_, child)| for_each_coordinates(child, visit))
        }
        Value::Array(items) => items
            .iter()
            .try_for_each(|child| for_each_coordinates(child, visit)),
        _ => Ok(()),
    }
}

/// Rebuild a point tree by applying `point_fn` to every position.
///
/// Ordinates beyond the first two (elevation, measures) are copied through
/// unchanged, as are ordinates `point_fn` leaves numerically equal, so an
/// identity function reproduces the input exactly. An empty sequence maps to
/// an empty sequence.
///
/// # Errors
/// Returns [`GeometryError`] (converted into `E`) when the tree is not a
/// sequence, a level has an unexpected shape, a position is not numeric, or
/// `point_fn` yields a non-finite ordinate. Errors from `point_fn` are
/// propagated unchanged.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use geoingest_core::{GeometryError, map_point_tree};
/// use serde_json::json;
///
/// let ring = json!([[[0, 0], [10, 0], [10, 10], [0, 0]]]);
/// let shifted = map_point_tree(&ring, |p: Coord| {
///     Ok::<_, GeometryError>(Coord { x: p.x + 1.0, y: p.y })
/// })?;
/// assert_eq!(shifted, json!([[[1.0, 0], [11.0, 0], [11.0, 10], [1.0, 0]]]));
/// # Ok::<(), GeometryError>(())
/// ```
pub fn map_point_tree<F, E>(tree: &Value, mut point_fn: F) -> Result<Value, E>
where
    F: FnMut(Coord) -> Result<Coord, E>,
    E: From<GeometryError>,
{
    let mut path = TreePath::default();
    map_level(tree, &mut point_fn, &mut path)
}

/// Visit every position of a point tree in document order.
///
/// # Errors
/// Returns [`GeometryError`] under the same conditions as
/// [`map_point_tree`], apart from non-finite output.
pub fn for_each_point<F>(tree: &Value, mut visit: F) -> Result<(), GeometryError>
where
    F: FnMut(Coord),
{
    let mut path = TreePath::default();
    visit_level(tree, &mut visit, &mut path)
}

fn map_level<F, E>(tree: &Value, point_fn: &mut F, path: &mut TreePath) -> Result<Value, E>
where
    F: FnMut(Coord) -> Result<Coord, E>,
    E: From<GeometryError>,
{
    let items = expect_sequence(tree, path)?;
    if items.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    match Shape::of(items) {
        Shape::Point => map_position(items, point_fn, path),
        Shape::Points => path.each(items, |child, at| {
            map_position(expect_sequence(child, at)?, point_fn, at)
        }),
        Shape::Nested => path.each(items, |child, at| map_level(child, point_fn, at)),
    }
}

fn visit_level<F>(tree: &Value, visit: &mut F, path: &mut TreePath) -> Result<(), GeometryError>
where
    F: FnMut(Coord),
{
    let items = expect_sequence(tree, path)?;
    if items.is_empty() {
        return Ok(());
    }
    match Shape::of(items) {
        Shape::Point => {
            visit(read_position(items, path)?);
            Ok(())
        }
        Shape::Points => path.visit(items, |child, at| {
            visit(read_position(expect_sequence(child, at)?, at)?);
            Ok(())
        }),
        Shape::Nested => path.visit(items, |child, at| visit_level(child, visit, at)),
    }
}

fn map_position<F, E>(items: &[Value], point_fn: &mut F, path: &TreePath) -> Result<Value, E>
where
    F: FnMut(Coord) -> Result<Coord, E>,
    E: From<GeometryError>,
{
    let point = read_position(items, path)?;
    let mapped = point_fn(point)?;
    let mut output = Vec::with_capacity(items.len());
    let mut ordinates = items.iter();
    for value in [mapped.x, mapped.y] {
        let original = ordinates.next();
        output.push(write_ordinate(original, value, path)?);
    }
    output.extend(ordinates.cloned());
    Ok(Value::Array(output))
}

/// Decode the leading `[x, y]` of a position.
pub(crate) fn read_position(items: &[Value], path: &TreePath) -> Result<Coord, GeometryError> {
    let (Some(raw_x), Some(raw_y)) = (items.first(), items.get(1)) else {
        return Err(GeometryError::NotAPoint {
            path: path.to_string(),
        });
    };
    match (raw_x.as_f64(), raw_y.as_f64()) {
        (Some(x), Some(y)) => Ok(Coord { x, y }),
        _ => Err(GeometryError::NonNumericOrdinate {
            path: path.to_string(),
        }),
    }
}

/// Encode an ordinate, reusing the original JSON number when unchanged.
pub(crate) fn write_ordinate(
    original: Option<&Value>,
    value: f64,
    path: &TreePath,
) -> Result<Value, GeometryError> {
    if let Some(kept) = original.filter(|old| old.as_f64() == Some(value)) {
        return Ok(kept.clone());
    }
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| GeometryError::NonFiniteOrdinate {
            path: path.to_string(),
        })
}

fn expect_sequence<'a>(tree: &'a Value, path: &TreePath) -> Result<&'a [Value], GeometryError> {
    tree.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| GeometryError::UnexpectedShape {
            path: path.to_string(),
        })
}

/// Index trail used to label errors, e.g. `coordinates[0][2]`.
#[derive(Debug, Clone)]
pub(crate) struct TreePath {
    root: &'static str,
    indices: Vec<usize>,
}

impl Default for TreePath {
    fn default() -> Self {
        Self::rooted(COORDINATES)
    }
}

impl TreePath {
    pub(crate) const fn rooted(root: &'static str) -> Self {
        Self {
            root,
            indices: Vec::new(),
        }
    }

    /// Map each child with its index pushed onto the trail.
    fn each<F, E>(&mut self, items: &[Value], mut f: F) -> Result<Value, E>
    where
        F: FnMut(&Value, &mut Self) -> Result<Value, E>,
    {
        let mut output = Vec::with_capacity(items.len());
        self.visit(items, |child, at| {
            output.push(f(child, at)?);
            Ok(())
        })?;
        Ok(Value::Array(output))
    }

    /// Visit each child with its index pushed onto the trail.
    fn visit<F, E>(&mut self, items: &[Value], mut f: F) -> Result<(), E>
    where
        F: FnMut(&Value, &mut Self) -> Result<(), E>,
    {
        for (index, child) in items.iter().enumerate() {
            self.indices.push(index);
            let outcome = f(child, self);
            self.indices.pop();
            outcome?;
        }
        Ok(())
    }
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.root)?;
        self.indices
            .iter()
            .try_for_each(|index| write!(f, "[{index}]"))
    }
}
