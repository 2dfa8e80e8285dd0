//! Sample geometry documents shared by unit and behaviour tests.

use serde_json::{Value, json};

/// A square polygon spanning `0..10` on both axes, without a `crs` member.
#[must_use]
pub fn square_polygon() -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]
    })
}

/// A feature collection mixing a point, a line and a null geometry.
#[must_use]
pub fn mixed_collection() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "Circular Quay"},
                "geometry": {"type": "Point", "coordinates": [151.2108, -33.8615]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Harbour Bridge"},
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[151.2093, -33.8523, 49.0], [151.2108, -33.8568, 49.0]]
                }
            },
            {"type": "Feature", "properties": {}, "geometry": null}
        ]
    })
}

/// A point whose `crs` member names `code` with an `EPSG` declaration.
#[must_use]
pub fn projected_point(code: u32, x: f64, y: f64) -> Value {
    json!({
        "type": "Feature",
        "properties": {},
        "crs": {"type": "EPSG", "properties": {"code": code.to_string()}},
        "geometry": {"type": "Point", "coordinates": [x, y]}
    })
}

/// A quantised topology holding two adjacent squares named `east` and `west`.
///
/// Both objects span one unit of latitude; `west` covers longitudes
/// `150..151` and `east` covers `151..152`.
#[must_use]
pub fn adjacent_squares_topology() -> Value {
    json!({
        "type": "Topology",
        "transform": {"scale": [1, 1], "translate": [150, -34]},
        "arcs": [
            [[1, 0], [0, 1]],
            [[1, 1], [-1, 0], [0, -1], [1, 0]],
            [[1, 0], [1, 0], [0, 1], [-1, 0]]
        ],
        "objects": {
            "east": {"type": "Polygon", "properties": {"side": "east"}, "arcs": [[2, -1]]},
            "west": {"type": "Polygon", "properties": {"side": "west"}, "arcs": [[0, 1]]}
        }
    })
}
