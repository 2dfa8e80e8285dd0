//! Arc table and quantisation decoding for topology documents.

use serde_json::{Number, Value};

use crate::GeometryError;

/// Affine transform applied to quantised positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

impl Transform {
    /// Read the optional `transform` member of a topology.
    pub(super) fn from_topology(topology: &Value) -> Result<Option<Self>, GeometryError> {
        match topology.get("transform") {
            None | Some(Value::Null) => Ok(None),
            Some(transform) => Ok(Some(Self {
                scale: read_pair(transform, "scale")?,
                translate: read_pair(transform, "translate")?,
            })),
        }
    }

    fn apply(&self, [x, y]: [f64; 2]) -> [f64; 2] {
        let [scale_x, scale_y] = self.scale;
        let [shift_x, shift_y] = self.translate;
        [x * scale_x + shift_x, y * scale_y + shift_y]
    }
}

/// Arcs decoded to absolute positions, ready to be stitched into lines.
#[derive(Debug, Default)]
pub(super) struct ArcTable {
    arcs: Vec<Vec<Value>>,
}

impl ArcTable {
    /// Decode every arc of `topology`, undoing delta encoding when quantised.
    pub(super) fn decode(
        topology: &Value,
        transform: Option<Transform>,
    ) -> Result<Self, GeometryError> {
        let arcs = match topology.get("arcs") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(arcs)) => arcs
                .iter()
                .enumerate()
                .map(|(slot, arc)| decode_arc(slot, arc, transform))
                .collect::<Result<_, _>>()?,
            Some(_) => {
                return Err(GeometryError::invalid_topology("`arcs` is not an array"));
            }
        };
        Ok(Self { arcs })
    }

    /// Stitch the referenced arcs into one line of at least two positions.
    ///
    /// Consecutive arcs share their junction position, so the last position
    /// of the line so far is dropped before the next arc is appended.
    pub(super) fn line(&self, references: &[Value]) -> Result<Vec<Value>, GeometryError> {
        let mut points = Vec::new();
        for reference in references {
            self.append(reference, &mut points)?;
        }
        pad(points, 2)
    }

    /// Stitch the referenced arcs into a ring of at least four positions.
    pub(super) fn ring(&self, references: &[Value]) -> Result<Vec<Value>, GeometryError> {
        pad(self.line(references)?, 4)
    }

    fn append(&self, reference: &Value, points: &mut Vec<Value>) -> Result<(), GeometryError> {
        let index = reference.as_i64().ok_or_else(|| {
            GeometryError::invalid_topology(format!("arc reference {reference} is not an integer"))
        })?;
        let (slot, reversed) = if index < 0 {
            (!index, true)
        } else {
            (index, false)
        };
        let arc = usize::try_from(slot)
            .ok()
            .and_then(|position| self.arcs.get(position))
            .ok_or(GeometryError::ArcOutOfRange { index })?;
        points.pop();
        if reversed {
            points.extend(arc.iter().rev().cloned());
        } else {
            points.extend(arc.iter().cloned());
        }
        Ok(())
    }
}

/// Apply the topology transform to a standalone position.
pub(super) fn dequantise(
    position: &Value,
    transform: Option<Transform>,
) -> Result<Value, GeometryError> {
    let Some(transform) = transform else {
        return Ok(position.clone());
    };
    let (xy, rest) = split_position(position)?;
    write_position(transform.apply(xy), rest)
}

fn decode_arc(
    slot: usize,
    arc: &Value,
    transform: Option<Transform>,
) -> Result<Vec<Value>, GeometryError> {
    let positions = arc
        .as_array()
        .ok_or_else(|| GeometryError::invalid_topology(format!("arc {slot} is not an array")))?;
    let Some(transform) = transform else {
        return Ok(positions.clone());
    };
    let mut cursor = [0.0, 0.0];
    positions
        .iter()
        .map(|position| {
            let ([dx, dy], rest) = split_position(position)?;
            cursor = [cursor[0] + dx, cursor[1] + dy];
            write_position(transform.apply(cursor), rest)
        })
        .collect()
}

fn pad(mut points: Vec<Value>, minimum: usize) -> Result<Vec<Value>, GeometryError> {
    let first = points
        .first()
        .cloned()
        .ok_or_else(|| GeometryError::invalid_topology("line references no positions"))?;
    let target = points.len().max(minimum);
    points.resize(target, first);
    Ok(points)
}

fn split_position(position: &Value) -> Result<([f64; 2], &[Value]), GeometryError> {
    let ordinates = position
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| GeometryError::invalid_topology(format!("position {position} is not an array")))?;
    match ordinates {
        [raw_x, raw_y, rest @ ..] => match (raw_x.as_f64(), raw_y.as_f64()) {
            (Some(x), Some(y)) => Ok(([x, y], rest)),
            _ => Err(GeometryError::invalid_topology(format!(
                "position {position} has non-numeric ordinates"
            ))),
        },
        _ => Err(GeometryError::invalid_topology(format!(
            "position {position} has fewer than two ordinates"
        ))),
    }
}

fn write_position(xy: [f64; 2], rest: &[Value]) -> Result<Value, GeometryError> {
    let mut ordinates = Vec::with_capacity(rest.len() + 2);
    for ordinate in xy {
        let number = Number::from_f64(ordinate).ok_or_else(|| {
            GeometryError::invalid_topology("dequantised ordinate is not finite")
        })?;
        ordinates.push(Value::Number(number));
    }
    ordinates.extend_from_slice(rest);
    Ok(Value::Array(ordinates))
}

fn read_pair(transform: &Value, member: &str) -> Result<[f64; 2], GeometryError> {
    let pair = transform.get(member).and_then(Value::as_array).map(Vec::as_slice);
    match pair {
        Some([first, second]) => match (first.as_f64(), second.as_f64()) {
            (Some(a), Some(b)) => Ok([a, b]),
            _ => Err(GeometryError::invalid_topology(format!(
                "transform `{member}` must hold two numbers"
            ))),
        },
        _ => Err(GeometryError::invalid_topology(format!(
            "transform `{member}` must be a pair"
        ))),
    }
}
