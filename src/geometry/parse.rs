use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;

use crate::{error::GeometryParseError, record::Shape};

type ParseResult<T> = Result<T, GeometryParseError>;

fn invalid(msg: impl Into<String>) -> GeometryParseError {
    GeometryParseError::InvalidCoordinates(msg.into())
}

/// Parse a GeoJSON geometry object into a typed shape.
/// Only `Polygon` and `MultiPolygon` are recognized; the type name is
/// matched case-insensitively.
pub fn parse_geometry(raw: &Value) -> ParseResult<Shape> {
    let object = match raw {
        Value::Null => return Err(GeometryParseError::Null),
        Value::Object(object) => object,
        _ => return Err(GeometryParseError::NotAnObject),
    };
    let kind = object.get("type").and_then(Value::as_str)
        .ok_or(GeometryParseError::MissingType)?;
    let coords = object.get("coordinates")
        .ok_or_else(|| invalid("missing `coordinates`"))?;

    match kind.to_ascii_lowercase().as_str() {
        "polygon" => parse_polygon(coords).map(Shape::Polygon),
        "multipolygon" => parse_multipolygon(coords).map(Shape::MultiPolygon),
        _ => Err(GeometryParseError::UnsupportedType(kind.to_string())),
    }
}

/// `[[polygon], [polygon], ...]`, at least one polygon.
fn parse_multipolygon(coords: &Value) -> ParseResult<MultiPolygon<f64>> {
    let polygons = coords.as_array().ok_or_else(|| invalid("multipolygon coordinates are not an array"))?;
    if polygons.is_empty() {
        return Err(invalid("multipolygon has no polygons"));
    }
    polygons.iter().map(parse_polygon).collect::<ParseResult<Vec<_>>>().map(MultiPolygon)
}

/// `[exterior, hole, hole, ...]`, exterior required.
fn parse_polygon(coords: &Value) -> ParseResult<Polygon<f64>> {
    let rings = coords.as_array().ok_or_else(|| invalid("polygon coordinates are not an array"))?;
    let (exterior, interiors) = rings.split_first().ok_or_else(|| invalid("polygon has no exterior ring"))?;
    let exterior = parse_ring(exterior)?;
    let interiors = interiors.iter().map(parse_ring).collect::<ParseResult<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// `[[x, y], [x, y], ...]`; closed if open, and at least four positions once closed.
fn parse_ring(coords: &Value) -> ParseResult<LineString<f64>> {
    let positions = coords.as_array().ok_or_else(|| invalid("ring is not an array"))?;
    let mut points = positions.iter().map(parse_position).collect::<ParseResult<Vec<_>>>()?;

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first); }
    }
    if points.len() < 4 {
        return Err(invalid(format!("ring has {} positions, need at least 4", points.len())));
    }
    Ok(LineString(points))
}

/// `[x, y]` or `[x, y, z]`; extra ordinates are ignored.
fn parse_position(coords: &Value) -> ParseResult<Coord<f64>> {
    match coords.as_array().map(Vec::as_slice) {
        Some([x, y, ..]) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => Ok(Coord { x, y }),
            _ => Err(invalid("position ordinates must be numbers")),
        },
        _ => Err(invalid("position must be an array of at least two numbers")),
    }
}

#[cfg(test)]
mod tests {
    use geo::{polygon, Area};
    use serde_json::json;

    use super::*;

    #[test]
    fn unit_square_polygon() {
        let raw = json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]});
        let expected = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)];
        assert_eq!(parse_geometry(&raw), Ok(Shape::Polygon(expected)));
    }

    #[test]
    fn polygon_with_hole_and_open_rings() {
        let raw = json!({"type": "Polygon", "coordinates": [
            [[0, 0], [4, 0], [4, 4], [0, 4]],
            [[1, 1], [2, 1], [2, 2], [1, 2]],
        ]});
        let Ok(Shape::Polygon(polygon)) = parse_geometry(&raw) else { panic!("expected polygon") };
        assert_eq!(polygon.exterior().0.len(), 5);
        assert_eq!(polygon.interiors().len(), 1);
        assert_eq!(polygon.unsigned_area(), 15.0);
    }

    #[test]
    fn multipolygon() {
        let raw = json!({"type": "MultiPolygon", "coordinates": [
            [[[0, 0], [1, 0], [1, 1], [0, 0]]],
            [[[5, 5], [6, 5], [6, 6], [5, 5]]],
        ]});
        let Ok(Shape::MultiPolygon(mp)) = parse_geometry(&raw) else { panic!("expected multipolygon") };
        assert_eq!(mp.0.len(), 2);
    }

    #[test]
    fn type_name_is_case_insensitive_and_z_is_ignored() {
        let raw = json!({"type": "polygon", "coordinates": [[[0, 0, 9], [1, 0, 9], [1, 1, 9], [0, 0, 9]]]});
        assert!(matches!(parse_geometry(&raw), Ok(Shape::Polygon(_))));
    }

    #[test]
    fn malformed_payloads() {
        let cases = [
            (Value::Null, GeometryParseError::Null),
            (json!("POLYGON ((0 0, 1 0, 1 1, 0 0))"), GeometryParseError::NotAnObject),
            (json!([[0, 0]]), GeometryParseError::NotAnObject),
            (json!({"coordinates": []}), GeometryParseError::MissingType),
            (json!({"type": 3, "coordinates": []}), GeometryParseError::MissingType),
            (json!({"type": "Point", "coordinates": [0, 0]}), GeometryParseError::UnsupportedType("Point".into())),
        ];
        for (raw, expected) in cases {
            assert_eq!(parse_geometry(&raw), Err(expected), "payload {raw}");
        }
    }

    #[test]
    fn invalid_coordinates() {
        let cases = [
            json!({"type": "Polygon"}),
            json!({"type": "Polygon", "coordinates": null}),
            json!({"type": "Polygon", "coordinates": []}),
            json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 0]]]}),
            json!({"type": "Polygon", "coordinates": [[[0, 0], [1, "a"], [1, 1], [0, 0]]]}),
            json!({"type": "Polygon", "coordinates": [[[0], [1, 0], [1, 1], [0, 0]]]}),
            json!({"type": "MultiPolygon", "coordinates": []}),
            json!({"type": "MultiPolygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}),
        ];
        for raw in cases {
            assert!(
                matches!(parse_geometry(&raw), Err(GeometryParseError::InvalidCoordinates(_))),
                "payload {raw}"
            );
        }
    }
}
