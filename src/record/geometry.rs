use std::fmt::Write;

use geo::{LineString, MultiPolygon, Polygon};
use serde_json::{json, Value};

use crate::io::TableFormat;

/// A materialized region outline.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Shape {
    /// Well-Known Text rendering, e.g. `POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))`.
    pub fn to_wkt(&self) -> String {
        let mut out = String::new();
        match self {
            Shape::Polygon(polygon) => {
                out.push_str("POLYGON ");
                write_polygon_wkt(&mut out, polygon);
            }
            Shape::MultiPolygon(mp) => {
                out.push_str("MULTIPOLYGON (");
                for (i, polygon) in mp.0.iter().enumerate() {
                    if i > 0 { out.push_str(", "); }
                    write_polygon_wkt(&mut out, polygon);
                }
                out.push(')');
            }
        }
        out
    }

    /// GeoJSON geometry object for the shape.
    pub fn to_geojson(&self) -> Value {
        match self {
            Shape::Polygon(polygon) => json!({
                "type": "Polygon",
                "coordinates": polygon_coords(polygon),
            }),
            Shape::MultiPolygon(mp) => json!({
                "type": "MultiPolygon",
                "coordinates": mp.0.iter().map(polygon_coords).collect::<Vec<_>>(),
            }),
        }
    }
}

/// Geometry of a region row: either a typed shape or nothing.
/// Consumers must match on both arms; there is no implicit null.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Geometry {
    Present(Shape),
    #[default]
    Absent,
}

impl Geometry {
    #[inline] pub fn is_present(&self) -> bool { matches!(self, Geometry::Present(_)) }

    #[inline] pub fn is_absent(&self) -> bool { matches!(self, Geometry::Absent) }

    /// Cell text for a table written as `format`: WKT for CSV, GeoJSON for JSON.
    pub fn encode(&self, format: TableFormat) -> Option<String> {
        let Geometry::Present(shape) = self else { return None };
        Some(match format {
            TableFormat::Csv => shape.to_wkt(),
            TableFormat::Json => shape.to_geojson().to_string(),
        })
    }
}

impl From<Shape> for Geometry {
    fn from(shape: Shape) -> Self { Geometry::Present(shape) }
}

fn write_polygon_wkt(out: &mut String, polygon: &Polygon<f64>) {
    out.push('(');
    write_ring_wkt(out, polygon.exterior());
    for ring in polygon.interiors() {
        out.push_str(", ");
        write_ring_wkt(out, ring);
    }
    out.push(')');
}

fn write_ring_wkt(out: &mut String, ring: &LineString<f64>) {
    out.push('(');
    for (i, c) in ring.coords().enumerate() {
        if i > 0 { out.push_str(", "); }
        let _ = write!(out, "{} {}", c.x, c.y);
    }
    out.push(')');
}

fn polygon_coords(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}
