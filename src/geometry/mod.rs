//! Geometry materializer: raw GeoJSON geometry payloads into typed shapes.

mod parse;

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::record::{GeoRecord, Geometry, RawGeoRow};

pub use parse::parse_geometry;

/// Materialize one payload. Malformed payloads become `Geometry::Absent`.
pub fn materialize(raw: &Value) -> Geometry {
    parse_geometry(raw).map_or(Geometry::Absent, Geometry::Present)
}

/// Rows with typed geometry, plus a tally of the rows whose geometry was dropped.
#[derive(Debug, Clone, Default)]
pub struct Materialized {
    pub records: Vec<GeoRecord>,
    pub absent: usize,
    /// Absent geometries keyed by failure reason.
    pub absent_by_reason: BTreeMap<&'static str, usize>,
}

/// Type every row's geometry. Row count and order are preserved; the raw
/// payloads are dropped once materialized.
pub fn materialize_rows(rows: Vec<RawGeoRow>) -> Materialized {
    let mut out = Materialized { records: Vec::with_capacity(rows.len()), ..Default::default() };

    for (row, RawGeoRow { region, value, geometry }) in rows.into_iter().enumerate() {
        let geometry = match parse_geometry(&geometry) {
            Ok(shape) => Geometry::Present(shape),
            Err(e) => {
                debug!(target: "geometry", row, region = %region, reason = %e, "geometry absent");
                out.absent += 1;
                *out.absent_by_reason.entry(e.reason()).or_default() += 1;
                Geometry::Absent
            }
        };
        out.records.push(GeoRecord { region, value, geometry });
    }

    if out.absent > 0 {
        warn!(target: "geometry", absent = out.absent, reasons = ?out.absent_by_reason, "rows without usable geometry");
    }
    info!(target: "geometry", rows = out.records.len(), absent = out.absent, "geometries materialized");
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::record::Shape;

    fn raw(region: &str, value: f64, geometry: Value) -> RawGeoRow {
        RawGeoRow { region: region.into(), value, geometry }
    }

    #[test]
    fn malformed_rows_survive_with_absent_geometry() {
        let rows = vec![
            raw("A", 1.0, json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]})),
            raw("B", 2.0, Value::Null),
            raw("C", 3.0, json!("garbage")),
            raw("D", 4.0, json!({"coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]})),
            raw("E", 5.0, json!({"type": "Polygon", "coordinates": [[["x", 0]]]})),
            raw("F", 6.0, json!({"type": "MultiPolygon"})),
        ];
        let out = materialize_rows(rows);

        assert_eq!(out.records.len(), 6);
        assert!(matches!(out.records[0].geometry, Geometry::Present(Shape::Polygon(_))));
        for (i, (region, value)) in [("B", 2.0), ("C", 3.0), ("D", 4.0), ("E", 5.0), ("F", 6.0)].into_iter().enumerate() {
            let record = &out.records[i + 1];
            assert_eq!(record.region, region);
            assert_eq!(record.value, value);
            assert!(record.geometry.is_absent());
        }
        assert_eq!(out.absent, 5);
        assert_eq!(out.absent_by_reason.get("null"), Some(&1));
        assert_eq!(out.absent_by_reason.get("not_an_object"), Some(&1));
        assert_eq!(out.absent_by_reason.get("missing_type"), Some(&1));
        assert_eq!(out.absent_by_reason.get("invalid_coordinates"), Some(&2));
    }

    #[test]
    fn materialize_single_payload() {
        assert!(materialize(&json!({"type": "Polygon", "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 0]]]})).is_present());
        assert!(materialize(&json!(42)).is_absent());
    }

    #[test]
    fn empty_input_is_empty_output() {
        let out = materialize_rows(Vec::new());
        assert!(out.records.is_empty());
        assert_eq!(out.absent, 0);
    }
}
