mod geometry;
mod table;

use serde_json::Value;

pub use geometry::{Geometry, Shape};
pub use table::{geographic_table, merged_table};

/// One survey row in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularRecord {
    pub year: i32,
    /// Trimmed, upper-cased region name.
    pub region: String,
    /// Metric value; `NaN` when the source cell was missing.
    pub value: f64,
}

/// One feature after schema normalization, before its geometry is typed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGeoRow {
    pub region: String,
    pub value: f64,
    /// Geometry payload exactly as it appeared in the feature.
    pub geometry: Value,
}

/// One feature with a materialized geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    pub region: String,
    pub value: f64,
    pub geometry: Geometry,
}

/// A geographic row joined with a latest-year survey row of the same region.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub region: String,
    pub metric_geo: f64,
    pub geometry: Geometry,
    pub year: i32,
    pub metric_tabular: f64,
}
