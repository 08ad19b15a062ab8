//! Conversion of record sequences into frames for the sink.

use anyhow::{Context, Result};
use polars::{frame::DataFrame, prelude::NamedFrom, series::Series};

use crate::{
    io::TableFormat,
    record::{GeoRecord, MergedRecord},
};

/// Missing metrics are written as nulls rather than `NaN`.
#[inline]
fn nullable(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

/// Frame for the normalized geographic table: `region, value, geometry`.
/// Geometry cells are encoded for the table's output `format`.
pub fn geographic_table(rows: &[GeoRecord], format: TableFormat) -> Result<DataFrame> {
    let regions: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
    let values: Vec<Option<f64>> = rows.iter().map(|r| nullable(r.value)).collect();
    let geometries: Vec<Option<String>> = rows.iter().map(|r| r.geometry.encode(format)).collect();

    DataFrame::new(vec![
        Series::new("region".into(), regions).into(),
        Series::new("value".into(), values).into(),
        Series::new("geometry".into(), geometries).into(),
    ]).context("[record::table] Failed to build geographic table")
}

/// Frame for the merged table: `region, metric_geo, geometry, year, metric_tabular`.
pub fn merged_table(rows: &[MergedRecord], format: TableFormat) -> Result<DataFrame> {
    let regions: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
    let metric_geo: Vec<Option<f64>> = rows.iter().map(|r| nullable(r.metric_geo)).collect();
    let geometries: Vec<Option<String>> = rows.iter().map(|r| r.geometry.encode(format)).collect();
    let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
    let metric_tabular: Vec<Option<f64>> = rows.iter().map(|r| nullable(r.metric_tabular)).collect();

    DataFrame::new(vec![
        Series::new("region".into(), regions).into(),
        Series::new("metric_geo".into(), metric_geo).into(),
        Series::new("geometry".into(), geometries).into(),
        Series::new("year".into(), years).into(),
        Series::new("metric_tabular".into(), metric_tabular).into(),
    ]).context("[record::table] Failed to build merged table")
}
