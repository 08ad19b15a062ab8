#![doc = "geohealth public API: reconcile a survey extract with region boundaries"]
mod config;
mod error;
mod geometry;
mod io;
mod join;
mod normalize;
mod pipeline;
mod record;
mod select;

#[doc(inline)]
pub use config::{PipelineConfig, DEFAULT_GEOGRAPHIC_URL, DEFAULT_TABULAR_URL};

#[doc(inline)]
pub use error::{GeometryParseError, PipelineError, SourceKind, Stage};

#[doc(inline)]
pub use record::{geographic_table, merged_table, GeoRecord, Geometry, MergedRecord, RawGeoRow, Shape, TabularRecord};

#[doc(inline)]
pub use normalize::{normalize_geographic, normalize_region, normalize_tabular, TabularNormalization};

#[doc(inline)]
pub use geometry::{materialize, materialize_rows, parse_geometry, Materialized};

#[doc(inline)]
pub use select::{select_latest, LatestYear};

#[doc(inline)]
pub use join::{join, Joined};

#[doc(inline)]
pub use pipeline::{merge, run, run_with_config, Merge, RunReport};

#[cfg(feature = "download")]
#[doc(inline)]
pub use io::HttpFetcher;

#[doc(inline)]
pub use io::{AutoFetcher, DiskSink, Fetcher, LocalFetcher, MemFetcher, MemSink, TableFormat, TableSink};

/// Decode source payloads the way `run` does, for callers driving stages by hand.
pub mod read {
    use polars::frame::DataFrame;
    use serde_json::Value;

    /// CSV bytes into an all-string frame.
    pub fn tabular(bytes: &[u8]) -> anyhow::Result<DataFrame> { crate::io::csv::read_csv_bytes(bytes) }

    /// GeoJSON bytes into a JSON document.
    pub fn geographic(bytes: &[u8]) -> anyhow::Result<Value> { crate::io::geojson::read_geojson_bytes(bytes) }
}
