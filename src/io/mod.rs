//! IO collaborators: source fetching, payload decoding and table sinks.
//!
//! - `fetch` - `Fetcher` trait with HTTP, filesystem and in-memory implementations
//! - `csv` - CSV/JSON table encoding via polars
//! - `geojson` - GeoJSON document decoding
//! - `sink` - `TableSink` trait with disk and in-memory implementations

pub(crate) mod csv;
pub(crate) mod geojson;
mod fetch;
mod sink;

#[cfg(feature = "download")]
pub use fetch::HttpFetcher;
pub use fetch::{AutoFetcher, Fetcher, LocalFetcher, MemFetcher};
pub use sink::{DiskSink, MemSink, TableFormat, TableSink};
