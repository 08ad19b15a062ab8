//! The reconciliation run: fetch, normalize, materialize, select, join, store.
//!
//! Every stage consumes the previous stage's complete output. Any fatal error
//! aborts the run; absent geometries are counted, never fatal.

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::{
    config::PipelineConfig,
    error::{PipelineError, SourceKind, Stage},
    geometry::{materialize_rows, Materialized},
    io::{csv::read_csv_bytes, geojson::read_geojson_bytes, AutoFetcher, DiskSink, Fetcher, TableFormat, TableSink},
    join::{join, Joined},
    normalize::{normalize_geographic, normalize_tabular, TabularNormalization},
    record::{geographic_table, merged_table, GeoRecord, MergedRecord, TabularRecord},
    select::select_latest,
};

/// What a run saw at each stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// SHA-256 (hex) of the fetched survey bytes.
    pub tabular_digest: String,
    /// SHA-256 (hex) of the fetched boundary bytes.
    pub geographic_digest: String,
    pub tabular_rows: usize,
    pub skipped_tabular_rows: usize,
    pub geographic_rows: usize,
    pub absent_geometries: usize,
    pub absent_by_reason: BTreeMap<&'static str, usize>,
    pub latest_year: i32,
    pub latest_rows: usize,
    pub merged_rows: usize,
    pub unmatched_geographic: usize,
    pub unmatched_tabular: usize,
}

/// Merged rows plus the year they were selected from.
#[derive(Debug, Clone)]
pub struct Merge {
    pub latest_year: i32,
    pub latest_rows: usize,
    pub joined: Joined,
}

impl Merge {
    #[inline] pub fn records(&self) -> &[MergedRecord] { &self.joined.records }
}

/// Restrict the survey to its latest year, then inner-join it with the features.
pub fn merge(geographic: Vec<GeoRecord>, tabular: Vec<TabularRecord>) -> Result<Merge, PipelineError> {
    let latest = select_latest(tabular)?;
    let joined = join(geographic, &latest.records);
    Ok(Merge { latest_year: latest.year, latest_rows: latest.records.len(), joined })
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn fetch_source(fetcher: &dyn Fetcher, url: &str, source_kind: SourceKind) -> Result<Vec<u8>, PipelineError> {
    info!(target: "fetch", %source_kind, url, "fetching");
    let bytes = fetcher.fetch(url)
        .map_err(|cause| PipelineError::Retrieval { stage: Stage::Fetch, source_kind, url: url.to_string(), cause })?;
    info!(target: "fetch", %source_kind, bytes = bytes.len(), "fetched");
    Ok(bytes)
}

fn store(sink: &mut dyn TableSink, table: polars::frame::DataFrame, destination: &str) -> Result<(), PipelineError> {
    let rows = table.height();
    sink.store(&table, destination)
        .map_err(|cause| PipelineError::Store { stage: Stage::Store, destination: destination.to_string(), cause })?;
    info!(target: "store", destination, rows, "table stored");
    Ok(())
}

fn table_error(destination: &str) -> impl FnOnce(anyhow::Error) -> PipelineError + '_ {
    move |cause| PipelineError::Store { stage: Stage::Store, destination: destination.to_string(), cause }
}

/// Run the whole pipeline against the given collaborators.
pub fn run(config: &PipelineConfig, fetcher: &dyn Fetcher, sink: &mut dyn TableSink) -> Result<RunReport, PipelineError> {
    config.validate()?;
    let mut report = RunReport::default();

    // Fetch both sources before any transformation.
    let tabular_bytes = fetch_source(fetcher, &config.tabular_url, SourceKind::Tabular)?;
    let geographic_bytes = fetch_source(fetcher, &config.geographic_url, SourceKind::Geographic)?;
    report.tabular_digest = sha256_hex(&tabular_bytes);
    report.geographic_digest = sha256_hex(&geographic_bytes);

    // Read.
    let tabular_frame = read_csv_bytes(&tabular_bytes)
        .map_err(|cause| PipelineError::Decode { stage: Stage::Read, source_kind: SourceKind::Tabular, cause })?;
    drop(tabular_bytes);
    let geographic_doc = read_geojson_bytes(&geographic_bytes)
        .map_err(|cause| PipelineError::Decode { stage: Stage::Read, source_kind: SourceKind::Geographic, cause })?;
    drop(geographic_bytes);

    // Normalize and materialize.
    let raw_rows = normalize_geographic(geographic_doc)?;
    let Materialized { records: geographic, absent, absent_by_reason } = materialize_rows(raw_rows);
    report.geographic_rows = geographic.len();
    report.absent_geometries = absent;
    report.absent_by_reason = absent_by_reason;

    let TabularNormalization { records: tabular, skipped } = normalize_tabular(&tabular_frame)?;
    drop(tabular_frame);
    report.tabular_rows = tabular.len();
    report.skipped_tabular_rows = skipped;

    // The normalized geographic table is stored on its own, before the merge.
    let format = TableFormat::from_destination(&config.geographic_output);
    let table = geographic_table(&geographic, format).map_err(table_error(&config.geographic_output))?;
    store(sink, table, &config.geographic_output)?;

    let merged = merge(geographic, tabular)?;
    report.latest_year = merged.latest_year;
    report.latest_rows = merged.latest_rows;
    report.merged_rows = merged.records().len();
    report.unmatched_geographic = merged.joined.unmatched_geographic;
    report.unmatched_tabular = merged.joined.unmatched_tabular;

    let format = TableFormat::from_destination(&config.merged_output);
    let table = merged_table(merged.records(), format).map_err(table_error(&config.merged_output))?;
    store(sink, table, &config.merged_output)?;

    info!(
        target: "pipeline",
        latest_year = report.latest_year,
        merged = report.merged_rows,
        absent_geometries = report.absent_geometries,
        "run complete"
    );
    Ok(report)
}

/// Run with the default collaborators: URL-dispatching fetcher and a disk sink
/// rooted at `config.output_dir`.
pub fn run_with_config(config: &PipelineConfig) -> Result<RunReport, PipelineError> {
    config.validate()?;
    let fetcher = AutoFetcher::new(config.timeout_secs, &config.user_agent)
        .map_err(|e| PipelineError::Config(format!("{e:#}")))?;
    let mut sink = DiskSink::new(&config.output_dir);
    run(config, &fetcher, &mut sink)
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;
    use crate::record::{Geometry, Shape};

    #[test]
    fn merge_selects_latest_year_before_joining() {
        let square = Geometry::Present(Shape::Polygon(
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0)],
        ));
        let geographic = vec![GeoRecord { region: "TESTSTATE".into(), value: 30.5, geometry: square.clone() }];
        let tabular = vec![
            TabularRecord { year: 2022, region: "TESTSTATE".into(), value: 29.0 },
            TabularRecord { year: 2023, region: "TESTSTATE".into(), value: 30.5 },
        ];
        let merged = merge(geographic, tabular).unwrap();
        assert_eq!(merged.latest_year, 2023);
        assert_eq!(merged.records(), [MergedRecord {
            region: "TESTSTATE".into(),
            metric_geo: 30.5,
            geometry: square,
            year: 2023,
            metric_tabular: 30.5,
        }]);
    }

    #[test]
    fn merge_with_empty_survey_fails() {
        let err = merge(Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Select));
    }

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(sha256_hex(b""), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    }
}
