use std::path::Path;

use anyhow::{Context, Result};
use geohealth::{run_with_config, PipelineConfig, RunReport};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(url) = &args.tabular_url { config.tabular_url = url.clone(); }
    if let Some(url) = &args.geographic_url { config.geographic_url = url.clone(); }
    if let Some(dir) = &args.output { config.output_dir = dir.clone(); }

    let report = run_with_config(&config)?;

    info!(target: "run", "{}", summary(&report, &config.output_dir.join(&config.merged_output)));
    if args.report {
        let text = serde_json::to_string_pretty(&report).context("[run] Failed to serialize run report")?;
        println!("{text}");
    }

    Ok(())
}

/// One-line account of a finished run.
fn summary(report: &RunReport, merged: &Path) -> String {
    format!(
        "latest year {}: {} merged rows, {} boundary rows without geometry -> {}",
        report.latest_year,
        report.merged_rows,
        report.absent_geometries,
        merged.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_absent_geometry_against_boundary_rows() {
        let report = RunReport { latest_year: 2021, merged_rows: 4, geographic_rows: 52, absent_geometries: 2, ..RunReport::default() };
        assert_eq!(
            summary(&report, Path::new("out/merged_data.csv")),
            "latest year 2021: 4 merged rows, 2 boundary rows without geometry -> out/merged_data.csv"
        );
    }
}
