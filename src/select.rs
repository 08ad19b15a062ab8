use tracing::info;

use crate::{
    error::{PipelineError, SourceKind, Stage},
    record::TabularRecord,
};

/// The survey rows of the most recent reporting year.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestYear {
    pub year: i32,
    pub records: Vec<TabularRecord>,
}

/// Keep only the records whose year equals the maximum year present.
/// An empty input has no latest year and is an error.
pub fn select_latest(records: Vec<TabularRecord>) -> Result<LatestYear, PipelineError> {
    let year = records.iter().map(|r| r.year).max()
        .ok_or(PipelineError::EmptyInput { stage: Stage::Select, source_kind: SourceKind::Tabular })?;

    let total = records.len();
    let records: Vec<TabularRecord> = records.into_iter().filter(|r| r.year == year).collect();
    info!(target: "select", year, kept = records.len(), dropped = total - records.len(), "latest year selected");

    Ok(LatestYear { year, records })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(year: i32, region: &str, value: f64) -> TabularRecord {
        TabularRecord { year, region: region.into(), value }
    }

    #[test]
    fn keeps_only_latest_year() {
        let latest = select_latest(vec![
            rec(2019, "OHIO", 30.0),
            rec(2021, "OHIO", 32.0),
            rec(2020, "OHIO", 31.0),
            rec(2019, "IOWA", 28.0),
        ]).unwrap();
        assert_eq!(latest.year, 2021);
        assert_eq!(latest.records, vec![rec(2021, "OHIO", 32.0)]);
    }

    #[test]
    fn latest_year_is_global_not_per_region() {
        let latest = select_latest(vec![rec(2021, "OHIO", 32.0), rec(2020, "IOWA", 28.0)]).unwrap();
        assert_eq!(latest.year, 2021);
        assert!(latest.records.iter().all(|r| r.region == "OHIO"));
    }

    #[test]
    fn keeps_duplicates_in_order() {
        let latest = select_latest(vec![rec(2022, "GAMMA", 1.0), rec(2022, "GAMMA", 2.0)]).unwrap();
        assert_eq!(latest.records.len(), 2);
        assert_eq!(latest.records[0].value, 1.0);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = select_latest(Vec::new()).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput { source_kind: SourceKind::Tabular, .. }));
    }
}
