use anyhow::Context;
use polars::{frame::DataFrame, prelude::{Column, DataType}};
use tracing::{debug, info, warn};

use crate::{
    error::{PipelineError, SourceKind, Stage},
    normalize::region::{normalize_region, parse_metric, parse_year},
    record::TabularRecord,
};

pub const YEAR_COLUMN: &str = "YearStart";
pub const REGION_COLUMN: &str = "LocationDesc";
pub const VALUE_COLUMN: &str = "Data_Value";

/// Survey rows in canonical form, plus the rows that could not carry a year.
#[derive(Debug, Clone, Default)]
pub struct TabularNormalization {
    pub records: Vec<TabularRecord>,
    /// Rows dropped because `YearStart` was empty or not an integer.
    pub skipped: usize,
}

/// Rename `YearStart, LocationDesc, Data_Value` to `year, region, value`
/// and drop every other column.
pub fn normalize_tabular(df: &DataFrame) -> Result<TabularNormalization, PipelineError> {
    let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
    let missing: Vec<String> = [YEAR_COLUMN, REGION_COLUMN, VALUE_COLUMN].iter()
        .filter(|required| !names.contains(*required))
        .map(|required| required.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Schema { stage: Stage::Normalize, source_kind: SourceKind::Tabular, fields: missing });
    }

    let decode = |cause: anyhow::Error| PipelineError::Decode {
        stage: Stage::Normalize,
        source_kind: SourceKind::Tabular,
        cause,
    };
    let years = string_column(df, YEAR_COLUMN).map_err(decode)?;
    let regions = string_column(df, REGION_COLUMN).map_err(decode)?;
    let values = string_column(df, VALUE_COLUMN).map_err(decode)?;

    let years = years.str().context("[normalize::tabular] YearStart is not a string column").map_err(decode)?;
    let regions = regions.str().context("[normalize::tabular] LocationDesc is not a string column").map_err(decode)?;
    let values = values.str().context("[normalize::tabular] Data_Value is not a string column").map_err(decode)?;

    let mut out = TabularNormalization { records: Vec::with_capacity(df.height()), skipped: 0 };
    for (row, ((year, region), value)) in years.into_iter().zip(regions.into_iter()).zip(values.into_iter()).enumerate() {
        let Some(year) = year.and_then(parse_year) else {
            debug!(target: "normalize", row, cell = ?year, "skipping survey row without a readable year");
            out.skipped += 1;
            continue;
        };
        out.records.push(TabularRecord {
            year,
            region: normalize_region(region.unwrap_or_default()),
            value: value.map_or(f64::NAN, parse_metric),
        });
    }

    if out.skipped > 0 {
        warn!(target: "normalize", skipped = out.skipped, "survey rows dropped for unreadable {YEAR_COLUMN}");
    }
    info!(target: "normalize", rows = out.records.len(), "tabular source normalized");
    Ok(out)
}

/// Fetch a column as strings, casting if the reader typed it.
fn string_column(df: &DataFrame, name: &str) -> anyhow::Result<Column> {
    df.column(name)
        .with_context(|| format!("[normalize::tabular] Missing column {name}"))?
        .cast(&DataType::String)
        .with_context(|| format!("[normalize::tabular] Failed to read {name} as text"))
}

#[cfg(test)]
mod tests {
    use polars::{prelude::NamedFrom, series::Series};

    use super::*;
    use crate::io::csv::read_csv_bytes;

    #[test]
    fn renames_and_upper_cases_regions() {
        let df = read_csv_bytes(b"YearStart,LocationDesc,Data_Value\n2023,TestState,30.5\n2023,OtherState,25.2\n").unwrap();
        let out = normalize_tabular(&df).unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0], TabularRecord { year: 2023, region: "TESTSTATE".into(), value: 30.5 });
        assert_eq!(out.records[1].region, "OTHERSTATE");
        assert_eq!(out.skipped, 0);
    }

    #[test]
    fn drops_extra_columns_and_keeps_missing_values_as_nan() {
        let csv = b"YearStart,YearEnd,LocationAbbr,LocationDesc,Question,Data_Value\n\
                    2021,2021,OH,  Ohio ,Obesity,\n\
                    2021,2021,IA,Iowa,Obesity,36.4\n";
        let out = normalize_tabular(&read_csv_bytes(csv).unwrap()).unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].region, "OHIO");
        assert!(out.records[0].value.is_nan());
        assert_eq!(out.records[1].value, 36.4);
    }

    #[test]
    fn missing_columns_are_a_schema_error() {
        let df = read_csv_bytes(b"YearStart,State\n2021,Ohio\n").unwrap();
        match normalize_tabular(&df) {
            Err(PipelineError::Schema { source_kind, fields, .. }) => {
                assert_eq!(source_kind, SourceKind::Tabular);
                assert_eq!(fields, ["LocationDesc", "Data_Value"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn rows_without_a_year_are_skipped_and_counted() {
        let df = read_csv_bytes(b"YearStart,LocationDesc,Data_Value\n,Ohio,1\n2020,Iowa,2\nabc,Utah,3\n").unwrap();
        let out = normalize_tabular(&df).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].region, "IOWA");
        assert_eq!(out.skipped, 2);
    }

    #[test]
    fn accepts_typed_columns() {
        let df = DataFrame::new(vec![
            Series::new("YearStart".into(), [2019i64, 2020]).into(),
            Series::new("LocationDesc".into(), ["a", "b"]).into(),
            Series::new("Data_Value".into(), [Some(1.5f64), None]).into(),
        ]).unwrap();
        let out = normalize_tabular(&df).unwrap();
        assert_eq!(out.records[0], TabularRecord { year: 2019, region: "A".into(), value: 1.5 });
        assert!(out.records[1].value.is_nan());
    }

    #[test]
    fn normalizing_canonical_rows_is_a_no_op() {
        let first = normalize_tabular(
            &read_csv_bytes(b"YearStart,LocationDesc,Data_Value,Extra\n2021, ohio ,30.5,x\n2020,Iowa,,y\n").unwrap(),
        ).unwrap().records;

        // Feed the canonical rows back in under the source column names.
        let df = DataFrame::new(vec![
            Series::new("YearStart".into(), first.iter().map(|r| r.year).collect::<Vec<_>>()).into(),
            Series::new("LocationDesc".into(), first.iter().map(|r| r.region.as_str()).collect::<Vec<_>>()).into(),
            Series::new("Data_Value".into(), first.iter().map(|r| r.value).collect::<Vec<_>>()).into(),
        ]).unwrap();
        let second = normalize_tabular(&df).unwrap().records;

        assert_eq!(second.len(), first.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.year, b.year);
            assert_eq!(a.region, b.region);
            assert!(a.value == b.value || (a.value.is_nan() && b.value.is_nan()));
        }
    }
}
