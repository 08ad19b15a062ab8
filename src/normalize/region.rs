/// Canonical join key for a region name: surrounding whitespace trimmed, upper-cased.
/// Both sources go through this function; the join relies on it.
#[inline]
pub fn normalize_region(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Parse an integer-like cell (`2021`, ` 2021 `, `2021.0`).
pub(crate) fn parse_year(cell: &str) -> Option<i32> {
    let cell = cell.trim();
    if let Ok(year) = cell.parse::<i64>() {
        return i32::try_from(year).ok();
    }
    let year = cell.parse::<f64>().ok()?;
    (year.is_finite() && year.fract() == 0.0 && year.abs() <= i32::MAX as f64).then_some(year as i32)
}

/// Parse a numeric-like cell; anything unreadable becomes `NaN`.
pub(crate) fn parse_metric(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}
