//! Schema normalizers: both sources into the canonical `region / year / value` schema.

mod geographic;
pub(crate) mod region;
mod tabular;

pub use geographic::normalize_geographic;
pub use region::normalize_region;
pub use tabular::{normalize_tabular, TabularNormalization};
