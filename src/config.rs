use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// CDC BRFSS nutrition / physical activity / obesity extract.
pub const DEFAULT_TABULAR_URL: &str = "https://data.cdc.gov/api/views/hn4x-zwk7/rows.csv?accessType=DOWNLOAD";

/// State obesity feature layer, queried as GeoJSON.
pub const DEFAULT_GEOGRAPHIC_URL: &str = "https://services3.arcgis.com/HESxeTbDliKKvec2/arcgis/rest/services/LakeCounty_Health/FeatureServer/8/query?outFields=*&where=1%3D1&f=geojson";

/// Everything a run needs. Every field has a default, so a config file
/// only has to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Survey CSV location (`http(s)://`, `file://` or a local path).
    pub tabular_url: String,
    /// Boundary GeoJSON location.
    pub geographic_url: String,
    /// Directory the disk sink writes under.
    pub output_dir: PathBuf,
    /// Destination of the normalized geographic table.
    pub geographic_output: String,
    /// Destination of the merged table.
    pub merged_output: String,
    /// HTTP request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tabular_url: DEFAULT_TABULAR_URL.to_string(),
            geographic_url: DEFAULT_GEOGRAPHIC_URL.to_string(),
            output_dir: PathBuf::from("."),
            geographic_output: "geo_data_cleaned.csv".to_string(),
            merged_output: "merged_data.csv".to_string(),
            timeout_secs: 60,
            user_agent: concat!("geohealth/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        let config: Self = toml::from_str(text)
            .map_err(|e| PipelineError::Config(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("failed to read config file '{}': {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        let required = [
            ("tabular_url", self.tabular_url.as_str()),
            ("geographic_url", self.geographic_url.as_str()),
            ("geographic_output", self.geographic_output.as_str()),
            ("merged_output", self.merged_output.as_str()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(PipelineError::Config(format!("`{name}` must not be empty")));
        }
        if self.geographic_output == self.merged_output {
            return Err(PipelineError::Config("geographic and merged outputs must differ".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(PipelineError::Config("`timeout_secs` must be positive".to_string()));
        }
        Ok(())
    }
}
