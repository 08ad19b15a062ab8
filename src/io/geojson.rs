use anyhow::{Context, Result, ensure};
use serde_json::Value;

/// Parse GeoJSON bytes into a JSON document.
/// Only syntax is checked here; the feature schema is the normalizer's concern.
pub(crate) fn read_geojson_bytes(bytes: &[u8]) -> Result<Value> {
    let value: Value = serde_json::from_slice(bytes)
        .context("[io::geojson::read] Failed to parse GeoJSON bytes")?;
    ensure!(value.is_object(), "[io::geojson::read] GeoJSON document is not an object");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_json() {
        assert!(read_geojson_bytes(b"{\"features\": [").is_err());
    }

    #[test]
    fn rejects_non_object_document() {
        assert!(read_geojson_bytes(b"[1, 2, 3]").is_err());
    }

    #[test]
    fn accepts_feature_collection() {
        let doc = read_geojson_bytes(br#"{"type":"FeatureCollection","features":[]}"#).unwrap();
        assert_eq!(doc["features"].as_array().map(Vec::len), Some(0));
    }
}
