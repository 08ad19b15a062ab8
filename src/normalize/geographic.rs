use serde_json::{Map, Value};
use tracing::info;

use crate::{
    error::{PipelineError, SourceKind, Stage},
    normalize::region::{normalize_region, parse_metric},
    record::RawGeoRow,
};

pub const FEATURES_KEY: &str = "features";
pub const REGION_KEY: &str = "properties.NAME";
pub const VALUE_KEY: &str = "properties.Obesity";

/// Flatten each feature and select `properties.NAME` and `properties.Obesity`,
/// carrying the raw geometry payload through untouched.
/// One row per feature, in feature order.
pub fn normalize_geographic(doc: Value) -> Result<Vec<RawGeoRow>, PipelineError> {
    let schema_error = |field: &str| PipelineError::Schema {
        stage: Stage::Normalize,
        source_kind: SourceKind::Geographic,
        fields: vec![field.to_string()],
    };

    let features = match doc {
        Value::Object(mut map) => match map.remove(FEATURES_KEY) {
            Some(Value::Array(features)) => features,
            _ => return Err(schema_error(FEATURES_KEY)),
        },
        _ => return Err(schema_error(FEATURES_KEY)),
    };

    let mut rows = Vec::with_capacity(features.len());
    let (mut saw_region, mut saw_value) = (false, false);

    for feature in features {
        let (flat, geometry) = flatten_feature(feature);
        let region = flat.get(REGION_KEY);
        let value = flat.get(VALUE_KEY);
        saw_region |= region.is_some();
        saw_value |= value.is_some();

        rows.push(RawGeoRow {
            region: normalize_region(&value_text(region)),
            value: value_number(value),
            geometry,
        });
    }

    // A field that no feature carries means the collection has a different schema.
    if !rows.is_empty() {
        let missing: Vec<String> = [(REGION_KEY, saw_region), (VALUE_KEY, saw_value)].into_iter()
            .filter(|(_, seen)| !seen)
            .map(|(key, _)| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::Schema { stage: Stage::Normalize, source_kind: SourceKind::Geographic, fields: missing });
        }
    }

    info!(target: "normalize", rows = rows.len(), "geographic source normalized");
    Ok(rows)
}

/// Split a feature into its flattened attributes (dotted keys) and its raw geometry.
fn flatten_feature(feature: Value) -> (Map<String, Value>, Value) {
    let mut flat = Map::new();
    match feature {
        Value::Object(mut map) => {
            let geometry = map.remove("geometry").unwrap_or(Value::Null);
            for (key, value) in map {
                flatten_into(&key, value, &mut flat);
            }
            (flat, geometry)
        }
        _ => (flat, Value::Null),
    }
}

fn flatten_into(prefix: &str, value: Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(&format!("{prefix}.{key}"), nested, out);
            }
        }
        other => { out.insert(prefix.to_string(), other); }
    }
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn value_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_metric(s),
        _ => f64::NAN,
    }
}
