use crate::model::FeatureMap;
use serde_json::{Map, Value};
use tracing::warn;

/// Coerces a loosely-typed biomarker map into a `FeatureMap`.
///
/// `null` entries are treated as absent. Anything that is not a finite number
/// (or a string holding one) becomes 0 so one bad field never aborts scoring.
pub fn normalize_features(raw: &Map<String, Value>) -> FeatureMap {
    raw.iter()
        .filter_map(|(name, value)| coerce_feature(name, value).map(|v| (name.clone(), v)))
        .collect()
}

fn coerce_feature(name: &str, value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        other => match numeric_value(other) {
            Some(v) => Some(v),
            None => {
                warn!("Biomarker {} has non-numeric value {}, using 0", name, other);
                Some(0.0)
            }
        },
    }
}

/// Reads a finite number from a JSON number or numeric string.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
