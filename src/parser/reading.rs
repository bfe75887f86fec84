use crate::model::{FLOW_FEATURE, ParserError, RawReading, Reading};
use crate::normalizer::{normalize_features, numeric_value};
use crate::utils::parse_datetime;
use serde_json::Value;

/// Validates a raw record.
///
/// The timestamp must parse and the flow, when given, must be a non-negative
/// number. Biomarkers are coerced, never rejected.
pub fn parse_reading(raw: &RawReading) -> Result<Reading, ParserError> {
    let timestamp = parse_datetime(&raw.timestamp)
        .ok_or_else(|| ParserError::InvalidTimestamp(raw.timestamp.clone()))?;

    let flow_ml = match &raw.flow_ml {
        None | Some(Value::Null) => None,
        Some(value) => match numeric_value(value) {
            Some(v) if v >= 0.0 => Some(v),
            _ => {
                return Err(ParserError::InvalidValue {
                    field: FLOW_FEATURE.to_string(),
                    value: value.to_string(),
                });
            }
        },
    };

    Ok(Reading {
        user_id: raw.user_id.clone(),
        timestamp,
        flow_ml,
        biomarkers: normalize_features(&raw.biomarkers),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn raw(timestamp: &str, flow: Option<Value>) -> RawReading {
        RawReading {
            user_id: "u1".into(),
            timestamp: timestamp.into(),
            flow_ml: flow,
            biomarkers: Map::new(),
        }
    }

    #[test]
    fn accepts_numeric_string_flow() {
        let reading = parse_reading(&raw("2024-01-01T10:00:00Z", Some(json!("12.5")))).unwrap();
        assert_eq!(reading.flow_ml, Some(12.5));
    }

    #[test]
    fn missing_flow_is_none() {
        let reading = parse_reading(&raw("2024-01-01", None)).unwrap();
        assert_eq!(reading.flow_ml, None);
        assert_eq!(reading.flow_or_zero(), 0.0);
        let reading = parse_reading(&raw("2024-01-01", Some(Value::Null))).unwrap();
        assert_eq!(reading.flow_ml, None);
    }

    #[test]
    fn rejects_bad_timestamp() {
        let err = parse_reading(&raw("not a date", Some(json!(3)))).unwrap_err();
        assert!(matches!(err, ParserError::InvalidTimestamp(_)));
    }

    #[test]
    fn rejects_non_numeric_or_negative_flow() {
        assert!(parse_reading(&raw("2024-01-01", Some(json!("heavy")))).is_err());
        assert!(parse_reading(&raw("2024-01-01", Some(json!(-4.0)))).is_err());
    }
}
