// ThingSpeak-style channel feed parsing
use crate::model::{FLOW_FEATURE, ParserError, RawReading};
use crate::parser::Parser;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct ChannelFeed {
    #[serde(default)]
    feeds: Vec<Map<String, Value>>,
}

/// Parses a channel feed (`{"feeds": [{"created_at": .., "field1": ..}]}`)
/// into raw readings for one user.
///
/// Only fields named in `field_map` are kept; the one mapped to `flow_ml`
/// becomes the flow value, the rest become biomarkers.
pub struct FeedParser {
    user_id: String,
    field_map: HashMap<String, String>,
}

impl FeedParser {
    pub fn new(user_id: impl Into<String>, field_map: HashMap<String, String>) -> Self {
        Self {
            user_id: user_id.into(),
            field_map,
        }
    }

    fn entry_to_raw(&self, entry: &Map<String, Value>) -> RawReading {
        let timestamp = entry
            .get("created_at")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut flow_ml = None;
        let mut biomarkers = Map::new();
        for (field, name) in &self.field_map {
            let Some(value) = entry.get(field) else { continue };
            if value.is_null() {
                continue;
            }
            if name == FLOW_FEATURE {
                flow_ml = Some(value.clone());
            } else {
                biomarkers.insert(name.clone(), value.clone());
            }
        }

        RawReading {
            user_id: self.user_id.clone(),
            timestamp,
            flow_ml,
            biomarkers,
        }
    }
}

impl Parser for FeedParser {
    fn parse(&self, body: &str) -> Result<Vec<RawReading>, ParserError> {
        let feed: ChannelFeed =
            serde_json::from_str(body).map_err(|e| ParserError::MalformedFeed(e.to_string()))?;
        Ok(feed.feeds.iter().map(|entry| self.entry_to_raw(entry)).collect())
    }
}

/// Parses an import file: a JSON array of raw readings.
pub struct ImportParser;

impl Parser for ImportParser {
    fn parse(&self, body: &str) -> Result<Vec<RawReading>, ParserError> {
        serde_json::from_str(body).map_err(|e| ParserError::MalformedFeed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_map() -> HashMap<String, String> {
        HashMap::from([
            ("field1".to_string(), "flow_ml".to_string()),
            ("field2".to_string(), "hb".to_string()),
        ])
    }

    #[test]
    fn maps_fields_to_flow_and_biomarkers() {
        let body = json!({
            "channel": {"id": 42},
            "feeds": [
                {
                    "created_at": "2024-05-01T08:00:00Z",
                    "entry_id": 1,
                    "field1": "35.5",
                    "field2": "11.2",
                    "field3": "7"
                },
                {
                    "created_at": "2024-05-02T08:00:00Z",
                    "entry_id": 2,
                    "field1": null,
                    "field2": "12.0"
                }
            ]
        })
        .to_string();

        let raws = FeedParser::new("u1", field_map()).parse(&body).unwrap();
        assert_eq!(raws.len(), 2);
        assert_eq!(raws[0].user_id, "u1");
        assert_eq!(raws[0].flow_ml, Some(json!("35.5")));
        assert_eq!(raws[0].biomarkers.get("hb"), Some(&json!("11.2")));
        assert_eq!(raws[0].biomarkers.len(), 1);
        assert_eq!(raws[1].flow_ml, None);
    }

    #[test]
    fn missing_timestamp_is_left_for_validation() {
        let body = json!({"feeds": [{"field1": "5"}]}).to_string();
        let raws = FeedParser::new("u1", field_map()).parse(&body).unwrap();
        assert_eq!(raws[0].timestamp, "");
    }

    #[test]
    fn rejects_non_json_feed() {
        let result = FeedParser::new("u1", field_map()).parse("<html>");
        assert!(matches!(result, Err(ParserError::MalformedFeed(_))));
    }

    #[test]
    fn import_parser_reads_array() {
        let body = json!([
            {"user_id": "u1", "timestamp": "2024-05-01", "flow_ml": 10, "biomarkers": {"hb": 11}},
            {"user_id": "u1", "timestamp": "2024-05-02"}
        ])
        .to_string();
        let raws = ImportParser.parse(&body).unwrap();
        assert_eq!(raws.len(), 2);
        assert!(raws[1].biomarkers.is_empty());
    }
}
