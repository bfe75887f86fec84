use crate::model::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct SensorConfig {
    pub feed_url: String,
    /// User the sensor's readings are recorded for.
    pub user_id: String,
    #[serde(default = "default_results")]
    pub results: u32,
    /// Feed field name -> feature name, e.g. `"field1": "flow_ml"`.
    #[serde(default = "default_field_map")]
    pub field_map: HashMap<String, String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    pub endpoint: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// Users to report on besides the sensor's user and anyone already stored.
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub sensor: Option<SensorConfig>,
    #[serde(default)]
    pub classifier: Option<ClassifierConfig>,
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
    /// JSON array of readings loaded once at startup.
    #[serde(default)]
    pub import_path: Option<String>,
}

fn default_database_path() -> String {
    "flow.db".to_string()
}

fn default_check_interval() -> u64 {
    900
}

fn default_report_dir() -> String {
    "reports".to_string()
}

fn default_results() -> u32 {
    100
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_field_map() -> HashMap<String, String> {
    [
        ("field1", "flow_ml"),
        ("field2", "hb"),
        ("field3", "ph"),
        ("field4", "crp"),
        ("field5", "hba1c_ratio"),
        ("field6", "clots_score"),
    ]
    .into_iter()
    .map(|(field, name)| (field.to_string(), name.to_string()))
    .collect()
}

impl AppConfig {
    /// Configured users plus the sensor's user, without duplicates.
    pub fn tracked_users(&self) -> Vec<String> {
        let mut users = self.users.clone();
        if let Some(sensor) = &self.sensor {
            users.push(sensor.user_id.clone());
        }
        users.sort();
        users.dedup();
        users
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.database_path, "flow.db");
        assert_eq!(config.check_interval_seconds, 900);
        assert_eq!(config.report_dir, "reports");
        assert!(config.sensor.is_none());
        assert!(config.classifier.is_none());
        assert!(config.tracked_users().is_empty());
    }

    #[test]
    fn sensor_section_fills_defaults() {
        let config = parse_config(
            r#"{
                "users": ["bob", "alice"],
                "sensor": {
                    "feed_url": "https://api.thingspeak.com/channels/7/feeds.json",
                    "user_id": "alice"
                },
                "classifier": {"endpoint": "http://localhost:8000/predict", "timeout_seconds": 3}
            }"#,
        )
        .unwrap();

        let sensor = config.sensor.as_ref().unwrap();
        assert_eq!(sensor.results, 100);
        assert_eq!(sensor.field_map.get("field1").map(String::as_str), Some("flow_ml"));
        assert_eq!(config.classifier.as_ref().unwrap().timeout_seconds, 3);
        assert_eq!(config.tracked_users(), vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn example_config_parses() {
        let config = parse_config(include_str!("../config.example.json")).unwrap();
        assert_eq!(config.tracked_users(), vec!["demo-user".to_string()]);
        assert_eq!(config.sensor.unwrap().field_map.len(), 6);
    }

    #[test]
    fn rejects_bad_json() {
        assert!(matches!(parse_config("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(load_config("/nonexistent/config.json"), Err(ConfigError::Io(_))));
    }
}
