// Core structs: Reading, DailyFlow, CycleSpan, findings and assessments
use crate::utils::serialize_rounded_2;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

/// Sparse biomarker vector: biomarker name -> numeric value.
pub type FeatureMap = BTreeMap<String, f64>;

/// Name of the biomarker that carries the flow volume of a reading.
pub const FLOW_FEATURE: &str = "flow_ml";

/// A validated reading. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub user_id: String,
    /// Keeps the offset it was recorded with; `day()` is the local date.
    pub timestamp: DateTime<FixedOffset>,
    /// Missing flow counts as zero for aggregation.
    pub flow_ml: Option<f64>,
    #[serde(default)]
    pub biomarkers: FeatureMap,
}

impl Reading {
    pub fn flow_or_zero(&self) -> f64 {
        self.flow_ml.unwrap_or(0.0)
    }

    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Loosely-typed reading as it arrives from a feed or an import file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub user_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub flow_ml: Option<serde_json::Value>,
    #[serde(default)]
    pub biomarkers: serde_json::Map<String, serde_json::Value>,
}

/// Summed flow for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyFlow {
    pub day: NaiveDate,
    pub flow_ml: f64,
}

/// Start/end pair produced by the segmenter before the repository assigns an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SpanBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SpanBounds {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleSpan {
    pub id: i64,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CycleSpan {
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// Inclusive length in calendar days.
    pub fn length_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSummary {
    pub cycle_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    pub total_flow_ml: f64,
    pub avg_daily_ml: f64,
    pub peak_ml: f64,
    pub peak_day: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub user_id: String,
    pub cycles: usize,
    pub avg_cycle_length_days: Option<f64>,
    pub avg_total_flow_ml: Option<f64>,
}

/// Severity of a single condition finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall level reduced from all findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverallRisk {
    Low,
    #[serde(rename = "Low-Moderate")]
    LowModerate,
    Moderate,
    High,
    Critical,
}

impl OverallRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::LowModerate => "Low-Moderate",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for OverallRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionFinding {
    pub condition: String,
    pub risk_level: RiskLevel,
    #[serde(serialize_with = "serialize_rounded_2")]
    pub confidence: f64,
    /// Values of the rule's biomarkers that were present in the input.
    #[serde(rename = "biomarkers")]
    pub matched_biomarkers: FeatureMap,
    pub matched_count: usize,
    pub total_count: usize,
}

/// Output of the optional external classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierOutput {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub probabilities: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub overall_risk_level: OverallRisk,
    pub findings: Vec<ConditionFinding>,
    pub advice: Vec<String>,
    pub biomarker_notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthFlags {
    pub user_id: String,
    pub latest: FeatureMap,
    pub flags: BTreeMap<String, FlagLevel>,
    pub menorrhagia_cycles: Vec<i64>,
}

/// Everything the daemon writes for one user per tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserReport {
    pub user_id: String,
    pub generated_at: DateTime<Utc>,
    pub readings: usize,
    pub cycles: Vec<CycleSummary>,
    pub overall: OverallSummary,
    pub health_flags: HealthFlags,
    pub risk: RiskAssessment,
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
    #[error("malformed feed: {0}")]
    MalformedFeed(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("invalid stored timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),
    #[error("invalid stored biomarkers: {0}")]
    InvalidBiomarkers(#[from] serde_json::Error),
    #[error("cycle store lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response status {0}")]
    InvalidResponse(u16),
    #[error(transparent)]
    Parse(#[from] ParserError),
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("http error: {0}")]
    HttpError(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response status {0}")]
    InvalidResponse(u16),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("cannot write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot encode report: {0}")]
    Json(#[from] serde_json::Error),
}
