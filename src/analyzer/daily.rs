use crate::model::{DailyFlow, RawReading, Reading};
use crate::parser::parse_reading;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

/// Collapses readings into one summed flow value per UTC calendar day,
/// ascending by day. Readings without flow contribute 0.
pub fn collapse_to_daily(readings: &[Reading]) -> Vec<DailyFlow> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for reading in readings {
        *by_day.entry(reading.day()).or_insert(0.0) += reading.flow_or_zero();
    }

    by_day
        .into_iter()
        .map(|(day, flow_ml)| DailyFlow { day, flow_ml })
        .collect()
}

/// Validates raw records, dropping the malformed ones.
pub fn valid_readings(raw: &[RawReading]) -> Vec<Reading> {
    raw.iter()
        .filter_map(|r| match parse_reading(r) {
            Ok(reading) => Some(reading),
            Err(e) => {
                warn!("Skipping reading for {} at {:?}: {}", r.user_id, r.timestamp, e);
                None
            }
        })
        .collect()
}

pub fn collapse_raw_to_daily(raw: &[RawReading]) -> Vec<DailyFlow> {
    collapse_to_daily(&valid_readings(raw))
}
