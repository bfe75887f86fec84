use crate::analyzer::daily::collapse_to_daily;
use crate::model::{CycleSpan, FLOW_FEATURE, FeatureMap, FlagLevel, HealthFlags, Reading};
use std::collections::BTreeMap;

/// Summed cycle flow above which a cycle counts as heavy bleeding.
pub const MENORRHAGIA_CYCLE_ML: f64 = 80.0;

/// Latest recorded value of every biomarker, plus the latest flow volume.
pub fn latest_features(readings: &[Reading]) -> FeatureMap {
    let mut ordered: Vec<&Reading> = readings.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);

    let mut latest = FeatureMap::new();
    for reading in ordered {
        if let Some(flow) = reading.flow_ml {
            latest.insert(FLOW_FEATURE.to_string(), flow);
        }
        for (name, value) in &reading.biomarkers {
            latest.insert(name.clone(), *value);
        }
    }
    latest
}

fn flag(latest: &FeatureMap, name: &str, classify: impl Fn(f64) -> FlagLevel) -> Option<FlagLevel> {
    latest.get(name).map(|&v| classify(v))
}

fn high_if(condition: bool) -> FlagLevel {
    if condition { FlagLevel::High } else { FlagLevel::Low }
}

/// Quick per-metric flags from the latest values and the cycles whose total
/// flow exceeds [`MENORRHAGIA_CYCLE_ML`].
pub fn health_flags(user_id: &str, readings: &[Reading], spans: &[CycleSpan]) -> HealthFlags {
    let latest = latest_features(readings);

    let checks = [
        ("anemia_risk", flag(&latest, "hb", |hb| high_if(hb < 12.0))),
        ("ph_alert", flag(&latest, "ph", |ph| high_if(ph > 4.5))),
        ("inflammation", flag(&latest, "crp", |crp| high_if(crp > 10.0))),
        (
            "diabetes_flag",
            flag(&latest, "hba1c_ratio", |a1c| {
                if a1c >= 6.5 {
                    FlagLevel::High
                } else if a1c >= 5.7 {
                    FlagLevel::Moderate
                } else {
                    FlagLevel::Low
                }
            }),
        ),
        ("clots_alert", flag(&latest, "clots_score", |c| high_if(c >= 2.0))),
    ];
    let flags: BTreeMap<String, FlagLevel> = checks
        .into_iter()
        .filter_map(|(name, level)| level.map(|l| (name.to_string(), l)))
        .collect();

    let daily = collapse_to_daily(readings);
    let menorrhagia_cycles = spans
        .iter()
        .filter(|span| {
            let total: f64 = daily
                .iter()
                .filter(|d| span.contains(d.day))
                .map(|d| d.flow_ml)
                .sum();
            total > MENORRHAGIA_CYCLE_ML
        })
        .map(|span| span.id)
        .collect();

    HealthFlags {
        user_id: user_id.to_string(),
        latest,
        flags,
        menorrhagia_cycles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_datetime;
    use chrono::NaiveDate;

    fn reading(ts: &str, flow: Option<f64>, biomarkers: &[(&str, f64)]) -> Reading {
        Reading {
            user_id: "u1".into(),
            timestamp: parse_datetime(ts).unwrap(),
            flow_ml: flow,
            biomarkers: biomarkers.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn span(id: i64, start: &str, end: &str) -> CycleSpan {
        CycleSpan {
            id,
            user_id: "u1".into(),
            start_date: start.parse::<NaiveDate>().unwrap(),
            end_date: end.parse::<NaiveDate>().unwrap(),
        }
    }

    #[test]
    fn latest_value_wins_regardless_of_input_order() {
        let readings = vec![
            reading("2024-04-02T08:00:00Z", Some(30.0), &[("hb", 11.0)]),
            reading("2024-04-01T08:00:00Z", Some(50.0), &[("hb", 13.5), ("crp", 4.0)]),
            reading("2024-04-03T08:00:00Z", None, &[]),
        ];
        let latest = latest_features(&readings);
        assert_eq!(latest.get("hb"), Some(&11.0));
        assert_eq!(latest.get("crp"), Some(&4.0));
        assert_eq!(latest.get("flow_ml"), Some(&30.0));
    }

    #[test]
    fn flags_follow_reference_bands() {
        let readings = vec![reading(
            "2024-04-01T08:00:00Z",
            Some(10.0),
            &[("hb", 11.0), ("ph", 4.0), ("crp", 12.0), ("hba1c_ratio", 6.0), ("clots_score", 2.0)],
        )];
        let result = health_flags("u1", &readings, &[]);
        assert_eq!(result.flags["anemia_risk"], FlagLevel::High);
        assert_eq!(result.flags["ph_alert"], FlagLevel::Low);
        assert_eq!(result.flags["inflammation"], FlagLevel::High);
        assert_eq!(result.flags["diabetes_flag"], FlagLevel::Moderate);
        assert_eq!(result.flags["clots_alert"], FlagLevel::High);
    }

    #[test]
    fn missing_metrics_have_no_flag() {
        let readings = vec![reading("2024-04-01T08:00:00Z", Some(10.0), &[])];
        assert!(health_flags("u1", &readings, &[]).flags.is_empty());
    }

    #[test]
    fn heavy_cycles_are_listed() {
        let readings = vec![
            reading("2024-04-01T08:00:00Z", Some(50.0), &[]),
            reading("2024-04-02T08:00:00Z", Some(40.0), &[]),
            reading("2024-04-20T08:00:00Z", Some(30.0), &[]),
        ];
        let spans = vec![span(1, "2024-04-01", "2024-04-19"), span(2, "2024-04-20", "2024-04-25")];
        assert_eq!(health_flags("u1", &readings, &spans).menorrhagia_cycles, vec![1]);
    }
}
