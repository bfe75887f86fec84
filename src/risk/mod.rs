// Risk module: rule catalog, scoring, aggregation and advice.

pub mod advice;
pub mod aggregate;
pub mod catalog;
pub mod classifier;
pub mod scorer;

use crate::analyzer::biomarker_notes::interpret_biomarkers;
use crate::model::{FeatureMap, RiskAssessment};
use std::collections::HashMap;
use tracing::info;

pub use advice::generate_advice;
pub use aggregate::{assess_overall_risk, overall_from_levels};
pub use catalog::{CONDITION_RULES, ConditionRule, find_rule};
pub use classifier::{Classifier, HttpClassifier, probabilities_or_empty};
pub use scorer::{evaluate_rule, score_conditions};

/// Full assessment of one feature map. `probabilities` holds the optional
/// classifier output keyed by condition name; pass an empty map without one.
pub fn assess(features: &FeatureMap, probabilities: &HashMap<String, f64>) -> RiskAssessment {
    let findings = score_conditions(&CONDITION_RULES, features, probabilities);
    let overall_risk_level = assess_overall_risk(&findings);
    let advice = generate_advice(&findings, overall_risk_level);
    let biomarker_notes = interpret_biomarkers(features);

    info!(
        "Assessed {} features: {} findings, overall {}",
        features.len(),
        findings.len(),
        overall_risk_level
    );

    RiskAssessment {
        overall_risk_level,
        findings,
        advice,
        biomarker_notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OverallRisk, RiskLevel};
    use crate::risk::catalog::{ANEMIA, MENORRHAGIA};

    #[test]
    fn heavy_flow_and_low_hb() {
        let features: FeatureMap = [("hb", 10.0), ("flow_ml", 95.0), ("clots_score", 4.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let assessment = assess(&features, &HashMap::new());

        let names: Vec<&str> = assessment.findings.iter().map(|f| f.condition.as_str()).collect();
        assert_eq!(names, vec![ANEMIA, MENORRHAGIA]);
        assert!(assessment.findings.iter().all(|f| f.risk_level == RiskLevel::High));
        assert_eq!(assessment.overall_risk_level, OverallRisk::Critical);
        assert!(assessment.advice[0].starts_with("🚨 CRITICAL RISK"));
        assert_eq!(assessment.biomarker_notes.len(), 3);
    }

    #[test]
    fn empty_features_are_low_with_advice() {
        let assessment = assess(&FeatureMap::new(), &HashMap::new());
        assert_eq!(assessment.overall_risk_level, OverallRisk::Low);
        assert!(assessment.findings.is_empty());
        assert!(!assessment.advice.is_empty());
        assert!(assessment.biomarker_notes.is_empty());
    }

    #[test]
    fn serializes_rounded_confidence() {
        let features: FeatureMap = [("blood_glucose", 130.0), ("hba1c_ratio", 5.0)]
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        let probabilities = HashMap::from([("Diabetes Risk".to_string(), 0.66666)]);
        let json = serde_json::to_value(assess(&features, &probabilities)).unwrap();

        assert_eq!(json["overall_risk_level"], "Low-Moderate");
        assert_eq!(json["findings"][0]["confidence"], 0.67);
        assert_eq!(json["findings"][0]["biomarkers"]["blood_glucose"], 130.0);
    }
}
