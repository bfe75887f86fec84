use crate::model::{ConditionFinding, FeatureMap, RiskLevel};
use crate::risk::catalog::ConditionRule;
use std::collections::HashMap;
use tracing::debug;

/// Classifier probability above which a weak rule score is still reported.
pub const CLASSIFIER_OVERRIDE: f64 = 0.2;

fn level_for(score: f64) -> Option<RiskLevel> {
    if score >= 0.7 {
        Some(RiskLevel::High)
    } else if score >= 0.5 {
        Some(RiskLevel::Moderate)
    } else if score >= 0.3 {
        Some(RiskLevel::Low)
    } else {
        None
    }
}

/// At least 40% of the rule's entries must match. Integer form keeps the
/// boundary exact (2 of 5 passes).
fn passes_gate(matched: usize, rule_size: usize) -> bool {
    matched * 5 >= rule_size * 2
}

fn classifier_confidence(probabilities: &HashMap<String, f64>, name: &str) -> f64 {
    probabilities
        .get(name)
        .copied()
        .filter(|p| p.is_finite())
        .map_or(0.0, |p| p.clamp(0.0, 1.0))
}

/// Evaluates one rule; `None` when the rule produces no finding.
pub fn evaluate_rule(
    rule: &ConditionRule,
    features: &FeatureMap,
    probabilities: &HashMap<String, f64>,
) -> Option<ConditionFinding> {
    let mut risk_score = 0.0;
    let mut total_weight = 0.0;
    let mut matched_count = 0;
    let mut present = FeatureMap::new();

    for criterion in rule.criteria {
        let Some(&value) = features.get(criterion.biomarker) else {
            continue;
        };
        present.insert(criterion.biomarker.to_string(), value);
        total_weight += criterion.weight;
        if criterion.comparator.passes(value, criterion.threshold) {
            risk_score += criterion.weight;
            matched_count += 1;
        }
    }

    if !passes_gate(matched_count, rule.size()) {
        debug!("{}: {}/{} matched, below gate", rule.name, matched_count, rule.size());
        return None;
    }
    if total_weight == 0.0 {
        return None;
    }

    let final_score = risk_score / total_weight;
    let model_confidence = classifier_confidence(probabilities, rule.name);
    let risk_level = match level_for(final_score) {
        Some(level) => level,
        None if model_confidence > CLASSIFIER_OVERRIDE => RiskLevel::Low,
        None => return None,
    };

    Some(ConditionFinding {
        condition: rule.name.to_string(),
        risk_level,
        confidence: final_score.max(model_confidence),
        matched_biomarkers: present,
        matched_count,
        total_count: rule.size(),
    })
}

/// Evaluates every rule and returns the findings, highest confidence first.
/// Equal confidences keep catalog order.
pub fn score_conditions(
    rules: &[ConditionRule],
    features: &FeatureMap,
    probabilities: &HashMap<String, f64>,
) -> Vec<ConditionFinding> {
    let mut findings: Vec<ConditionFinding> = rules
        .iter()
        .filter_map(|rule| evaluate_rule(rule, features, probabilities))
        .collect();
    findings.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    findings
}
