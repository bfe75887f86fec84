use crate::model::{ConditionFinding, OverallRisk, RiskLevel};

/// Reduces per-condition levels to one overall level. Only High and Moderate
/// findings count; Low findings alone leave the result at Low.
pub fn overall_from_levels<I>(levels: I) -> OverallRisk
where
    I: IntoIterator<Item = RiskLevel>,
{
    let (mut high, mut moderate) = (0usize, 0usize);
    for level in levels {
        match level {
            RiskLevel::High => high += 1,
            RiskLevel::Moderate => moderate += 1,
            RiskLevel::Low => {}
        }
    }

    match (high, moderate) {
        (h, _) if h >= 2 => OverallRisk::Critical,
        (1, _) => OverallRisk::High,
        (_, m) if m >= 2 => OverallRisk::Moderate,
        (_, 1) => OverallRisk::LowModerate,
        _ => OverallRisk::Low,
    }
}

pub fn assess_overall_risk(findings: &[ConditionFinding]) -> OverallRisk {
    overall_from_levels(findings.iter().map(|f| f.risk_level))
}
