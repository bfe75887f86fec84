use crate::model::{ConditionFinding, OverallRisk};
use crate::risk::catalog::{
    ANEMIA, DIABETES, ENDOMETRIOSIS, INFECTION, MENORRHAGIA, OVARIAN_CANCER, PCOS, PID, THYROID,
};

struct AdviceBlock {
    condition: &'static str,
    lines: &'static [&'static str],
}

static ADVICE_BLOCKS: [AdviceBlock; 9] = [
    AdviceBlock {
        condition: ANEMIA,
        lines: &[
            "• Eat iron-rich foods: spinach, beetroot, lentils, red meat",
            "• Consider iron supplements (ask doctor first)",
            "• Get a blood test to confirm",
        ],
    },
    AdviceBlock {
        condition: PCOS,
        lines: &[
            "• Track your menstrual cycles",
            "• Maintain healthy weight",
            "• See a gynecologist for testing",
        ],
    },
    AdviceBlock {
        condition: THYROID,
        lines: &[
            "• Get thyroid blood tests (T3, T4, TSH)",
            "• See an endocrinologist",
            "• Eat a balanced diet",
        ],
    },
    AdviceBlock {
        condition: DIABETES,
        lines: &[
            "• Eat less sugar, more fiber",
            "• Exercise regularly",
            "• Get blood sugar tests",
            "• See a diabetes specialist",
        ],
    },
    AdviceBlock {
        condition: INFECTION,
        lines: &[
            "• See a doctor immediately",
            "• Take prescribed antibiotics",
            "• Stay clean and hydrated",
        ],
    },
    AdviceBlock {
        condition: MENORRHAGIA,
        lines: &[
            "• Track how many pads you use",
            "• See a gynecologist",
            "• Consider iron supplements",
        ],
    },
    AdviceBlock {
        condition: ENDOMETRIOSIS,
        lines: &[
            "• See a gynecologist for exam",
            "• Track your pain patterns",
            "• Consider anti-inflammatory diet",
        ],
    },
    AdviceBlock {
        condition: PID,
        lines: &[
            "• See a doctor immediately",
            "• Take all prescribed antibiotics",
            "• Avoid sex until treated",
        ],
    },
    AdviceBlock {
        condition: OVARIAN_CANCER,
        lines: &[
            "• See a gynecologic oncologist promptly",
            "• Ask about a pelvic ultrasound and repeat CA-125",
            "• Note any lasting bloating or appetite changes",
        ],
    },
];

static GENERIC_BLOCK: &[&str] = &[
    "• Discuss these results with your doctor",
    "• Repeat the test if symptoms persist",
];

static TIPS_WITH_FINDINGS: &[&str] = &[
    "\n💡 General Tips:",
    "• See your doctor regularly",
    "• Follow treatment plans",
    "• Don't ignore symptoms",
];

static TIPS_WITHOUT_FINDINGS: &[&str] = &[
    "\n💡 Stay Healthy:",
    "• Regular check-ups",
    "• Eat well and exercise",
    "• Track your cycle",
];

fn advice_lines(condition: &str) -> &'static [&'static str] {
    ADVICE_BLOCKS
        .iter()
        .find(|b| b.condition == condition)
        .map_or(GENERIC_BLOCK, |b| b.lines)
}

fn headline(overall: OverallRisk, has_findings: bool) -> &'static str {
    if !has_findings {
        return "✅ NO RISK DETECTED: You are good to go! \
                Your biomarkers appear normal.";
    }
    match overall {
        OverallRisk::Critical => {
            "🚨 CRITICAL RISK: Multiple serious conditions detected. \
             Seek immediate medical attention."
        }
        OverallRisk::High => {
            "⚠️ HIGH RISK: Serious conditions detected. Consult a doctor within 24-48 hours."
        }
        OverallRisk::Moderate => {
            "⚡ MODERATE RISK: Conditions require monitoring. Schedule a doctor visit within a week."
        }
        OverallRisk::LowModerate | OverallRisk::Low => {
            "📊 LOW RISK: Some conditions detected. Monitor closely and consider preventive care."
        }
    }
}

/// Builds the ordered advice list: headline, one block per finding in
/// descending confidence, then closing tips.
pub fn generate_advice(findings: &[ConditionFinding], overall: OverallRisk) -> Vec<String> {
    let mut advice = vec![headline(overall, !findings.is_empty()).to_string()];

    if findings.is_empty() {
        advice.push(
            "\n✅ No specific conditions detected. \
             Your biomarkers appear to be within normal ranges."
                .to_string(),
        );
        advice.extend(TIPS_WITHOUT_FINDINGS.iter().map(|s| s.to_string()));
        return advice;
    }

    // Callers normally pass scorer output, which is already sorted; sort
    // again so the order never depends on that.
    let mut ordered: Vec<&ConditionFinding> = findings.iter().collect();
    ordered.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    advice.push(format!("\n🔍 Detected Conditions ({}):", ordered.len()));
    for finding in ordered {
        let percent = (finding.confidence * 100.0).trunc() as i64;
        advice.push(format!(
            "\n📋 {} ({} Risk - {}% confidence):",
            finding.condition, finding.risk_level, percent
        ));
        advice.extend(advice_lines(&finding.condition).iter().map(|s| s.to_string()));
    }

    advice.extend(TIPS_WITH_FINDINGS.iter().map(|s| s.to_string()));
    advice
}
