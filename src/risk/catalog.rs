//! Static catalog of condition rules.
//!
//! Each rule is an ordered list of weighted threshold tests over named
//! biomarkers. Weights within a rule sum to 1.0.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// Passes when `value >= threshold`.
    Min,
    /// Passes when `value <= threshold`.
    Max,
}

impl Comparator {
    pub fn passes(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::Min => value >= threshold,
            Comparator::Max => value <= threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Criterion {
    pub biomarker: &'static str,
    pub comparator: Comparator,
    pub threshold: f64,
    pub weight: f64,
}

#[derive(Debug)]
pub struct ConditionRule {
    pub name: &'static str,
    pub criteria: &'static [Criterion],
}

impl ConditionRule {
    /// Number of entries the rule defines, present in the input or not.
    pub fn size(&self) -> usize {
        self.criteria.len()
    }
}

pub const PCOS: &str = "PCOS/PCOD Risk";
pub const PID: &str = "PID Risk";
pub const ENDOMETRIOSIS: &str = "Endometriosis Risk";
pub const OVARIAN_CANCER: &str = "Ovarian Cancer Risk";
pub const ANEMIA: &str = "Anemia Risk";
pub const THYROID: &str = "Thyroid Imbalance";
pub const DIABETES: &str = "Diabetes Risk";
pub const INFECTION: &str = "Infection/Inflammation";
pub const MENORRHAGIA: &str = "Menorrhagia";

const fn min(biomarker: &'static str, threshold: f64, weight: f64) -> Criterion {
    Criterion { biomarker, comparator: Comparator::Min, threshold, weight }
}

const fn max(biomarker: &'static str, threshold: f64, weight: f64) -> Criterion {
    Criterion { biomarker, comparator: Comparator::Max, threshold, weight }
}

static PCOS_CRITERIA: [Criterion; 6] = [
    min("lh_level", 15.0, 0.25),     // mIU/mL
    max("fsh_level", 8.0, 0.2),      // LH:FSH > 2:1
    min("amh_level", 4.0, 0.25),     // ng/mL
    min("androgens", 80.0, 0.15),    // testosterone, ng/dL
    min("blood_glucose", 100.0, 0.1),
    min("weight_gain", 5.0, 0.05),   // kg
];

static PID_CRITERIA: [Criterion; 5] = [
    min("crp", 10.0, 0.3),           // mg/L
    min("wbc_count", 11000.0, 0.25), // per µL
    min("fever", 37.5, 0.2),         // °C
    max("vaginal_ph", 4.5, 0.15),
    min("tenderness", 2.0, 0.1),
];

static ENDOMETRIOSIS_CRITERIA: [Criterion; 4] = [
    min("estrogen", 350.0, 0.3),     // pg/mL
    min("ca125", 35.0, 0.25),        // U/mL
    min("pain_score", 7.0, 0.25),
    min("pain_during_intercourse", 1.0, 0.2),
];

static OVARIAN_CANCER_CRITERIA: [Criterion; 4] = [
    min("ca125", 35.0, 0.4),
    min("weight_loss", 5.0, 0.2),
    min("bloating", 1.0, 0.2),
    min("appetite_loss", 1.0, 0.2),
];

static ANEMIA_CRITERIA: [Criterion; 2] = [
    max("hb", 12.0, 0.6),            // g/dL
    min("flow_ml", 80.0, 0.4),
];

// Hyperthyroid TSH arrives as its own feature so both directions can be scored.
static THYROID_CRITERIA: [Criterion; 3] = [
    min("tsh_level", 4.0, 0.4),
    max("tsh_level_hyper", 0.4, 0.4),
    min("prolactin_level", 20.0, 0.2),
];

static DIABETES_CRITERIA: [Criterion; 2] = [
    min("blood_glucose", 126.0, 0.5), // fasting, mg/dL
    min("hba1c_ratio", 6.5, 0.5),
];

static INFECTION_CRITERIA: [Criterion; 4] = [
    min("crp", 5.0, 0.3),
    min("esr", 20.0, 0.25),          // mm/hr
    min("wbc_count", 11000.0, 0.25),
    max("vaginal_ph", 5.0, 0.2),
];

static MENORRHAGIA_CRITERIA: [Criterion; 3] = [
    min("flow_ml", 80.0, 0.5),
    min("clots_score", 3.0, 0.3),
    min("pain_score", 6.0, 0.2),
];

pub static CONDITION_RULES: [ConditionRule; 9] = [
    ConditionRule { name: PCOS, criteria: &PCOS_CRITERIA },
    ConditionRule { name: PID, criteria: &PID_CRITERIA },
    ConditionRule { name: ENDOMETRIOSIS, criteria: &ENDOMETRIOSIS_CRITERIA },
    ConditionRule { name: OVARIAN_CANCER, criteria: &OVARIAN_CANCER_CRITERIA },
    ConditionRule { name: ANEMIA, criteria: &ANEMIA_CRITERIA },
    ConditionRule { name: THYROID, criteria: &THYROID_CRITERIA },
    ConditionRule { name: DIABETES, criteria: &DIABETES_CRITERIA },
    ConditionRule { name: INFECTION, criteria: &INFECTION_CRITERIA },
    ConditionRule { name: MENORRHAGIA, criteria: &MENORRHAGIA_CRITERIA },
];

pub fn find_rule(name: &str) -> Option<&'static ConditionRule> {
    CONDITION_RULES.iter().find(|r| r.name == name)
}
