use crate::model::FeatureMap;

#[derive(Debug, Clone, Copy)]
enum Bound {
    Above(f64),
    Below(f64),
}

impl Bound {
    fn holds(self, value: f64) -> bool {
        match self {
            Bound::Above(t) => value > t,
            Bound::Below(t) => value < t,
        }
    }
}

#[derive(Debug)]
struct Band {
    bound: Bound,
    marker: &'static str,
    status: &'static str,
    detail: &'static str,
}

#[derive(Debug)]
struct NoteRule {
    biomarker: &'static str,
    label: &'static str,
    unit: &'static str,
    precision: usize,
    /// First matching band wins.
    bands: &'static [Band],
    /// Replaces the "NORMAL" line when the value is exactly zero.
    zero_line: Option<&'static str>,
}

const RED: &str = "🔴";
const YELLOW: &str = "🟡";
const GREEN: &str = "🟢";

static NOTE_RULES: [NoteRule; 16] = [
    NoteRule {
        biomarker: "crp",
        label: "CRP",
        unit: "",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Above(10.0),
                marker: RED,
                status: "HIGH",
                detail: "Possible infection or inflammation",
            },
            Band {
                bound: Bound::Above(5.0),
                marker: YELLOW,
                status: "ELEVATED",
                detail: "Mild inflammation",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "hb",
        label: "Hemoglobin",
        unit: "",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Below(12.0),
                marker: RED,
                status: "LOW",
                detail: "Possible anemia",
            },
            Band {
                bound: Bound::Below(13.0),
                marker: YELLOW,
                status: "BORDERLINE",
                detail: "Monitor closely",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "ph",
        label: "pH",
        unit: "",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Below(4.5),
                marker: RED,
                status: "LOW",
                detail: "Possible infection",
            },
            Band {
                bound: Bound::Below(5.0),
                marker: YELLOW,
                status: "BORDERLINE",
                detail: "Monitor",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "hba1c_ratio",
        label: "HbA1c",
        unit: "%",
        precision: 1,
        bands: &[
            Band { bound: Bound::Above(6.5), marker: RED, status: "HIGH", detail: "Diabetes risk" },
            Band {
                bound: Bound::Above(5.7),
                marker: YELLOW,
                status: "ELEVATED",
                detail: "Pre-diabetes",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "flow_ml",
        label: "Flow",
        unit: "ml",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Above(100.0),
                marker: RED,
                status: "HEAVY",
                detail: "Menorrhagia risk",
            },
            Band {
                bound: Bound::Above(60.0),
                marker: YELLOW,
                status: "MODERATE",
                detail: "Monitor",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "tsh_level",
        label: "TSH",
        unit: "",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Above(4.0),
                marker: RED,
                status: "HIGH",
                detail: "Thyroid dysfunction",
            },
            Band {
                bound: Bound::Below(0.4),
                marker: RED,
                status: "LOW",
                detail: "Hyperthyroidism",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "clots_score",
        label: "Clots",
        unit: "",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Above(3.0),
                marker: RED,
                status: "HEAVY",
                detail: "Possible menorrhagia",
            },
            Band {
                bound: Bound::Above(1.0),
                marker: YELLOW,
                status: "MODERATE",
                detail: "Monitor",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "fsh_level",
        label: "FSH",
        unit: "",
        precision: 1,
        bands: &[
            Band { bound: Bound::Above(8.0), marker: RED, status: "HIGH", detail: "Possible PCOS" },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "lh_level",
        label: "LH",
        unit: "",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Above(12.0),
                marker: RED,
                status: "HIGH",
                detail: "Possible PCOS",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "prolactin_level",
        label: "Prolactin",
        unit: "",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Above(20.0),
                marker: RED,
                status: "HIGH",
                detail: "Thyroid issue",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "esr",
        label: "ESR",
        unit: "",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Above(20.0),
                marker: RED,
                status: "ELEVATED",
                detail: "Possible inflammation",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "wbc_count",
        label: "WBC",
        unit: "",
        precision: 0,
        bands: &[
            Band {
                bound: Bound::Above(11000.0),
                marker: RED,
                status: "HIGH",
                detail: "Possible infection",
            },
            Band {
                bound: Bound::Below(4000.0),
                marker: YELLOW,
                status: "LOW",
                detail: "Immunosuppression risk",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "ca125",
        label: "CA-125",
        unit: "",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Above(35.0),
                marker: RED,
                status: "ELEVATED",
                detail: "Endometriosis/Cancer risk",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "estrogen",
        label: "Estrogen",
        unit: "",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Above(350.0),
                marker: RED,
                status: "HIGH",
                detail: "Endometriosis risk",
            },
            Band {
                bound: Bound::Below(50.0),
                marker: YELLOW,
                status: "LOW",
                detail: "Menopause/ovarian failure",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "blood_glucose",
        label: "Blood Glucose",
        unit: "",
        precision: 1,
        bands: &[
            Band { bound: Bound::Above(126.0), marker: RED, status: "HIGH", detail: "Diabetes" },
            Band {
                bound: Bound::Above(100.0),
                marker: YELLOW,
                status: "ELEVATED",
                detail: "Pre-diabetes",
            },
        ],
        zero_line: None,
    },
    NoteRule {
        biomarker: "pain_score",
        label: "Pain",
        unit: "/10",
        precision: 1,
        bands: &[
            Band {
                bound: Bound::Above(7.0),
                marker: RED,
                status: "SEVERE",
                detail: "Medical attention needed",
            },
            Band {
                bound: Bound::Above(4.0),
                marker: YELLOW,
                status: "MODERATE",
                detail: "Monitor closely",
            },
            Band { bound: Bound::Above(0.0), marker: GREEN, status: "MILD", detail: "" },
        ],
        zero_line: Some("🟢 No pain reported"),
    },
];

impl NoteRule {
    fn describe(&self, value: f64) -> String {
        let shown = format!("{:.*}{}", self.precision, value, self.unit);
        match self.bands.iter().find(|b| b.bound.holds(value)) {
            Some(b) if b.detail.is_empty() => {
                format!("{} {} is {} ({})", b.marker, self.label, b.status, shown)
            }
            Some(b) => format!(
                "{} {} is {} ({}) - {}",
                b.marker, self.label, b.status, shown, b.detail
            ),
            None => match self.zero_line {
                Some(line) if value == 0.0 => line.to_string(),
                _ => format!("{} {} is NORMAL ({})", GREEN, self.label, shown),
            },
        }
    }
}

/// One interpretation line per present biomarker that has a reference band,
/// in a fixed order. Absent biomarkers produce nothing.
pub fn interpret_biomarkers(features: &FeatureMap) -> Vec<String> {
    NOTE_RULES
        .iter()
        .filter_map(|rule| features.get(rule.biomarker).map(|&v| rule.describe(v)))
        .collect()
}
