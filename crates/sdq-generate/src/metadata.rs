//! Local scenario name and tag heuristics.

use sdq_model::ScenarioTag;

pub const DEFAULT_SCENARIO_NAME: &str = "Clinical Data Quality Check";

/// `(subject keywords, context keywords, name)`: the first entry with a hit
/// in both lists names the scenario.
const NAME_PATTERNS: &[(&[&str], &[&str], &str)] = &[
    (
        &["adverse event", "ae"],
        &["inconsisten", "mismatch", "outcome", "action"],
        "AE Outcome and Action Inconsistencies",
    ),
    (
        &["serious adverse", "sae"],
        &["follow", "timeframe", "deadline"],
        "Serious AE Follow-Up Compliance",
    ),
    (
        &["adverse event", "ae"],
        &["missing", "incomplete", "required"],
        "Missing Required AE Data",
    ),
    (
        &["adverse event", "ae"],
        &["concomitant", "medication", "interaction"],
        "AE and Concomitant Medication Review",
    ),
    (
        &["lab", "laboratory"],
        &["missing", "baseline", "required"],
        "Missing Baseline Laboratory Values",
    ),
    (
        &["lab", "laboratory"],
        &["range", "normal", "abnormal", "reference"],
        "Laboratory Reference Range Validation",
    ),
    (
        &["creatinine", "renal"],
        &["missing", "baseline"],
        "Missing Baseline Creatinine Assessment",
    ),
    (
        &["vital sign", "blood pressure", "heart rate"],
        &["missing", "baseline"],
        "Missing Baseline Vital Signs",
    ),
    (
        &["vital sign"],
        &["abnormal", "clinically significant"],
        "Clinically Significant Vital Sign Changes",
    ),
    (
        &["protocol", "compliance"],
        &["deviation", "violation"],
        "Protocol Deviation Monitoring",
    ),
    (
        &["visit", "schedule"],
        &["window", "timing", "compliance"],
        "Visit Window Compliance Check",
    ),
    (
        &["eligibility", "inclusion", "exclusion"],
        &["criteria", "violation"],
        "Eligibility Criteria Validation",
    ),
    (
        &["missing", "data"],
        &["required", "mandatory"],
        "Missing Required Data Elements",
    ),
    (
        &["duplicate", "data"],
        &["entry", "record"],
        "Duplicate Data Entry Detection",
    ),
    (
        &["date", "inconsisten"],
        &["logic", "sequence"],
        "Date Logic Inconsistencies",
    ),
    (
        &["concomitant", "medication"],
        &["missing", "end date"],
        "Concomitant Medication End Date Missing",
    ),
    (
        &["dose", "dosing"],
        &["compliance", "adherence"],
        "Dosing Compliance Monitoring",
    ),
    (
        &["efficacy"],
        &["endpoint", "assessment"],
        "Efficacy Endpoint Assessment",
    ),
    (
        &["safety"],
        &["monitoring", "signal"],
        "Safety Signal Detection",
    ),
];

/// Word → name term used when no pattern matches.
const PRIORITY_TERMS: &[(&str, &str)] = &[
    ("adverse", "AE"),
    ("ae", "AE"),
    ("serious", "Serious"),
    ("sae", "SAE"),
    ("laboratory", "Lab"),
    ("lab", "Lab"),
    ("baseline", "Baseline"),
    ("vital", "Vital"),
    ("signs", "Signs"),
    ("protocol", "Protocol"),
    ("compliance", "Compliance"),
    ("missing", "Missing"),
    ("data", "Data"),
    ("medication", "Medication"),
    ("concomitant", "Concomitant"),
    ("efficacy", "Efficacy"),
    ("safety", "Safety"),
    ("endpoint", "Endpoint"),
    ("visit", "Visit"),
    ("window", "Window"),
    ("deviation", "Deviation"),
];

const NAME_SUFFIXES: &[&str] = &[
    "Validation",
    "Check",
    "Monitoring",
    "Assessment",
    "Review",
    "Compliance",
];

/// Words scanned for priority terms.
const TERM_WINDOW: usize = 15;
/// Most priority terms in a derived name.
const MAX_TERMS: usize = 4;

const TAG_KEYWORDS: &[(ScenarioTag, &[&str])] = &[
    (
        ScenarioTag::Safety,
        &[
            "adverse",
            "ae",
            "sae",
            "safety",
            "serious",
            "fatal",
            "death",
            "drug interaction",
            "vital sign",
            "blood pressure",
            "heart rate",
            "temperature",
            "allergic",
            "reaction",
        ],
    ),
    (
        ScenarioTag::Efficacy,
        &[
            "efficacy",
            "endpoint",
            "primary outcome",
            "secondary outcome",
            "response",
            "treatment effect",
            "improvement",
            "progression",
            "tumor",
            "survival",
        ],
    ),
    (
        ScenarioTag::DataQuality,
        &[
            "missing",
            "incomplete",
            "data entry",
            "format",
            "validation",
            "duplicate",
            "consistency",
            "completeness",
            "accuracy",
            "range check",
        ],
    ),
    (
        ScenarioTag::Compliance,
        &[
            "compliance",
            "adherence",
            "protocol",
            "inclusion",
            "exclusion",
            "eligibility",
            "visit window",
            "dosing",
            "medication compliance",
        ],
    ),
    (
        ScenarioTag::ProtocolDeviation,
        &[
            "deviation",
            "violation",
            "visit schedule",
            "procedure",
            "consent",
            "randomization",
            "enrollment",
            "withdrawal",
        ],
    ),
];

/// Keywords of three letters or fewer ("ae", "sae", "lab") match whole
/// words only; longer ones match anywhere.
fn mentions(lower: &str, keyword: &str) -> bool {
    if keyword.len() <= 3 {
        lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == keyword)
    } else {
        lower.contains(keyword)
    }
}

/// Professional scenario name for a free-text description.
pub fn suggest_scenario_name(description: &str) -> String {
    let lower = description.to_lowercase();

    if let Some((_, _, name)) = NAME_PATTERNS.iter().find(|(subjects, contexts, _)| {
        subjects.iter().any(|k| mentions(&lower, k)) && contexts.iter().any(|k| mentions(&lower, k))
    }) {
        return (*name).to_string();
    }

    let mut terms: Vec<&str> = Vec::new();
    for word in description.split_whitespace().take(TERM_WINDOW) {
        let clean = word
            .trim_matches(|c: char| matches!(c, '.' | ',' | '!' | '?' | ';' | ':'))
            .to_lowercase();
        if let Some((_, term)) = PRIORITY_TERMS.iter().find(|(key, _)| *key == clean)
            && !terms.contains(term)
        {
            terms.push(term);
        }
        if terms.len() >= MAX_TERMS {
            break;
        }
    }
    if terms.is_empty() {
        return DEFAULT_SCENARIO_NAME.to_string();
    }

    let mut name = terms.join(" ");
    if !NAME_SUFFIXES.iter().any(|suffix| name.contains(suffix)) {
        let suffix = if terms.iter().any(|t| matches!(*t, "Missing" | "Data")) {
            "Validation"
        } else if terms.iter().any(|t| matches!(*t, "AE" | "Safety")) {
            "Monitoring"
        } else {
            "Assessment"
        };
        name.push(' ');
        name.push_str(suffix);
    }
    name
}

/// Highest-scoring tag by keyword hits; ties go to the earlier tag and no
/// hits at all gives `Other`.
pub fn classify_tag(name: &str, description: &str) -> ScenarioTag {
    let combined = format!("{name} {description}").to_lowercase();
    let mut best = (ScenarioTag::Other, 0);
    for (tag, keywords) in TAG_KEYWORDS {
        let score = keywords.iter().filter(|k| mentions(&combined, k)).count();
        if score > best.1 {
            best = (*tag, score);
        }
    }
    best.0
}
