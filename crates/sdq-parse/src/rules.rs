//! Ordered `(pattern, extractor)` rule battery.
//!
//! Rules run in declaration order and each scans the whole text. The
//! category decides how a match interacts with earlier matches (see
//! [`crate::extract`]).

use std::sync::LazyLock;

use regex::{Captures, Regex};
use sdq_model::{Domain, Operator, PLACEHOLDER_FIELD};

use crate::fields::{COMPARISON_ALTERNATION, comparison_operator, is_cdash_variable};

/// Rule family, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleCategory {
    /// Null, not-null and dataset-presence phrasing. Matches claim their span.
    Null,
    Equality,
    Comparison,
    /// Domain-specific named fields with fixed operators.
    Named,
    /// Result columns qualified by a test code.
    TestQualified,
    /// Bare CDASH variable references.
    Mention,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Null => "null",
            RuleCategory::Equality => "equality",
            RuleCategory::Comparison => "comparison",
            RuleCategory::Named => "named",
            RuleCategory::TestQualified => "test",
            RuleCategory::Mention => "mention",
        }
    }
}

/// Field/operator/value recovered from one match, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub field: String,
    pub operator: Operator,
    pub value: String,
    pub test: Option<&'static str>,
    /// Field came from a generic uppercase token and must pass the
    /// vocabulary filter.
    pub generic: bool,
}

impl Draft {
    fn fixed(field: &str, operator: Operator, value: &str) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value: value.to_string(),
            test: None,
            generic: false,
        }
    }

    fn generic(field: &str, operator: Operator, value: &str) -> Self {
        Self {
            generic: true,
            ..Self::fixed(field, operator, value)
        }
    }
}

/// How capture groups become a [`Draft`].
#[derive(Clone, Copy)]
pub enum Extract {
    /// Field in group 1, no value.
    FieldUnary(Operator),
    /// Field in group 1, value in the first non-empty later group.
    FieldValue(Operator),
    /// Field in group 1, operator in group 2, value in group 3.
    FieldOpValue,
    /// Fixed field, no value.
    Unary(&'static str, Operator),
    /// Fixed field and operator, value in the first non-empty group.
    Value(&'static str, Operator),
    /// Fixed field, operator in group 1, value in group 2.
    OpValue(&'static str),
    /// Fully fixed clause.
    Fixed(&'static str, Operator, &'static str),
    /// Result field qualified by a test code; operator in group 1, value in
    /// group 2.
    Test {
        field: &'static str,
        test: &'static str,
    },
    Custom(fn(&Captures<'_>) -> Option<Draft>),
}

pub struct Rule {
    pub name: &'static str,
    pub category: RuleCategory,
    pub pattern: Regex,
    pub extract: Extract,
}

impl Rule {
    fn new(name: &'static str, category: RuleCategory, pattern: &str, extract: Extract) -> Self {
        let pattern = Regex::new(pattern).unwrap_or_else(|e| panic!("Invalid {name} regex: {e}"));
        Self {
            name,
            category,
            pattern,
            extract,
        }
    }

    /// Apply the extractor to one match.
    pub fn draft(&self, caps: &Captures<'_>) -> Option<Draft> {
        match self.extract {
            Extract::FieldUnary(op) => Some(Draft::generic(group(caps, 1)?, op, "")),
            Extract::FieldValue(op) => {
                Some(Draft::generic(group(caps, 1)?, op, first_group(caps, 2)?))
            }
            Extract::FieldOpValue => {
                let op = parse_operator(group(caps, 2)?)?;
                Some(Draft::generic(group(caps, 1)?, op, group(caps, 3)?))
            }
            Extract::Unary(field, op) => Some(Draft::fixed(field, op, "")),
            Extract::Value(field, op) => Some(Draft::fixed(field, op, first_group(caps, 1)?)),
            Extract::OpValue(field) => {
                let op = parse_operator(group(caps, 1)?)?;
                Some(Draft::fixed(field, op, group(caps, 2)?))
            }
            Extract::Fixed(field, op, value) => Some(Draft::fixed(field, op, value)),
            Extract::Test { field, test } => {
                let op = parse_operator(group(caps, 1)?)?;
                Some(Draft {
                    test: Some(test),
                    ..Draft::fixed(field, op, group(caps, 2)?)
                })
            }
            Extract::Custom(f) => f(caps),
        }
    }
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> Option<&'t str> {
    caps.get(index).map(|m| m.as_str()).filter(|s| !s.is_empty())
}

fn first_group<'t>(caps: &Captures<'t>, from: usize) -> Option<&'t str> {
    (from..caps.len()).find_map(|i| group(caps, i))
}

/// Symbolic, worded or equality operator text.
fn parse_operator(text: &str) -> Option<Operator> {
    comparison_operator(text).or_else(|| text.trim().parse().ok())
}

// =============================================================================
// Custom extractors
// =============================================================================

/// `AESTDTC is missing`, but not `SUBJID missing from EX`.
fn field_missing(caps: &Captures<'_>) -> Option<Draft> {
    if group(caps, 2).is_some() {
        return None;
    }
    Some(Draft::generic(group(caps, 1)?, Operator::IsNull, ""))
}

fn field_present(caps: &Captures<'_>) -> Option<Draft> {
    if group(caps, 2).is_some() {
        return None;
    }
    Some(Draft::generic(group(caps, 1)?, Operator::IsNotNull, ""))
}

fn randomized(caps: &Captures<'_>) -> Option<Draft> {
    let op = if group(caps, 1).is_some() {
        Operator::IsNull
    } else {
        Operator::IsNotNull
    };
    Some(Draft::fixed("RANDDT", op, ""))
}

/// Dataset presence; group 1 negates, group 2 is the dataset code.
fn present_in_dataset(caps: &Captures<'_>) -> Option<Draft> {
    let domain: Domain = group(caps, 2)?.parse().ok()?;
    let value = if group(caps, 1).is_some() { "N" } else { "Y" };
    Some(Draft::fixed(domain.as_str(), Operator::Exists, value))
}

fn absent_from_dataset(caps: &Captures<'_>) -> Option<Draft> {
    let domain: Domain = group(caps, 1)?.parse().ok()?;
    Some(Draft::fixed(domain.as_str(), Operator::Exists, "N"))
}

fn age_worded(caps: &Captures<'_>) -> Option<Draft> {
    let op = match group(caps, 1)?.to_ascii_lowercase().as_str() {
        "older" => Operator::Gt,
        "younger" => Operator::Lt,
        _ => return None,
    };
    Some(Draft::fixed("AGE", op, group(caps, 2)?))
}

fn sex_value(caps: &Captures<'_>) -> Option<Draft> {
    let value = match group(caps, 1)?.to_ascii_uppercase().as_str() {
        "M" | "MALE" => "M",
        "F" | "FEMALE" => "F",
        _ => return None,
    };
    Some(Draft::fixed("SEX", Operator::Eq, value))
}

/// `grade 3`, `grade 3 or higher`, `grade 2 or lower`.
fn grade_phrase(caps: &Captures<'_>) -> Option<Draft> {
    let value = group(caps, 1)?;
    let op = match group(caps, 2).map(str::to_ascii_lowercase).as_deref() {
        None => Operator::Eq,
        Some("lower" | "below" | "less") => Operator::Le,
        Some(_) => Operator::Ge,
    };
    Some(Draft::fixed("CTCAE_GRADE", op, value))
}

fn mention(caps: &Captures<'_>) -> Option<Draft> {
    let token = group(caps, 1)?;
    is_cdash_variable(token).then(|| Draft::fixed(token, Operator::Mentioned, ""))
}

// =============================================================================
// Rule table
// =============================================================================

const FIELD: &str = r"\b([A-Z][A-Z0-9_]+)";
const QUOTED: &str = r#"(?:'([^']*)'|"([^"]*)")"#;
const BARE: &str = r"([A-Za-z0-9_\-]+(?:\.\d+)?)";
const NUMBER: &str = r"(-?\d+(?:\.\d+)?)";
const MISSING_WORDS: &str =
    r"missing|blank|empty|null|absent|not\s+(?:recorded|documented|reported|populated)";
const DATASET_TAIL: &str = r"(?:\s+(?:dataset|domain))?";

fn comparison() -> String {
    format!("(?i:{COMPARISON_ALTERNATION})")
}

fn comparison_or_equal() -> String {
    format!("(?i:{COMPARISON_ALTERNATION}|==|=)")
}

fn test_rule(name: &'static str, words: &str, field: &'static str, test: &'static str) -> Rule {
    Rule::new(
        name,
        RuleCategory::TestQualified,
        &format!(
            r"(?i:\b(?:{words})\s*(?:values?\s+)?(?:is\s+)?)({ops})\s*{NUMBER}",
            ops = comparison_or_equal(),
        ),
        Extract::Test { field, test },
    )
}

fn build_rules() -> Vec<Rule> {
    use RuleCategory::{Comparison, Equality, Mention, Named, Null};

    vec![
        // --- null / not-null / presence ---
        Rule::new(
            "is_not_null",
            Null,
            &format!(r"{FIELD}\s+(?i:is\s+not\s+null)\b"),
            Extract::FieldUnary(Operator::IsNotNull),
        ),
        Rule::new(
            "is_null",
            Null,
            &format!(r"{FIELD}\s+(?i:is\s+null)\b"),
            Extract::FieldUnary(Operator::IsNull),
        ),
        Rule::new(
            "ne_null",
            Null,
            &format!(r"{FIELD}\s*(?:!=|<>)\s*['\x22]?(?i:null)\b['\x22]?"),
            Extract::FieldUnary(Operator::IsNotNull),
        ),
        Rule::new(
            "eq_null",
            Null,
            &format!(r"{FIELD}\s*(?:==|=)\s*['\x22]?(?i:null|missing|blank)\b['\x22]?"),
            Extract::FieldUnary(Operator::IsNull),
        ),
        Rule::new(
            "field_missing",
            Null,
            &format!(
                r"{FIELD}\s+(?i:(?:is|are)\s+)?(?i:{MISSING_WORDS})\b((?i:\s+(?:in|from)\s+(?:the\s+)?[A-Z]{{2}}\b))?"
            ),
            Extract::Custom(field_missing),
        ),
        Rule::new(
            "field_present",
            Null,
            &format!(
                r"{FIELD}\s+(?i:(?:is|are)\s+)?(?i:present|populated|recorded|available|not\s+missing|non[- ]?missing|not\s+blank)\b((?i:\s+(?:in|from)\s+(?:the\s+)?[A-Z]{{2}}\b))?"
            ),
            Extract::Custom(field_present),
        ),
        Rule::new(
            "missing_field",
            Null,
            &format!(r"(?i:\b(?:missing|blank|empty|null)\s+){FIELD}\b"),
            Extract::FieldUnary(Operator::IsNull),
        ),
        Rule::new(
            "non_missing_field",
            Null,
            &format!(
                r"(?i:\b(?:non[- ]?missing|non[- ]?null|non[- ]?blank|not\s+missing|not\s+null|populated|available)\s+){FIELD}\b"
            ),
            Extract::FieldUnary(Operator::IsNotNull),
        ),
        Rule::new(
            "missing_grade",
            Null,
            r"(?i)\b(?:missing|blank|no|without(?:\s+a)?|absent)\s+(?:CTCAE\s+)?(?:toxicity\s+)?grades?\b",
            Extract::Unary("CTCAE_GRADE", Operator::IsNull),
        ),
        Rule::new(
            "grade_missing",
            Null,
            &format!(r"(?i)\b(?:CTCAE[_\s]*)?grades?\s+(?:is\s+|are\s+)?(?:{MISSING_WORDS})\b"),
            Extract::Unary("CTCAE_GRADE", Operator::IsNull),
        ),
        Rule::new(
            "missing_start_date",
            Null,
            r"(?i)\b(?:missing|blank|no|without(?:\s+an?)?)\s+(?:AE\s+|adverse\s+event\s+)?(?:onset|start)\s+dates?\b",
            Extract::Unary("AESTDTC", Operator::IsNull),
        ),
        Rule::new(
            "start_date_missing",
            Null,
            &format!(
                r"(?i)\b(?:AE\s+|adverse\s+event\s+)?(?:onset|start)\s+dates?\s+(?:is\s+|are\s+)?(?:{MISSING_WORDS})\b"
            ),
            Extract::Unary("AESTDTC", Operator::IsNull),
        ),
        Rule::new(
            "missing_end_date",
            Null,
            r"(?i)\b(?:missing|blank|no|without(?:\s+an?)?)\s+(?:AE\s+|adverse\s+event\s+)?(?:end|stop|resolution)\s+dates?\b",
            Extract::Unary("AEENDTC", Operator::IsNull),
        ),
        Rule::new(
            "end_date_missing",
            Null,
            &format!(
                r"(?i)\b(?:AE\s+|adverse\s+event\s+)?(?:end|stop|resolution)\s+dates?\s+(?:is\s+|are\s+)?(?:{MISSING_WORDS})\b"
            ),
            Extract::Unary("AEENDTC", Operator::IsNull),
        ),
        Rule::new(
            "missing_outcome",
            Null,
            r"(?i)\b(?:missing|blank|no|without(?:\s+an?)?)\s+(?:AE\s+)?outcomes?\b",
            Extract::Unary("AEOUT", Operator::IsNull),
        ),
        Rule::new(
            "outcome_missing",
            Null,
            &format!(r"(?i)\boutcomes?\s+(?:is\s+|are\s+)?(?:{MISSING_WORDS})\b"),
            Extract::Unary("AEOUT", Operator::IsNull),
        ),
        Rule::new(
            "randomized",
            Null,
            r"(?i)\b(not\s+|never\s+)?randomi[sz]ed\b",
            Extract::Custom(randomized),
        ),
        Rule::new(
            "present_in_dataset",
            Null,
            &format!(
                r"(?i)\b(not\s+|never\s+)?(?:present|found|included|enrolled|exists?|recorded)\s+in\s+(?:the\s+)?([A-Z]{{2}})\b{DATASET_TAIL}"
            ),
            Extract::Custom(present_in_dataset),
        ),
        Rule::new(
            "absent_from_dataset",
            Null,
            &format!(r"(?i)\b(?:absent|missing)\s+from\s+(?:the\s+)?([A-Z]{{2}})\b{DATASET_TAIL}"),
            Extract::Custom(absent_from_dataset),
        ),
        Rule::new(
            "no_record_in_dataset",
            Null,
            &format!(
                r"(?i)\bno\s+(?:corresponding\s+)?(?:records?|entries|data|rows?)\s+in\s+(?:the\s+)?([A-Z]{{2}})\b{DATASET_TAIL}"
            ),
            Extract::Custom(absent_from_dataset),
        ),
        Rule::new(
            "placeholder",
            Null,
            r"(?i)\b(?:missing|null|empty|blank)\b",
            Extract::Unary(PLACEHOLDER_FIELD, Operator::IsNull),
        ),
        // --- equality ---
        Rule::new(
            "ne",
            Equality,
            &format!(r"{FIELD}\s*(?:!=|<>)\s*(?:{QUOTED}|{BARE})"),
            Extract::FieldValue(Operator::Ne),
        ),
        Rule::new(
            "eq",
            Equality,
            &format!(r"{FIELD}\s*(?:==|=)\s*(?:{QUOTED}|{BARE})"),
            Extract::FieldValue(Operator::Eq),
        ),
        Rule::new(
            "is_not_quoted",
            Equality,
            &format!(
                r"{FIELD}\s+(?i:is\s+not\s+equal\s+to|is\s+not|does\s+not\s+equal|not\s+equal\s+to)\s+{QUOTED}"
            ),
            Extract::FieldValue(Operator::Ne),
        ),
        Rule::new(
            "is_quoted",
            Equality,
            &format!(r"{FIELD}\s+(?i:is\s+equal\s+to|equal\s+to|equals|is)\s+{QUOTED}"),
            Extract::FieldValue(Operator::Eq),
        ),
        Rule::new(
            "equals_bare",
            Equality,
            &format!(r"{FIELD}\s+(?i:equals)\s+{BARE}"),
            Extract::FieldValue(Operator::Eq),
        ),
        // --- numeric comparison ---
        Rule::new(
            "compare",
            Comparison,
            &format!(r"{FIELD}\s*(?i:is\s+)?({})\s*{NUMBER}", comparison()),
            Extract::FieldOpValue,
        ),
        // --- named fields ---
        Rule::new(
            "age",
            Named,
            &format!(r"(?i:\bage[d]?\s*(?:is\s+)?)({})\s*{NUMBER}", comparison_or_equal()),
            Extract::OpValue("AGE"),
        ),
        Rule::new(
            "age_worded",
            Named,
            r"(?i)\b(older|younger)\s+than\s+(\d+)",
            Extract::Custom(age_worded),
        ),
        Rule::new(
            "sex",
            Named,
            r#"(?i)\b(?:sex|gender)\s*(?:==|=|is)\s*['"]?(male|female|m|f)\b['"]?"#,
            Extract::Custom(sex_value),
        ),
        Rule::new(
            "sex_subjects",
            Named,
            r"(?i)\b(male|female)\s+(?:subjects?|patients?|participants?)\b",
            Extract::Custom(sex_value),
        ),
        Rule::new(
            "severity",
            Named,
            r#"(?i)\b(?:AESEV|severity)\s*(?:==|=|is)\s*['"]?(mild|moderate|severe|life[- ]threatening|fatal)\b['"]?"#,
            Extract::Value("AESEV", Operator::Eq),
        ),
        Rule::new(
            "severe_events",
            Named,
            r"(?i)\bsevere\s+(?:adverse\s+events?|AEs?)\b",
            Extract::Fixed("AESEV", Operator::Eq, "SEVERE"),
        ),
        Rule::new(
            "outcome",
            Named,
            &format!(
                r"(?i:\b(?:AEOUT|outcome)\s*)(?:(?:==|=)\s*(?:{QUOTED}|([A-Za-z_]+))|(?i:is)\s+{QUOTED})"
            ),
            Extract::Value("AEOUT", Operator::Eq),
        ),
        Rule::new(
            "action",
            Named,
            &format!(
                r"(?i:\b(?:AEACN|action(?:\s+taken)?)\s*)(?:(?:==|=)\s*(?:{QUOTED}|([A-Za-z_]+))|(?i:is)\s+{QUOTED})"
            ),
            Extract::Value("AEACN", Operator::Eq),
        ),
        Rule::new(
            "serious_flag",
            Named,
            r#"(?i)\b(?:AESER|serious)\s*(?:==|=|is)\s*['"]?([YN])\b['"]?"#,
            Extract::Value("AESER", Operator::Eq),
        ),
        Rule::new(
            "serious_events",
            Named,
            r"(?i)\b(?:serious\s+(?:adverse\s+events?|AEs?)|SAEs?)\b",
            Extract::Fixed("AESER", Operator::Eq, "Y"),
        ),
        Rule::new(
            "grade_compare",
            Named,
            &format!(
                r"(?i:\b(?:CTCAE[_\s]*grade|CTCAE|grade)\s*(?:is\s+)?)({}|!=)\s*(\d+)",
                comparison_or_equal()
            ),
            Extract::OpValue("CTCAE_GRADE"),
        ),
        Rule::new(
            "grade_phrase",
            Named,
            r"(?i)\b(?:CTCAE\s+)?grade\s+(\d)\b(?:\s+or\s+(higher|above|greater|more|worse|lower|below|less))?",
            Extract::Custom(grade_phrase),
        ),
        // --- test-qualified results ---
        test_rule(
            "systolic",
            r"SYSBP|systolic\s+blood\s+pressure|systolic\s+BP|systolic",
            "VSORRES",
            "SYSBP",
        ),
        test_rule(
            "diastolic",
            r"DIABP|diastolic\s+blood\s+pressure|diastolic\s+BP|diastolic",
            "VSORRES",
            "DIABP",
        ),
        test_rule("pulse", r"pulse\s+rate|heart\s+rate|pulse|HR", "VSORRES", "PULSE"),
        test_rule("temperature", r"body\s+temperature|temperature|TEMP", "VSORRES", "TEMP"),
        test_rule(
            "creatinine",
            r"serum\s+creatinine|creatinine|CREAT",
            "LBORRES",
            "CREAT",
        ),
        test_rule("alt", r"alanine\s+aminotransferase|ALT", "LBORRES", "ALT"),
        test_rule("ast", r"aspartate\s+aminotransferase|AST", "LBORRES", "AST"),
        test_rule("hemoglobin", r"hemoglobin|haemoglobin|HGB", "LBORRES", "HGB"),
        test_rule("glucose", r"blood\s+glucose|glucose|GLUC", "LBORRES", "GLUC"),
        // --- mentions ---
        Rule::new(
            "mention",
            Mention,
            r"\b([A-Z][A-Z0-9_]{2,})\b",
            Extract::Custom(mention),
        ),
    ]
}

/// The full battery, compiled once.
pub static RULES: LazyLock<Vec<Rule>> = LazyLock::new(build_rules);

#[cfg(test)]
mod tests {
    use super::*;

    fn first_draft(name: &str, text: &str) -> Option<Draft> {
        let rule = RULES.iter().find(|r| r.name == name).expect("rule exists");
        let caps = rule.pattern.captures(text)?;
        rule.draft(&caps)
    }

    #[test]
    fn battery_compiles_in_category_order() {
        let categories: Vec<_> = RULES.iter().map(|r| r.category).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
    }

    #[test]
    fn eq_null_is_a_null_check() {
        let draft = first_draft("eq_null", "AEOUT = NULL").unwrap();
        assert_eq!(draft.field, "AEOUT");
        assert_eq!(draft.operator, Operator::IsNull);
    }

    #[test]
    fn field_missing_skips_dataset_absence() {
        assert!(first_draft("field_missing", "SUBJID missing from EX").is_none());
        let draft = first_draft("field_missing", "AESTDTC is missing").unwrap();
        assert_eq!(draft.operator, Operator::IsNull);
    }

    #[test]
    fn presence_negation() {
        let draft = first_draft("present_in_dataset", "subject not present in EX").unwrap();
        assert_eq!((draft.field.as_str(), draft.value.as_str()), ("EX", "N"));
        let draft = first_draft("present_in_dataset", "subjects present in DM dataset").unwrap();
        assert_eq!((draft.field.as_str(), draft.value.as_str()), ("DM", "Y"));
        assert!(first_draft("present_in_dataset", "present in QS").is_none());
    }

    #[test]
    fn grade_phrase_operators() {
        let draft = first_draft("grade_phrase", "grade 3 or higher").unwrap();
        assert_eq!((draft.operator, draft.value.as_str()), (Operator::Ge, "3"));
        let draft = first_draft("grade_phrase", "Grade 4 events").unwrap();
        assert_eq!(draft.operator, Operator::Eq);
    }

    #[test]
    fn test_rule_sets_test_code() {
        let draft = first_draft("systolic", "systolic blood pressure above 140").unwrap();
        assert_eq!(draft.field, "VSORRES");
        assert_eq!(draft.test, Some("SYSBP"));
        assert_eq!(draft.operator, Operator::Gt);
        assert_eq!(draft.value, "140");
    }

    #[test]
    fn worded_comparison() {
        let draft = first_draft("compare", "EXDOSE at least 10.5").unwrap();
        assert_eq!(draft.field, "EXDOSE");
        assert_eq!(draft.operator, Operator::Ge);
        assert_eq!(draft.value, "10.5");
    }
}
