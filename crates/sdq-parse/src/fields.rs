//! Field vocabulary used by the extractor.
//!
//! Generic rules capture any uppercase token as a field name. Those tokens are
//! filtered here: connective/keyword tokens are rejected, common English
//! synonyms are mapped to their CDASH variable, and vital-sign or lab test
//! codes are left to the test-qualified rules.

use sdq_model::{Operator, PLACEHOLDER_FIELD};

/// Tokens that can never be a field.
const RESERVED_WORDS: &[&str] = &[
    "AND", "OR", "NOT", "IS", "IN", "NULL", "NONE", "THE", "WHERE", "IF", "THEN", "WITH", "FOR",
    "FROM", "BUT", "ARE", "HAS", "HAVE", "NO", "ALL", "ANY", "MISSING", "BLANK", "EMPTY",
    "ABSENT", "PRESENT", "TRUE", "FALSE", "AE", "AES", "SAE", "SAES", "FLAG", "CHECK", "RECORD",
    "RECORDS", "EQUALS", "EQUAL", "THAN", "TO",
];

/// Synonyms resolved to their canonical variable.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("GRADE", "CTCAE_GRADE"),
    ("CTCAE", "CTCAE_GRADE"),
    ("CTCAEGRADE", "CTCAE_GRADE"),
    ("AETOXGR", "CTCAE_GRADE"),
    ("SEVERITY", "AESEV"),
    ("OUTCOME", "AEOUT"),
    ("ACTION", "AEACN"),
    ("SERIOUS", "AESER"),
    ("GENDER", "SEX"),
];

/// Test codes handled by test-qualified rules.
const TEST_CODES: &[&str] = &[
    "SYSBP",
    "DIABP",
    "SYSTOLIC",
    "DIASTOLIC",
    "PULSE",
    "HR",
    "TEMP",
    "TEMPERATURE",
    "CREAT",
    "CREATININE",
    "ALT",
    "AST",
    "HGB",
    "HEMOGLOBIN",
    "GLUC",
    "GLUCOSE",
];

/// CDASH variables recognised as bare mentions.
pub const CDASH_VARIABLES: &[&str] = &[
    "SUBJID", "USUBJID", "SITEID", "AETERM", "AEDECOD", "AESTDTC", "AEENDTC", "AESTDT",
    "AEENDDT", "AESEV", "AESER", "AEOUT", "AEACN", "AEREL", "AETOXGR", "CTCAE_GRADE", "AGE",
    "SEX", "RACE", "ETHNIC", "BRTHDTC", "ARM", "ARMCD", "ACTARM", "ACTARMCD", "RANDDT",
    "RFSTDTC", "RFENDTC", "EXTRT", "EXDOSE", "EXDOSU", "EXSTDTC", "EXENDTC", "VSTESTCD",
    "VSORRES", "VSORRESU", "VSDTC", "LBTESTCD", "LBORRES", "LBORRESU", "LBDTC", "LBNRIND",
    "CMTRT", "CMDOSE", "CMSTDTC", "CMENDTC", "MHTERM", "MHSTDTC", "DSTERM", "DSDECOD",
    "DSSTDTC",
];

/// Words that denote an absent value.
const NULL_VALUES: &[&str] = &["NULL", "MISSING", "BLANK", "EMPTY"];

/// Returns true for keywords and the placeholder.
pub fn is_reserved(field: &str) -> bool {
    field == PLACEHOLDER_FIELD || RESERVED_WORDS.contains(&field)
}

pub fn is_test_code(token: &str) -> bool {
    TEST_CODES.contains(&token.to_ascii_uppercase().as_str())
}

pub fn is_cdash_variable(token: &str) -> bool {
    CDASH_VARIABLES.contains(&token)
}

/// A value that is itself a null marker (`= NULL`, `= 'missing'`).
pub fn is_null_value(value: &str) -> bool {
    NULL_VALUES.contains(&value.trim().to_ascii_uppercase().as_str())
}

/// Resolve a token captured by a generic rule to a field name.
///
/// Returns `None` for reserved words and test codes.
pub fn resolve_generic_field(token: &str) -> Option<String> {
    let upper = token.trim().to_ascii_uppercase();
    if upper.is_empty() || is_reserved(&upper) || is_test_code(&upper) {
        return None;
    }
    let canonical = FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map_or(upper, |(_, field)| (*field).to_string());
    Some(canonical)
}

/// Regex alternation matching every comparison operator, symbolic or worded.
///
/// Longer alternatives come first so that `>=` wins over `>`.
pub const COMPARISON_ALTERNATION: &str = concat!(
    r">=|<=|=>|=<|>|<|",
    r"greater\s+than\s+or\s+equal\s+to|less\s+than\s+or\s+equal\s+to|",
    r"greater\s+than|more\s+than|higher\s+than|less\s+than|lower\s+than|",
    r"at\s+least|at\s+most|no\s+more\s+than|no\s+less\s+than|",
    r"exceeds|exceeding|above|over|below|under"
);

/// Map a symbolic or worded comparison to an [`Operator`].
pub fn comparison_operator(text: &str) -> Option<Operator> {
    let words = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let op = match words.as_str() {
        ">=" | "=>" | "greater than or equal to" | "at least" | "no less than" => Operator::Ge,
        "<=" | "=<" | "less than or equal to" | "at most" | "no more than" => Operator::Le,
        ">" | "greater than" | "more than" | "higher than" | "exceeds" | "exceeding" | "above"
        | "over" => Operator::Gt,
        "<" | "less than" | "lower than" | "below" | "under" => Operator::Lt,
        _ => return None,
    };
    Some(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_field_rejects_keywords_and_test_codes() {
        assert_eq!(resolve_generic_field("AND"), None);
        assert_eq!(resolve_generic_field("FIELD"), None);
        assert_eq!(resolve_generic_field("SYSBP"), None);
        assert_eq!(resolve_generic_field("GRADE").as_deref(), Some("CTCAE_GRADE"));
        assert_eq!(resolve_generic_field("aestdtc").as_deref(), Some("AESTDTC"));
    }

    #[test]
    fn worded_comparisons() {
        assert_eq!(comparison_operator("at  least"), Some(Operator::Ge));
        assert_eq!(comparison_operator("Greater Than"), Some(Operator::Gt));
        assert_eq!(comparison_operator("=<"), Some(Operator::Le));
        assert_eq!(comparison_operator("about"), None);
    }

    #[test]
    fn null_values() {
        assert!(is_null_value(" null "));
        assert!(is_null_value("Missing"));
        assert!(!is_null_value("None"));
    }
}
