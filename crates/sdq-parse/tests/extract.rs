//! Integration tests for condition extraction and connective attribution.

use proptest::prelude::*;

use sdq_model::{Connective, Domain, Operator};
use sdq_parse::{attribute_joins, extract_conditions};

fn summary(text: &str) -> Vec<String> {
    extract_conditions(text)
        .conditions
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn end_to_end_age_and_sex() {
    let result = extract_conditions("AGE > 65 and SEX = 'M'");
    assert_eq!(summary("AGE > 65 and SEX = 'M'"), vec!["AGE > 65", "SEX = M"]);
    let conditions: Vec<_> = result.conditions.iter().collect();
    assert_eq!(
        attribute_joins(&conditions, &result.logical_operators),
        vec![Connective::And]
    );
    assert_eq!(result.primary_domain(), Domain::DM);
}

#[test]
fn conditions_are_sorted_by_position() {
    let result = extract_conditions("SEX = 'F' or AESTDTC is missing and AGE >= 18");
    let positions: Vec<_> = result.conditions.iter().map(|c| c.position).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
    assert_eq!(result.conditions.len(), 3);
}

#[test]
fn or_attribution() {
    let result = extract_conditions("AESEV = 'SEVERE' or AESER = 'Y'");
    let conditions: Vec<_> = result.conditions.iter().collect();
    assert_eq!(
        attribute_joins(&conditions, &result.logical_operators),
        vec![Connective::Or]
    );
}

#[test]
fn named_phrasings() {
    assert_eq!(
        summary("severe adverse events with missing grade"),
        vec!["AESEV = SEVERE", "CTCAE_GRADE IS NULL"]
    );
    assert_eq!(summary("CTCAE grade 3 or higher"), vec!["CTCAE_GRADE >= 3"]);
    assert_eq!(summary("serious AEs where outcome is missing"), vec![
        "AESER = Y",
        "AEOUT IS NULL"
    ]);
    assert_eq!(summary("subjects older than 75"), vec!["AGE > 75"]);
}

#[test]
fn lab_and_vital_tests() {
    let result = extract_conditions("creatinine > 1.5 and pulse rate below 50");
    let conditions: Vec<_> = result
        .conditions
        .iter()
        .map(|c| (c.field.as_str(), c.test.as_deref(), c.operator, c.value.as_str()))
        .collect();
    assert_eq!(
        conditions,
        vec![
            ("LBORRES", Some("CREAT"), Operator::Gt, "1.5"),
            ("VSORRES", Some("PULSE"), Operator::Lt, "50"),
        ]
    );
    assert!(result.domains.contains(&Domain::LB));
    assert!(result.domains.contains(&Domain::VS));
    assert_eq!(result.primary_domain(), Domain::LB);
}

#[test]
fn dataset_presence() {
    let result = extract_conditions("Subject present in DM but absent from EX");
    assert_eq!(
        summary("Subject present in DM but absent from EX"),
        vec!["DM EXISTS Y", "EX EXISTS N"]
    );
    assert_eq!(result.primary_domain(), Domain::DM);
}

#[test]
fn randomized_excluded_arm() {
    assert_eq!(
        summary("Randomized subjects where ARMCD = 'SCRNFAIL'"),
        vec!["RANDDT IS NOT NULL", "ARMCD = SCRNFAIL"]
    );
}

#[test]
fn no_conditions_defaults_to_adverse_events() {
    let result = extract_conditions("Please review the listing");
    assert!(result.is_empty());
    assert_eq!(result.domains.len(), 1);
    assert!(result.domains.contains(&Domain::AE));
}

#[test]
fn reserved_words_never_become_fields() {
    let result = extract_conditions("AESTDTC IS NULL AND AEENDTC IS NOT NULL OR AGE = NULL");
    assert!(result.conditions.iter().all(|c| {
        !c.field.is_empty() && !["FIELD", "AND", "OR", "NOT", "IS", "NULL"].contains(&c.field.as_str())
    }));
    assert_eq!(
        summary("AESTDTC IS NULL AND AEENDTC IS NOT NULL OR AGE = NULL"),
        vec!["AESTDTC IS NULL", "AEENDTC IS NOT NULL", "AGE IS NULL"]
    );
}

proptest! {
    #[test]
    fn extraction_is_deterministic(text in "[A-Za-z0-9 ='<>!.,]{0,80}") {
        prop_assert_eq!(extract_conditions(&text), extract_conditions(&text));
    }

    #[test]
    fn extracted_fields_are_valid(text in "(AGE|SEX|AESEV|missing|and|or|grade|[<>=]|'M'|65| ){0,20}") {
        let result = extract_conditions(&text);
        for c in &result.conditions {
            prop_assert!(!c.field.is_empty());
            prop_assert_ne!(c.field.as_str(), "FIELD");
            prop_assert_eq!(c.field.clone(), c.field.to_uppercase());
        }
        let positions: Vec<_> = result.conditions.iter().map(|c| c.position).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        prop_assert_eq!(positions, sorted);
    }
}
