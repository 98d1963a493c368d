//! End-to-end generation from description text.

use proptest::prelude::*;

use sdq_generate::{QUERY_TEXT_LIMIT, ShapeKind, lint_code, synthesize};
use sdq_parse::extract_conditions;

fn generate(text: &str) -> sdq_generate::Synthesis {
    synthesize(&extract_conditions(text), None).expect("conditions should be extracted")
}

#[test]
fn age_and_sex() {
    let synthesis = generate("AGE > 65 and SEX = 'M'");
    assert_eq!(synthesis.query_text, "Flag records where AGE > 65 and SEX = 'M'.");
    assert_eq!(synthesis.cdash_items, vec!["SUBJID", "AGE", "SEX"]);
    assert_eq!(synthesis.function_name, "check_dm_validation");
    assert_eq!(synthesis.shape, None);
    insta::assert_snapshot!(synthesis.code, @r#"
    def check_dm_validation(df):
        """Flag records where AGE > 65 and SEX = 'M'."""
        flagged_records = df[
            (df['AGE'] > 65) &
            (df['SEX'] == 'M')
        ]
        return flagged_records[['SUBJID', 'AGE', 'SEX']]
    "#);
    assert!(lint_code(&synthesis.code).is_empty());
}

#[test]
fn or_splits_groups() {
    let synthesis = generate("AGE < 18 or AGE > 80 and SEX = 'F'");
    assert_eq!(
        synthesis.query_text,
        "Flag records where AGE < 18 or AGE > 80 and SEX = 'F'."
    );
    assert!(synthesis.code.contains(
        "(df['AGE'] < 18) |\n        ((df['AGE'] > 80) & (df['SEX'] == 'F'))"
    ));
}

#[test]
fn null_checks() {
    let synthesis = generate("AEOUT is missing");
    assert_eq!(synthesis.query_text, "Flag records where AEOUT is null.");
    assert!(synthesis.code.contains("df['AEOUT'].isnull()"));
    assert_eq!(synthesis.function_name, "check_ae_validation");
}

#[test]
fn vitals_carry_test_qualifier() {
    let synthesis = generate("systolic blood pressure above 140");
    assert_eq!(
        synthesis.query_text,
        "Flag records where VSORRES > 140 for VSTESTCD = 'SYSBP'."
    );
    assert_eq!(synthesis.cdash_items, vec!["SUBJID", "VSTESTCD", "VSORRES"]);
    assert!(synthesis.code.contains("((df['VSTESTCD'] == 'SYSBP') & (df['VSORRES'] > 140))"));
    assert_eq!(synthesis.function_name, "check_vs_validation");
}

#[test]
fn serious_without_outcome_shape() {
    let synthesis = generate("AESER = 'Y' and AEOUT is missing");
    assert_eq!(synthesis.shape, Some(ShapeKind::SeriousMissingOutcome));
    assert_eq!(
        synthesis.query_text,
        "AESER = 'Y' but AEOUT is blank or missing, verify serious AE has documented outcome."
    );
    assert_eq!(synthesis.cdash_items, vec!["SUBJID", "AESER", "AEOUT", "AETERM"]);
    assert!(lint_code(&synthesis.code).is_empty());
}

#[test]
fn anti_join_shape() {
    let synthesis = generate("subject present in DM but absent from EX");
    assert_eq!(synthesis.shape, Some(ShapeKind::SubjectNotInDataset));
    assert_eq!(synthesis.function_name, "check_dm_validation");
    assert!(synthesis.code.starts_with("def check_dm_validation(df, ex_df):"));
    assert!(synthesis.code.contains("~df['SUBJID'].isin(ex_df['SUBJID'])"));
}

#[test]
fn or_between_shape_conditions_uses_generic_template() {
    let synthesis = generate("AESER = 'Y' or AEOUT is missing");
    assert_eq!(synthesis.shape, None);
    assert_eq!(
        synthesis.query_text,
        "Flag records where AESER = 'Y' or AEOUT is null."
    );
    assert!(synthesis.code.contains("(df['AESER'] == 'Y') |\n        df['AEOUT'].isnull()"));
    assert!(!synthesis.code.contains(" &"));
}

#[test]
fn shape_keeps_extra_conditions() {
    let synthesis = generate("AESER = 'Y' and AEOUT is missing and AGE > 65");
    assert_eq!(synthesis.shape, Some(ShapeKind::SeriousMissingOutcome));
    assert_eq!(
        synthesis.query_text,
        "AESER = 'Y' but AEOUT is blank or missing, verify serious AE has documented outcome. \
         Limited to records where AGE > 65."
    );
    assert!(synthesis.code.contains(
        "(df['AEOUT'].isnull() | (df['AEOUT'] == '')) &\n        (df['AGE'] > 65)"
    ));
    assert!(synthesis.cdash_items.contains(&"AGE".to_string()));
    assert!(lint_code(&synthesis.code).is_empty());
}

#[test]
fn grade_and_anti_join_shapes_keep_extra_conditions() {
    let synthesis = generate("CTCAE_GRADE = 4 and AGE > 65");
    assert_eq!(synthesis.shape, Some(ShapeKind::GradeActionCheck));
    assert!(synthesis.query_text.ends_with("Limited to records where AGE > 65."));
    assert!(synthesis.code.contains("(df['AGE'] > 65)"));

    let synthesis = generate("SUBJID present in DM but absent from EX and AGE > 65");
    assert_eq!(synthesis.shape, Some(ShapeKind::SubjectNotInDataset));
    assert!(synthesis.query_text.contains("AGE > 65"));
    assert!(synthesis.code.contains("~df['SUBJID'].isin(ex_df['SUBJID'])"));
    assert!(synthesis.code.contains("(df['AGE'] > 65)"));
}

#[test]
fn non_numeric_words_stay_quoted() {
    let synthesis = generate("LBSTRESC = 'NaN'");
    assert_eq!(synthesis.query_text, "Flag records where LBSTRESC = 'NaN'.");
    assert!(synthesis.code.contains("(df['LBSTRESC'] == 'NaN')"));

    let synthesis = generate("ARMCD = inf");
    assert!(synthesis.code.contains("(df['ARMCD'] == 'inf')"));
}

proptest! {
    #[test]
    fn query_text_is_bounded(
        clauses in prop::collection::vec(("[A-Z]{2}[A-Z0-9]{2,6}", 0u32..1000), 1..40)
    ) {
        let text = clauses
            .iter()
            .map(|(field, value)| format!("{field} > {value}"))
            .collect::<Vec<_>>()
            .join(" and ");
        let parse = extract_conditions(&text);
        if let Some(synthesis) = synthesize(&parse, None) {
            prop_assert!(synthesis.query_text.chars().count() <= QUERY_TEXT_LIMIT);
            prop_assert!(synthesis.cdash_items.first().is_some_and(|item| item == "SUBJID"));
        }
    }

    #[test]
    fn generation_is_deterministic(text in "[A-Za-z0-9 =<>'.]{0,80}") {
        let parse = extract_conditions(&text);
        prop_assert_eq!(synthesize(&parse, None), synthesize(&parse, None));
    }
}
