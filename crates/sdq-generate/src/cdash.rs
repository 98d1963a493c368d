use sdq_model::{Operator, ParseResult, normalize_cdash_items};

/// CDASH items for a parse: `SUBJID`, then every referenced field in source
/// order (a test-code column before the result column it qualifies).
/// Presence checks name datasets, not fields, and add nothing.
pub fn cdash_items(parse: &ParseResult) -> Vec<String> {
    let mut fields = Vec::new();
    for condition in &parse.conditions {
        if condition.operator == Operator::Exists {
            continue;
        }
        if let Some(qualifier) = condition.qualifier_column() {
            fields.push(qualifier);
        }
        fields.push(condition.field.clone());
    }
    normalize_cdash_items(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdq_model::Condition;

    #[test]
    fn qualifier_precedes_result_and_exists_is_skipped() {
        let parse = ParseResult::new(
            vec![
                Condition::new("DM", Operator::Exists, "Y", 0, "present in DM"),
                Condition::new("VSORRES", Operator::Gt, "140", 20, "SYSBP > 140").with_test("SYSBP"),
                Condition::new("VSORRES", Operator::Lt, "60", 40, "DIABP < 60").with_test("DIABP"),
                Condition::new("AETERM", Operator::Mentioned, "", 60, "AETERM"),
            ],
            Vec::new(),
        );
        assert_eq!(cdash_items(&parse), vec!["SUBJID", "VSTESTCD", "VSORRES", "AETERM"]);
    }
}
