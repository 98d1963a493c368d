//! Column synonym lists. The first non-empty synonym wins; headers are
//! compared after normalization, so `check_name` matches `Check Name`.

pub const NAME_COLUMNS: &[&str] = &[
    "Check Name",
    "CheckName",
    "Name",
    "Rule Name",
    "Scenario Name",
    "Check",
    "Rule",
    "Scenario",
    "Test Name",
    "Validation Name",
    "Category",
];

pub const DESCRIPTION_COLUMNS: &[&str] = &[
    "Rule Description",
    "Description",
    "Detail",
    "Details",
    "Text",
    "Rule Text",
    "Check Description",
    "Scenario Description",
    "Query Text",
];

pub const DOMAIN_COLUMNS: &[&str] = &["Domain", "Data Domain", "CDISC Domain"];

pub const PRIORITY_COLUMNS: &[&str] = &["Priority", "Importance", "Level"];

pub const TYPE_COLUMNS: &[&str] = &["Type", "Category", "Tag", "Classification"];

pub const QUERY_TEXT_COLUMNS: &[&str] = &["Query Text", "QueryText", "Query", "Rule Text"];

pub const CDASH_COLUMNS: &[&str] = &["CDASH Items", "CdashItems", "CDASH", "Items"];

/// Type value that marks a parent scenario.
pub const PARENT_TYPE: &str = "Parent";

/// Type given to rows without one.
pub const DEFAULT_TYPE: &str = "Safety";

/// Split a comma-separated CDASH cell.
pub fn split_items(cell: &str) -> Vec<&str> {
    cell.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_items_drops_blanks() {
        assert_eq!(split_items(" AGE, ,SEX ,"), vec!["AGE", "SEX"]);
    }
}
