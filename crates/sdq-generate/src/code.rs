//! Python (pandas) filter code.
//!
//! Generated functions take the primary dataset as `df` (plus one
//! `<code>_df` frame per other dataset referenced by a presence check),
//! filter it with a boolean expression and project the CDASH item columns.

use sdq_model::{Condition, Connective, Domain, Operator, SUBJECT_ID};

/// Indentation of filter terms inside `df[ ... ]`.
const TERM_INDENT: &str = "\n        ";

/// `check_<domain>_validation`.
pub fn function_name(domain: Domain) -> String {
    format!("check_{}_validation", domain.slug())
}

/// Name of the frame parameter holding `domain`'s dataset.
pub fn frame_name(domain: Domain, primary: Domain) -> String {
    if domain == primary {
        "df".to_string()
    } else {
        format!("{}_df", domain.slug())
    }
}

/// Quote a string for a single-quoted Python literal.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn python_literal(condition: &Condition) -> String {
    if condition.is_numeric_value() {
        condition.value.clone()
    } else {
        quote(&condition.value)
    }
}

fn python_operator(op: Operator) -> &'static str {
    match op {
        Operator::Eq => "==",
        other => other.as_str(),
    }
}

/// Boolean term for one condition; `None` for bare mentions.
pub fn term(condition: &Condition, primary: Domain) -> Option<String> {
    let column = format!("df[{}]", quote(&condition.field));
    let text = match condition.operator {
        Operator::Mentioned => return None,
        Operator::IsNull => format!("{column}.isnull()"),
        Operator::IsNotNull => format!("{column}.notnull()"),
        Operator::Exists => exists_term(condition, primary),
        op => {
            let comparison = format!("({column} {} {})", python_operator(op), python_literal(condition));
            match (&condition.test, condition.qualifier_column()) {
                (Some(test), Some(qualifier)) => {
                    format!("((df[{}] == {}) & {comparison})", quote(&qualifier), quote(test))
                }
                _ => comparison,
            }
        }
    };
    Some(text)
}

fn exists_term(condition: &Condition, primary: Domain) -> String {
    let subject = format!("df[{}]", quote(SUBJECT_ID));
    let present = condition.value != "N";
    match condition.field.parse::<Domain>() {
        Ok(domain) if domain != primary => {
            let other = frame_name(domain, primary);
            let membership = format!("{subject}.isin({other}[{}])", quote(SUBJECT_ID));
            if present {
                membership
            } else {
                format!("~{membership}")
            }
        }
        _ if present => format!("{subject}.notnull()"),
        _ => format!("{subject}.isnull()"),
    }
}

/// Frame parameters: `df` first, then one per other dataset in a presence
/// check, in source order.
pub fn frame_params(conditions: &[&Condition], primary: Domain) -> Vec<String> {
    let mut params = vec!["df".to_string()];
    for condition in conditions {
        if condition.operator != Operator::Exists {
            continue;
        }
        if let Ok(domain) = condition.field.parse::<Domain>() {
            let name = frame_name(domain, primary);
            if !params.contains(&name) {
                params.push(name);
            }
        }
    }
    params
}

/// Combine terms in disjunctive normal form: runs joined by AND become
/// `&`-groups, and groups are separated by `|`.
pub fn filter_expression(terms: &[String], joins: &[Connective]) -> String {
    let mut groups: Vec<Vec<&str>> = Vec::new();
    for (index, term) in terms.iter().enumerate() {
        let join = index.checked_sub(1).and_then(|i| joins.get(i)).copied();
        match groups.last_mut() {
            Some(group) if join != Some(Connective::Or) => group.push(term.as_str()),
            _ => groups.push(vec![term.as_str()]),
        }
    }
    if let [single] = groups.as_slice() {
        return single.join(&format!(" &{TERM_INDENT}"));
    }
    groups
        .iter()
        .map(|group| match group.as_slice() {
            [one] => (*one).to_string(),
            many => format!("({})", many.join(" & ")),
        })
        .collect::<Vec<_>>()
        .join(&format!(" |{TERM_INDENT}"))
}

/// Python list literal of column names.
pub fn column_list(columns: &[String]) -> String {
    let quoted: Vec<String> = columns.iter().map(|c| quote(c)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Render a filter function.
pub fn render_function(
    name: &str,
    params: &[String],
    doc: &str,
    expression: &str,
    columns: &[String],
) -> String {
    let doc = doc.replace('"', "'");
    format!(
        "def {name}({params}):\n    \"\"\"{doc}\"\"\"\n    flagged_records = df[{TERM_INDENT}{expression}\n    ]\n    return flagged_records[{columns}]",
        params = params.join(", "),
        columns = column_list(columns),
    )
}
