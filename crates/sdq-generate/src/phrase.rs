//! Human-readable clause text for conditions.

use sdq_model::{Condition, Connective, Operator};

/// Value as it appears in query text: numbers bare, everything else quoted.
pub fn literal(condition: &Condition) -> String {
    if condition.is_numeric_value() {
        condition.value.clone()
    } else {
        format!("'{}'", condition.value)
    }
}

/// Phrase for one condition; `None` for bare mentions.
pub fn phrase(condition: &Condition) -> Option<String> {
    let field = &condition.field;
    let text = match condition.operator {
        Operator::Mentioned => return None,
        Operator::IsNull => format!("{field} is null"),
        Operator::IsNotNull => format!("{field} is not null"),
        Operator::Exists if condition.value == "N" => format!("subject absent from {field}"),
        Operator::Exists => format!("subject present in {field}"),
        op => {
            let base = format!("{field} {op} {}", literal(condition));
            match (&condition.test, condition.qualifier_column()) {
                (Some(test), Some(qualifier)) => format!("{base} for {qualifier} = '{test}'"),
                _ => base,
            }
        }
    };
    Some(text)
}

/// Join phrases left to right; `joins[i]` prefixes phrase `i + 1`.
pub fn clause(conditions: &[&Condition], joins: &[Connective]) -> String {
    let mut out = String::new();
    for (index, condition) in conditions.iter().enumerate() {
        let Some(text) = phrase(condition) else {
            continue;
        };
        if !out.is_empty() {
            let join = index
                .checked_sub(1)
                .and_then(|i| joins.get(i))
                .copied()
                .unwrap_or(Connective::And);
            out.push(' ');
            out.push_str(join.word());
            out.push(' ');
        }
        out.push_str(&text);
    }
    out
}
