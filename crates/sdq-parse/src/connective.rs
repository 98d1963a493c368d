//! Logical-connective tracking.
//!
//! Every whole-word `and`/`or` is recorded with its byte offset. Joins are
//! attributed per adjacent condition pair: the connective closest before the
//! later condition, and after the earlier condition's match, decides. This is
//! a flat left-to-right chain; parenthesized logic is not modelled.

use std::sync::LazyLock;

use regex::Regex;
use sdq_model::{Condition, Connective, LogicalOperator};

static CONNECTIVE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(and|or)\b").expect("Invalid connective regex"));

/// All `and`/`or` tokens in `text`, by position.
pub fn find_connectives(text: &str) -> Vec<LogicalOperator> {
    CONNECTIVE_REGEX
        .find_iter(text)
        .map(|m| LogicalOperator {
            kind: if m.as_str().eq_ignore_ascii_case("or") {
                Connective::Or
            } else {
                Connective::And
            },
            position: m.start(),
        })
        .collect()
}

/// Connective joining `prev` to `next`; `AND` when none lies between them.
pub fn join_for(prev: &Condition, next: &Condition, operators: &[LogicalOperator]) -> Connective {
    operators
        .iter()
        .filter(|op| op.position >= prev.end() && op.position < next.position)
        .max_by_key(|op| op.position)
        .map_or(Connective::And, |op| op.kind)
}

/// Joins for a sequence of conditions: element `i` joins condition `i` to
/// condition `i + 1`.
pub fn attribute_joins(conditions: &[&Condition], operators: &[LogicalOperator]) -> Vec<Connective> {
    conditions
        .windows(2)
        .map(|pair| join_for(pair[0], pair[1], operators))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdq_model::Operator;

    fn cond(position: usize, raw: &str) -> Condition {
        Condition::new("X", Operator::Eq, "1", position, raw)
    }

    #[test]
    fn finds_whole_words_only() {
        let ops = find_connectives("AND band OR order and");
        let kinds: Vec<_> = ops.iter().map(|o| (o.kind, o.position)).collect();
        assert_eq!(
            kinds,
            vec![(Connective::And, 0), (Connective::Or, 9), (Connective::And, 18)]
        );
    }

    #[test]
    fn nearest_connective_wins() {
        // "A or B and C": the OR between A and B must not leak to B-C.
        let a = cond(0, "A");
        let b = cond(5, "B");
        let c = cond(11, "C");
        let ops = find_connectives("A or B and C");
        assert_eq!(join_for(&a, &b, &ops), Connective::Or);
        assert_eq!(join_for(&b, &c, &ops), Connective::And);
    }

    #[test]
    fn connective_inside_a_match_is_ignored() {
        let text = "grade 3 or higher and AEACN is missing";
        let grade = cond(0, "grade 3 or higher");
        let action = cond(22, "AEACN is missing");
        let ops = find_connectives(text);
        assert_eq!(join_for(&grade, &action, &ops), Connective::And);
    }

    #[test]
    fn defaults_to_and() {
        let a = cond(0, "A");
        let b = cond(2, "B");
        assert_eq!(attribute_joins(&[&a, &b], &[]), vec![Connective::And]);
    }
}
