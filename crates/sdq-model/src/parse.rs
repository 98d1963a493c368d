use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::condition::{Condition, LogicalOperator};
use crate::domain::Domain;

/// Output of one extraction pass over a description.
///
/// Built per call and handed straight to generation; nothing is cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Sorted ascending by `position`.
    pub conditions: Vec<Condition>,
    /// Sorted ascending by `position`.
    pub logical_operators: Vec<LogicalOperator>,
    pub domains: BTreeSet<Domain>,
}

impl ParseResult {
    /// Assemble a result, deriving the domain set from the condition fields.
    pub fn new(conditions: Vec<Condition>, logical_operators: Vec<LogicalOperator>) -> Self {
        let mut domains: BTreeSet<Domain> = conditions
            .iter()
            .filter_map(|c| Domain::for_field(&c.field))
            .collect();
        if domains.is_empty() {
            domains.insert(Domain::AE);
        }
        Self {
            conditions,
            logical_operators,
            domains,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Domain of the first condition (in source order) that maps to one.
    pub fn primary_domain(&self) -> Domain {
        self.conditions
            .iter()
            .find_map(|c| Domain::for_field(&c.field))
            .unwrap_or_default()
    }

    /// Conditions that produce filter terms (everything but mentions).
    pub fn filter_conditions(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter().filter(|c| c.operator.is_filter())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.conditions.iter().any(|c| c.field == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Operator;

    #[test]
    fn empty_parse_defaults_to_ae() {
        let result = ParseResult::new(Vec::new(), Vec::new());
        assert!(result.is_empty());
        assert_eq!(result.domains.iter().copied().collect::<Vec<_>>(), vec![Domain::AE]);
        assert_eq!(result.primary_domain(), Domain::AE);
    }

    #[test]
    fn primary_domain_follows_source_order() {
        let result = ParseResult::new(
            vec![
                Condition::new("UNKNOWNVAR", Operator::Eq, "X", 0, "UNKNOWNVAR = X"),
                Condition::new("AGE", Operator::Gt, "65", 20, "AGE > 65"),
                Condition::new("AESEV", Operator::Eq, "SEVERE", 35, "AESEV = 'SEVERE'"),
            ],
            Vec::new(),
        );
        assert_eq!(result.primary_domain(), Domain::DM);
        assert!(result.domains.contains(&Domain::AE));
        assert!(result.domains.contains(&Domain::DM));
    }
}
