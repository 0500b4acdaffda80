//! Implication rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fact::{join_labels, Fact, FactSet};

/// `conditions -> consequences`.
///
/// Conditions and consequences keep their declared order; order only
/// affects trace text, never applicability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    conditions: Vec<Fact>,
    consequences: Vec<Fact>,
}

impl Rule {
    /// Creates a rule.
    #[must_use]
    pub fn new(conditions: Vec<Fact>, consequences: Vec<Fact>) -> Self {
        Self {
            conditions,
            consequences,
        }
    }

    /// Condition facts, in declared order.
    #[must_use]
    pub fn conditions(&self) -> &[Fact] {
        &self.conditions
    }

    /// Consequence facts, in declared order.
    #[must_use]
    pub fn consequences(&self) -> &[Fact] {
        &self.consequences
    }

    /// True iff every condition is a member of `facts`.
    #[must_use]
    pub fn is_applicable(&self, facts: &FactSet) -> bool {
        self.conditions.iter().all(|c| facts.contains(c))
    }

    /// True iff `fact` is among this rule's consequences.
    #[must_use]
    pub fn concludes(&self, fact: &Fact) -> bool {
        self.consequences.contains(fact)
    }

    /// Renders `cond1, cond2 -> consequence` using fact labels.
    #[must_use]
    pub fn derivation_line(&self, consequence: &Fact) -> String {
        format!("{} -> {}", join_labels(&self.conditions), consequence.label())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = |facts: &[Fact]| {
            facts
                .iter()
                .map(Fact::id)
                .collect::<Vec<_>>()
                .join(",")
        };
        write!(f, "{}->{}", ids(&self.conditions), ids(&self.consequences))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(ids: &[&str]) -> Vec<Fact> {
        ids.iter().map(|id| Fact::unnamed(*id)).collect()
    }

    #[test]
    fn applicable_requires_every_condition() {
        let rule = Rule::new(facts(&["A", "B"]), facts(&["C"]));
        let mut set: FactSet = facts(&["A"]).into_iter().collect();
        assert!(!rule.is_applicable(&set));
        set.insert(Fact::unnamed("B"));
        assert!(rule.is_applicable(&set));
    }

    #[test]
    fn rule_without_conditions_is_always_applicable() {
        let rule = Rule::new(Vec::new(), facts(&["C"]));
        assert!(rule.is_applicable(&FactSet::new()));
    }

    #[test]
    fn applicability_matches_by_id_not_name() {
        let rule = Rule::new(vec![Fact::new("A", "raining")], facts(&["C"]));
        let set: FactSet = [Fact::new("A", "something else")].into_iter().collect();
        assert!(rule.is_applicable(&set));
    }

    #[test]
    fn concludes_checks_consequences_only() {
        let rule = Rule::new(facts(&["A"]), facts(&["B", "C"]));
        assert!(rule.concludes(&Fact::unnamed("C")));
        assert!(!rule.concludes(&Fact::unnamed("A")));
    }

    #[test]
    fn display_and_derivation_line() {
        let rule = Rule::new(
            vec![Fact::new("A", "raining"), Fact::unnamed("B")],
            vec![Fact::new("C", "wet")],
        );
        assert_eq!(rule.to_string(), "A,B->C");
        assert_eq!(rule.derivation_line(&rule.consequences()[0]), "raining, B -> wet");
    }
}
