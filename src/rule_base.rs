//! The ordered, read-only rule collection.

use std::ops::Index;
use std::slice;

use serde::{Deserialize, Serialize};

use crate::fact::Fact;
use crate::rule::Rule;

/// Rules in declaration order.
///
/// Chaining scans rules in this order on every pass and branch, so order
/// decides which rule justifies a consequence first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleBase {
    rules: Vec<Rule>,
}

impl RuleBase {
    /// Creates a rule base from rules in declaration order.
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates rules in declaration order.
    pub fn iter(&self) -> slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Returns the rule at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// Index of the first rule at or after `start` that concludes `fact`.
    #[must_use]
    pub fn next_concluding(&self, fact: &Fact, start: usize) -> Option<usize> {
        self.rules
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(idx, rule)| rule.concludes(fact).then_some(idx))
    }
}

impl Index<usize> for RuleBase {
    type Output = Rule;

    fn index(&self, index: usize) -> &Rule {
        &self.rules[index]
    }
}

impl<'a> IntoIterator for &'a RuleBase {
    type Item = &'a Rule;
    type IntoIter = slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<Rule> for RuleBase {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(conds: &[&str], cons: &[&str]) -> Rule {
        Rule::new(
            conds.iter().map(|id| Fact::unnamed(*id)).collect(),
            cons.iter().map(|id| Fact::unnamed(*id)).collect(),
        )
    }

    #[test]
    fn next_concluding_respects_start() {
        let base = RuleBase::new(vec![
            rule(&["A"], &["C"]),
            rule(&["B"], &["D"]),
            rule(&["E"], &["C"]),
        ]);
        let c = Fact::unnamed("C");
        assert_eq!(base.next_concluding(&c, 0), Some(0));
        assert_eq!(base.next_concluding(&c, 1), Some(2));
        assert_eq!(base.next_concluding(&c, 3), None);
    }

    #[test]
    fn collects_in_order() {
        let base: RuleBase = vec![rule(&["A"], &["B"]), rule(&["B"], &["C"])]
            .into_iter()
            .collect();
        assert_eq!(base.len(), 2);
        assert_eq!(base[1].to_string(), "B->C");
        assert!(!base.is_empty());
    }
}
