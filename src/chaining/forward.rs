use tracing::{debug, warn};

use crate::config::{EngineConfig, StartingTargetPolicy};
use crate::fact::{Fact, FactSet};
use crate::rule_base::RuleBase;
use crate::trace::Trace;

/// Result of forward saturation.
#[derive(Debug, Clone)]
pub struct Saturation {
    /// Starting facts plus everything derived.
    pub facts: FactSet,
    /// Facts that were not among the starting facts.
    pub derived: FactSet,
    /// One line per derivation, in discovery order.
    pub trace: Trace,
    /// Passes executed, including the final pass that added nothing.
    pub passes: usize,
    /// False only when `max_passes` stopped the loop early.
    pub saturated: bool,
}

/// Result of goal-directed forward chaining.
#[derive(Debug, Clone)]
pub struct TargetOutcome {
    /// Whether the target was reached.
    pub reached: bool,
    /// Facts known when the search stopped.
    pub facts: FactSet,
    /// Derivation lines followed by one outcome line.
    pub trace: Trace,
    /// Passes executed.
    pub passes: usize,
    /// False only when `max_passes` stopped the search before either the
    /// target or a fixpoint was reached.
    pub saturated: bool,
}

/// Forward chainer over a borrowed rule base.
#[derive(Debug, Clone, Copy)]
pub struct ForwardChainer<'a> {
    rules: &'a RuleBase,
    config: &'a EngineConfig,
}

/// How a single pass ended.
enum PassEnd {
    /// Scanned every rule.
    Complete,
    /// Staged the target and stopped scanning.
    TargetStaged,
}

impl<'a> ForwardChainer<'a> {
    /// Creates a chainer.
    #[must_use]
    pub const fn new(rules: &'a RuleBase, config: &'a EngineConfig) -> Self {
        Self { rules, config }
    }

    /// Applies rules until a pass adds nothing.
    #[must_use]
    pub fn saturate(&self, starting: &FactSet) -> Saturation {
        let mut current = starting.clone();
        let mut trace = Trace::new();
        let mut passes = 0;

        let saturated = loop {
            if self.pass_limit_hit(passes) {
                break false;
            }
            passes += 1;
            let (staged, _) = self.pass(&current, None, &mut trace);
            debug!(pass = passes, added = staged.len(), "forward pass");
            if staged.is_empty() {
                break true;
            }
            current.extend(staged);
        };

        let derived = current.difference(starting).cloned().collect();
        Saturation {
            facts: current,
            derived,
            trace,
            passes,
            saturated,
        }
    }

    /// Forward chains until `target` is derived or nothing new appears.
    #[must_use]
    pub fn derive_target(&self, starting: &FactSet, target: &Fact) -> TargetOutcome {
        let mut current = starting.clone();
        let mut trace = Trace::new();

        if current.contains(target) && self.config.starting_target == StartingTargetPolicy::ShortCircuit {
            trace.append(format!("target reached: {} (given)", target.label()));
            return TargetOutcome {
                reached: true,
                facts: current,
                trace,
                passes: 0,
                saturated: true,
            };
        }

        let mut passes = 0;
        let mut reached = false;
        let mut saturated = true;
        loop {
            if self.pass_limit_hit(passes) {
                saturated = false;
                break;
            }
            passes += 1;
            let (staged, end) = self.pass(&current, Some(target), &mut trace);
            debug!(pass = passes, added = staged.len(), "goal-directed pass");
            let done = staged.is_empty();
            current.extend(staged);
            if matches!(end, PassEnd::TargetStaged) {
                reached = true;
                break;
            }
            if done {
                break;
            }
        }

        if reached {
            trace.append(format!("target reached: {}", target.label()));
        } else if saturated {
            trace.append(format!("target not reached: {}", target.label()));
        } else {
            trace.append(format!("target not reached: {} (pass limit)", target.label()));
        }
        TargetOutcome {
            reached,
            facts: current,
            trace,
            passes,
            saturated,
        }
    }

    /// One scan of the rule base against `current`. Staged facts are not
    /// visible to later rules in the same pass.
    fn pass(&self, current: &FactSet, target: Option<&Fact>, trace: &mut Trace) -> (FactSet, PassEnd) {
        let mut staged = FactSet::new();
        for rule in self.rules {
            if !rule.is_applicable(current) {
                continue;
            }
            for consequence in rule.consequences() {
                if current.contains(consequence) {
                    continue;
                }
                staged.insert(consequence.clone());
                trace.append(rule.derivation_line(consequence));
                if target == Some(consequence) {
                    return (staged, PassEnd::TargetStaged);
                }
            }
        }
        (staged, PassEnd::Complete)
    }

    fn pass_limit_hit(&self, passes: usize) -> bool {
        match self.config.max_passes {
            Some(max) if passes >= max => {
                warn!(max_passes = max, "pass limit reached before fixpoint");
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;

    fn ids(ids: &[&str]) -> Vec<Fact> {
        ids.iter().map(|id| Fact::unnamed(*id)).collect()
    }

    fn set(list: &[&str]) -> FactSet {
        ids(list).into_iter().collect()
    }

    fn rule(conds: &[&str], cons: &[&str]) -> Rule {
        Rule::new(ids(conds), ids(cons))
    }

    fn chain_rules() -> RuleBase {
        RuleBase::new(vec![rule(&["A", "B"], &["C"]), rule(&["C"], &["D"])])
    }

    #[test]
    fn saturate_reaches_fixpoint() {
        let rules = chain_rules();
        let config = EngineConfig::default();
        let result = ForwardChainer::new(&rules, &config).saturate(&set(&["A", "B"]));
        assert_eq!(result.facts, set(&["A", "B", "C", "D"]));
        assert_eq!(result.derived, set(&["C", "D"]));
        assert_eq!(result.trace.lines(), ["A, B -> C", "C -> D"]);
        assert_eq!(result.passes, 3);
        assert!(result.saturated);
    }

    #[test]
    fn staged_facts_wait_for_next_pass() {
        // C -> D is declared after A -> C, yet D must wait a pass.
        let rules = RuleBase::new(vec![rule(&["A"], &["C"]), rule(&["C"], &["D"])]);
        let config = EngineConfig::default();
        let chainer = ForwardChainer::new(&rules, &config);
        let current = set(&["A"]);
        let mut trace = Trace::new();
        let (staged, _) = chainer.pass(&current, None, &mut trace);
        assert_eq!(staged, set(&["C"]));
    }

    #[test]
    fn duplicate_consequence_in_one_pass_traced_twice() {
        let rules = RuleBase::new(vec![rule(&["A"], &["C"]), rule(&["B"], &["C"])]);
        let config = EngineConfig::default();
        let result = ForwardChainer::new(&rules, &config).saturate(&set(&["A", "B"]));
        assert_eq!(result.trace.lines(), ["A -> C", "B -> C"]);
        assert_eq!(result.derived.len(), 1);
    }

    #[test]
    fn saturate_with_no_rules_returns_start() {
        let rules = RuleBase::default();
        let config = EngineConfig::default();
        let result = ForwardChainer::new(&rules, &config).saturate(&set(&["A"]));
        assert_eq!(result.facts, set(&["A"]));
        assert!(result.trace.is_empty());
        assert_eq!(result.passes, 1);
    }

    #[test]
    fn max_passes_stops_early() {
        let rules = chain_rules();
        let config = EngineConfig {
            max_passes: Some(1),
            ..EngineConfig::default()
        };
        let result = ForwardChainer::new(&rules, &config).saturate(&set(&["A", "B"]));
        assert!(!result.saturated);
        assert_eq!(result.facts, set(&["A", "B", "C"]));
    }

    #[test]
    fn derive_target_stops_when_staged() {
        let rules = RuleBase::new(vec![
            rule(&["A", "B"], &["C"]),
            rule(&["C"], &["D", "E"]),
            rule(&["C"], &["F"]),
        ]);
        let config = EngineConfig::default();
        let outcome = ForwardChainer::new(&rules, &config)
            .derive_target(&set(&["A", "B"]), &Fact::unnamed("D"));
        assert!(outcome.reached);
        assert_eq!(outcome.trace.lines(), ["A, B -> C", "C -> D", "target reached: D"]);
        assert!(!outcome.facts.contains("E"));
        assert!(!outcome.facts.contains("F"));
        assert_eq!(outcome.passes, 2);
    }

    #[test]
    fn derive_target_unreachable() {
        let rules = chain_rules();
        let config = EngineConfig::default();
        let outcome = ForwardChainer::new(&rules, &config)
            .derive_target(&set(&["A"]), &Fact::unnamed("D"));
        assert!(!outcome.reached);
        assert!(outcome.saturated);
        assert_eq!(outcome.trace.last(), Some("target not reached: D"));
    }

    #[test]
    fn derive_target_reports_pass_limit() {
        let rules = chain_rules();
        let config = EngineConfig {
            max_passes: Some(1),
            ..EngineConfig::default()
        };
        let outcome = ForwardChainer::new(&rules, &config)
            .derive_target(&set(&["A", "B"]), &Fact::unnamed("D"));
        assert!(!outcome.reached);
        assert!(!outcome.saturated);
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.trace.lines(), ["A, B -> C", "target not reached: D (pass limit)"]);
    }

    #[test]
    fn given_target_short_circuits_by_default() {
        let rules = chain_rules();
        let config = EngineConfig::default();
        let outcome = ForwardChainer::new(&rules, &config)
            .derive_target(&set(&["A", "B"]), &Fact::unnamed("A"));
        assert!(outcome.reached);
        assert_eq!(outcome.passes, 0);
        assert_eq!(outcome.trace.lines(), ["target reached: A (given)"]);
    }

    #[test]
    fn given_target_requires_derivation_when_configured() {
        let rules = chain_rules();
        let config = EngineConfig {
            starting_target: StartingTargetPolicy::RequireDerivation,
            ..EngineConfig::default()
        };
        let outcome = ForwardChainer::new(&rules, &config)
            .derive_target(&set(&["A", "B"]), &Fact::unnamed("A"));
        assert!(!outcome.reached);
        assert_eq!(outcome.trace.lines(), ["A, B -> C", "C -> D", "target not reached: A"]);
    }
}
