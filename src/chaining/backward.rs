use tracing::debug;

use crate::config::{EngineConfig, ProvenScope};
use crate::fact::{Fact, FactSet};
use crate::rule::Rule;
use crate::rule_base::RuleBase;
use crate::trace::Trace;

/// One justified fact: the rule that concluded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofStep {
    /// The rule whose conditions were all proven.
    pub rule: Rule,
    /// The consequence this rule was used to prove.
    pub conclusion: Fact,
}

/// Result of backward chaining.
#[derive(Debug, Clone)]
pub struct Proof {
    /// The goal.
    pub target: Fact,
    /// Whether the goal was proven.
    pub proven: bool,
    /// Justification steps in the order they succeeded.
    pub chain: Vec<ProofStep>,
    /// Known facts plus every fact proven during the search.
    pub proven_facts: FactSet,
    /// Chained rules, backtracks, cycle hits and the outcome.
    pub trace: Trace,
    /// Deepest frame stack reached.
    pub max_depth: usize,
}

impl Proof {
    /// The rules of the justification chain, in order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.chain.iter().map(|step| &step.rule)
    }

    /// Renders the chain as `cond1, cond2 -> conclusion` lines.
    #[must_use]
    pub fn explain(&self) -> Vec<String> {
        self.chain
            .iter()
            .map(|step| step.rule.derivation_line(&step.conclusion))
            .collect()
    }
}

/// Backward chainer over a borrowed rule base.
#[derive(Debug, Clone, Copy)]
pub struct BackwardChainer<'a> {
    rules: &'a RuleBase,
    config: &'a EngineConfig,
}

impl<'a> BackwardChainer<'a> {
    /// Creates a chainer.
    #[must_use]
    pub const fn new(rules: &'a RuleBase, config: &'a EngineConfig) -> Self {
        Self { rules, config }
    }

    /// Tries to justify `target` from `known` through the rule base.
    #[must_use]
    pub fn prove(&self, target: &Fact, known: &FactSet) -> Proof {
        Search::new(self.rules, self.config.proven_scope, known).run(target)
    }
}

/// A rule currently being tried for a frame's fact.
#[derive(Debug, Clone, Copy)]
struct Attempt {
    rule: usize,
    next_condition: usize,
    chain_mark: usize,
    proven_mark: usize,
}

/// A fact being proven on the current path.
#[derive(Debug)]
struct Frame {
    fact: Fact,
    next_rule: usize,
    attempt: Option<Attempt>,
}

enum Entered {
    Proven,
    Cycle,
    Pushed,
}

/// Depth-first search with an explicit frame stack.
///
/// The facts with an open frame form the current path; a fact met again
/// on its own path fails that branch instead of recursing.
struct Search<'a> {
    rules: &'a RuleBase,
    scope: ProvenScope,
    proven: FactSet,
    // Facts added to `proven` during the search, for rollback.
    proven_log: Vec<Fact>,
    chain: Vec<ProofStep>,
    trace: Trace,
    stack: Vec<Frame>,
    on_path: FactSet,
    max_depth: usize,
}

impl<'a> Search<'a> {
    fn new(rules: &'a RuleBase, scope: ProvenScope, known: &FactSet) -> Self {
        Self {
            rules,
            scope,
            proven: known.clone(),
            proven_log: Vec::new(),
            chain: Vec::new(),
            trace: Trace::new(),
            stack: Vec::new(),
            on_path: FactSet::new(),
            max_depth: 0,
        }
    }

    fn run(mut self, target: &Fact) -> Proof {
        // The value handed back to the frame below the one just finished.
        let mut returned = match self.enter(target) {
            Entered::Proven => Some(true),
            Entered::Cycle => Some(false),
            Entered::Pushed => None,
        };

        while let Some(top) = self.stack.len().checked_sub(1) {
            if let Some(ok) = returned.take() {
                if ok {
                    if let Some(attempt) = self.stack[top].attempt.as_mut() {
                        attempt.next_condition += 1;
                    }
                } else {
                    self.abandon_attempt(top);
                }
                continue;
            }

            let (fact, next_rule, attempt) = {
                let frame = &self.stack[top];
                (frame.fact.clone(), frame.next_rule, frame.attempt)
            };

            let Some(attempt) = attempt else {
                match self.rules.next_concluding(&fact, next_rule) {
                    Some(rule) => {
                        let frame = &mut self.stack[top];
                        frame.next_rule = rule + 1;
                        frame.attempt = Some(Attempt {
                            rule,
                            next_condition: 0,
                            chain_mark: self.chain.len(),
                            proven_mark: self.proven_log.len(),
                        });
                    }
                    None => {
                        self.pop();
                        returned = Some(false);
                    }
                }
                continue;
            };

            let rules = self.rules;
            let rule = &rules[attempt.rule];
            match rule.conditions().get(attempt.next_condition) {
                Some(condition) => {
                    returned = match self.enter(condition) {
                        Entered::Proven => Some(true),
                        Entered::Cycle => Some(false),
                        Entered::Pushed => None,
                    };
                }
                None => {
                    self.trace.append(rule.derivation_line(&fact));
                    self.chain.push(ProofStep {
                        rule: rule.clone(),
                        conclusion: fact.clone(),
                    });
                    if self.proven.insert(fact.clone()) {
                        self.proven_log.push(fact);
                    }
                    self.pop();
                    returned = Some(true);
                }
            }
        }

        let proven = returned.unwrap_or(false);
        if proven {
            self.trace.append(format!("target proven: {}", target.label()));
        } else {
            self.trace.append(format!("target not proven: {}", target.label()));
        }
        debug!(target = %target, proven, steps = self.chain.len(), max_depth = self.max_depth, "backward chaining finished");

        Proof {
            target: target.clone(),
            proven,
            chain: self.chain,
            proven_facts: self.proven,
            trace: self.trace,
            max_depth: self.max_depth,
        }
    }

    /// Starts proving `fact` unless it is on the current path or proven.
    fn enter(&mut self, fact: &Fact) -> Entered {
        if self.on_path.contains(fact) {
            self.trace.append(format!("cycle: {}", fact.label()));
            return Entered::Cycle;
        }
        if self.proven.contains(fact) {
            return Entered::Proven;
        }
        self.on_path.insert(fact.clone());
        self.stack.push(Frame {
            fact: fact.clone(),
            next_rule: 0,
            attempt: None,
        });
        self.max_depth = self.max_depth.max(self.stack.len());
        Entered::Pushed
    }

    fn pop(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.on_path.remove(&frame.fact);
        }
    }

    /// A condition of the top frame's current rule failed: drop the rule
    /// and let the frame move on to the next candidate.
    fn abandon_attempt(&mut self, top: usize) {
        let frame = &mut self.stack[top];
        let Some(attempt) = frame.attempt.take() else {
            return;
        };
        self.trace.append(format!(
            "backtrack: {} for {}",
            self.rules[attempt.rule],
            frame.fact.label()
        ));
        if self.scope == ProvenScope::PerAttempt {
            self.chain.truncate(attempt.chain_mark);
            for fact in self.proven_log.drain(attempt.proven_mark..) {
                self.proven.remove(&fact);
            }
        }
    }
}
