//! Inference engine facade.
//!
//! The engine owns a loaded fact universe and rule base, both read-only
//! and shared via `Arc`. Callers pass fact ids; the engine resolves them,
//! runs one chainer synchronously and returns structured results.

/// Bounded worker pool running independent sessions.
pub mod runtime;

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::chaining::{BackwardChainer, ForwardChainer, Proof, Saturation, TargetOutcome};
use crate::config::EngineConfig;
use crate::error::{FactchainResult, ValidationError};
use crate::fact::{sorted, Fact, FactSet};
use crate::ir::{Operation, Query};
use crate::loader::{self, Loaded};
use crate::rule::Rule;
use crate::rule_base::RuleBase;
use crate::trace::Trace;
use crate::universe::FactUniverse;

/// Result of executing a query.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EngineResponse {
    /// Result of SATURATE.
    Saturate {
        /// Request this answers.
        request_id: Uuid,
        /// Final fact set, sorted by id.
        facts: Vec<Fact>,
        /// Derived facts, sorted by id.
        derived: Vec<Fact>,
        /// Derivation lines.
        trace: Trace,
        /// Passes executed.
        passes: usize,
        /// False if the pass limit stopped the loop.
        saturated: bool,
    },

    /// Result of DERIVE_TARGET.
    DeriveTarget {
        /// Request this answers.
        request_id: Uuid,
        /// The target fact.
        target: Fact,
        /// Whether it was reached.
        reached: bool,
        /// Derivation lines and the outcome line.
        trace: Trace,
        /// Passes executed.
        passes: usize,
        /// False if the pass limit stopped the search.
        saturated: bool,
    },

    /// Result of PROVE.
    Prove {
        /// Request this answers.
        request_id: Uuid,
        /// The target fact.
        target: Fact,
        /// Whether it was proven.
        proven: bool,
        /// Justifying rules, in order.
        rule_chain: Vec<Rule>,
        /// Proven facts, sorted by id.
        proven_facts: Vec<Fact>,
        /// Search trace.
        trace: Trace,
    },
}

impl EngineResponse {
    /// The request this response answers.
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        match self {
            Self::Saturate { request_id, .. }
            | Self::DeriveTarget { request_id, .. }
            | Self::Prove { request_id, .. } => *request_id,
        }
    }

    /// The trace of the run.
    #[must_use]
    pub const fn trace(&self) -> &Trace {
        match self {
            Self::Saturate { trace, .. } | Self::DeriveTarget { trace, .. } | Self::Prove { trace, .. } => trace,
        }
    }

    /// `reached`/`proven` for goal queries, `saturated` for saturation.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        match self {
            Self::Saturate { saturated, .. } => *saturated,
            Self::DeriveTarget { reached, .. } => *reached,
            Self::Prove { proven, .. } => *proven,
        }
    }

    fn from_saturation(request_id: Uuid, result: Saturation) -> Self {
        Self::Saturate {
            request_id,
            facts: sorted(&result.facts),
            derived: sorted(&result.derived),
            trace: result.trace,
            passes: result.passes,
            saturated: result.saturated,
        }
    }

    fn from_outcome(request_id: Uuid, target: Fact, outcome: TargetOutcome) -> Self {
        Self::DeriveTarget {
            request_id,
            target,
            reached: outcome.reached,
            trace: outcome.trace,
            passes: outcome.passes,
            saturated: outcome.saturated,
        }
    }

    fn from_proof(request_id: Uuid, proof: Proof) -> Self {
        Self::Prove {
            request_id,
            proven_facts: sorted(&proof.proven_facts),
            rule_chain: proof.chain.into_iter().map(|step| step.rule).collect(),
            target: proof.target,
            proven: proof.proven,
            trace: proof.trace,
        }
    }
}

/// Synchronous inference engine over a loaded knowledge base.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    universe: Arc<FactUniverse>,
    rules: Arc<RuleBase>,
    config: EngineConfig,
}

impl InferenceEngine {
    /// Creates an engine over an already loaded knowledge base.
    ///
    /// Fails if `config` does not validate.
    pub fn new(universe: FactUniverse, rules: RuleBase, config: EngineConfig) -> FactchainResult<Self> {
        config.validate()?;
        Ok(Self {
            universe: Arc::new(universe),
            rules: Arc::new(rules),
            config,
        })
    }

    /// Loads facts then rules from files.
    ///
    /// Load problems are returned alongside the engine, which runs over
    /// whatever did load. Only an invalid `config` is an error.
    pub fn from_files(
        facts_path: impl AsRef<Path>,
        rules_path: impl AsRef<Path>,
        config: EngineConfig,
    ) -> FactchainResult<Loaded<Self>> {
        config.validate()?;
        let facts = loader::load_facts(facts_path);
        let rules = loader::load_rules(rules_path, &facts.value);
        let mut diagnostics = facts.diagnostics;
        diagnostics.extend(rules.diagnostics);
        Ok(Loaded {
            value: Self::new(facts.value, rules.value, config)?,
            diagnostics,
        })
    }

    /// The fact universe.
    #[must_use]
    pub fn universe(&self) -> &FactUniverse {
        &self.universe
    }

    /// The rule base.
    #[must_use]
    pub fn rules(&self) -> &RuleBase {
        &self.rules
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Forward saturation from the selected fact ids.
    pub fn saturate<I, S>(&self, facts: I) -> FactchainResult<Saturation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let starting = self.select(facts)?;
        Ok(ForwardChainer::new(&self.rules, &self.config).saturate(&starting))
    }

    /// Goal-directed forward chaining towards `target`.
    pub fn derive_target<I, S>(&self, target: &str, facts: I) -> FactchainResult<TargetOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let target = self.lookup(target)?;
        let starting = self.select(facts)?;
        Ok(ForwardChainer::new(&self.rules, &self.config).derive_target(&starting, &target))
    }

    /// Backward chaining for `target` from the known fact ids.
    pub fn prove<I, S>(&self, target: &str, known: I) -> FactchainResult<Proof>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let target = self.lookup(target)?;
        let known = self.select(known)?;
        Ok(BackwardChainer::new(&self.rules, &self.config).prove(&target, &known))
    }

    /// Validates and runs a query.
    pub fn execute(&self, query: Query) -> FactchainResult<EngineResponse> {
        // Queries may come from JSON; builders do not validate.
        query.validate()?;
        debug!(request_id = %query.request_id, op = query.operation.name(), "executing query");

        let request_id = query.request_id;
        match query.operation {
            Operation::Saturate(payload) => {
                let result = self.saturate(&payload.facts)?;
                Ok(EngineResponse::from_saturation(request_id, result))
            }
            Operation::DeriveTarget(payload) => {
                let target = self.lookup(&payload.target)?;
                let outcome = self.derive_target(&payload.target, &payload.facts)?;
                Ok(EngineResponse::from_outcome(request_id, target, outcome))
            }
            Operation::Prove(payload) => {
                let proof = self.prove(&payload.target, &payload.known)?;
                Ok(EngineResponse::from_proof(request_id, proof))
            }
        }
    }

    /// Resolves one id: the universe first, then facts only named in rules.
    fn lookup(&self, id: &str) -> Result<Fact, ValidationError> {
        let id = id.trim();
        if let Some(fact) = self.universe.get(id) {
            return Ok(fact.clone());
        }
        self.rules
            .iter()
            .flat_map(|rule| rule.conditions().iter().chain(rule.consequences()))
            .find(|fact| fact.id() == id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownFact { id: id.to_string() })
    }

    fn select<I, S>(&self, ids: I) -> Result<FactSet, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ids.into_iter().map(|id| self.lookup(id.as_ref())).collect()
    }
}
