//! # factchain - a small forward/backward chaining inference engine
//!
//! factchain answers three questions over a universe of identity-keyed
//! facts and a list of implication rules:
//!
//! - what can be derived from a set of starting facts (saturation),
//! - can a target fact be derived, stopping as soon as it is,
//! - can a target fact be proven backwards through the rules.
//!
//! ## Core Concepts
//!
//! - **Fact**: an atomic proposition; equality and hashing use the id only
//! - **Rule**: conditions that jointly license a list of consequences
//! - **RuleBase**: rules in declaration order, read-only once loaded
//! - **Trace**: human-readable derivation lines explaining a result
//!
//! ## Usage
//!
//! ```rust
//! use factchain::{loader, EngineConfig, InferenceEngine};
//!
//! let universe = loader::parse_facts("A;rain\nB;cold\n", "facts").value;
//! let rules = loader::parse_rules("A,B:C\nC:D\n", "rules", &universe).value;
//! let engine = InferenceEngine::new(universe, rules, EngineConfig::default())?;
//!
//! let result = engine.saturate(["A", "B"])?;
//! assert_eq!(result.trace.lines(), ["rain, cold -> C", "C -> D"]);
//!
//! let proof = engine.prove("D", ["A", "B"])?;
//! assert!(proof.proven);
//! # Ok::<(), factchain::FactchainError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model
pub mod error;
pub mod fact;
pub mod rule;
pub mod rule_base;
pub mod trace;
pub mod universe;

// Loading, configuration and chaining
pub mod chaining;
pub mod config;
pub mod loader;

// Query surface
pub mod engine;
pub mod ir;

// Re-export primary types at crate root for convenience
pub use chaining::{BackwardChainer, ForwardChainer, Proof, ProofStep, Saturation, TargetOutcome};
pub use config::{EngineConfig, ProvenScope, RuntimeConfig, StartingTargetPolicy};
pub use engine::runtime::{SessionHandle, SessionRuntime};
pub use engine::{EngineResponse, InferenceEngine};
pub use error::{ExecutionError, FactchainError, FactchainResult, LoadError, RecordKind, ValidationError};
pub use fact::{Fact, FactSet};
pub use ir::{DeriveTargetPayload, Operation, ProvePayload, Query, SaturatePayload};
pub use loader::{load_facts, load_rules, Loaded};
pub use rule::Rule;
pub use rule_base::RuleBase;
pub use trace::Trace;
pub use universe::FactUniverse;
