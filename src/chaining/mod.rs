//! Chaining algorithms.
//!
//! Forward chaining saturates a working fact set (or stops at a target);
//! backward chaining justifies a single target through the rule base.
//! Every call owns its working state, so chainers over the same rule base
//! may run on different threads at once.

mod backward;
mod forward;

pub use backward::{BackwardChainer, Proof, ProofStep};
pub use forward::{ForwardChainer, Saturation, TargetOutcome};
