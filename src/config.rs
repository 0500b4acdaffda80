//! Engine configuration.
//!
//! The defaults reproduce the observed behavior of the chaining
//! algorithms. The two policy knobs cover the cases where that behavior
//! is questionable; see `DESIGN.md` for the rationale of each default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FactchainError, FactchainResult, LoadError, ValidationError};

/// How `derive_target` treats a target that is already a starting fact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingTargetPolicy {
    /// Report the target as reached immediately, with no derivation lines.
    #[default]
    ShortCircuit,
    /// Run the search anyway. A fact already known is never newly staged,
    /// so the target is reported as not reached.
    RequireDerivation,
}

/// Lifetime of facts proven during backward chaining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvenScope {
    /// Proven facts and chained rules persist for the whole search, even
    /// when the rule attempt that produced them fails.
    #[default]
    Shared,
    /// A failed rule attempt rolls back every fact it proved and every
    /// rule it chained.
    PerAttempt,
}

/// Chaining configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Policy for `derive_target` when the target is given.
    pub starting_target: StartingTargetPolicy,

    /// Scope of proven facts in `prove`.
    pub proven_scope: ProvenScope,

    /// Upper bound on forward passes. `None` runs to the fixpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_passes: Option<usize>,
}

impl EngineConfig {
    /// Parses a JSON configuration document.
    pub fn from_json(s: &str) -> FactchainResult<Self> {
        let config: Self = serde_json::from_str(s).map_err(|e| ValidationError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> FactchainResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            FactchainError::Load(LoadError::Read {
                path: path.to_path_buf(),
                source,
            })
        })?;
        Self::from_json(&text)
    }

    /// Rejects settings that can never produce a result.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_passes == Some(0) {
            return Err(ValidationError::InvalidConfig {
                reason: "max_passes must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Session runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum queued sessions.
    pub queue_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 1024,
        }
    }
}
