//! Query definitions and payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The top-level envelope for every engine query.
///
/// Every query is wrapped in this struct to provide:
/// - Protocol versioning for forward/backward compatibility
/// - Request tracking via unique IDs
/// - Timestamp for audit logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Protocol version (e.g., "1.0").
    pub version: String,

    /// Unique identifier for this request.
    pub request_id: Uuid,

    /// When this query was created.
    pub timestamp: DateTime<Utc>,

    /// The operation to run.
    pub operation: Operation,
}

impl Query {
    /// Current protocol version.
    pub const CURRENT_VERSION: &'static str = "1.0";

    /// Creates a new query with the given operation.
    #[must_use]
    pub fn new(operation: Operation) -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            operation,
        }
    }

    /// Sets a custom request ID (useful for correlation).
    #[must_use]
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Forward saturation from the selected facts.
    #[must_use]
    pub fn saturate<I, S>(facts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Operation::Saturate(SaturatePayload {
            facts: facts.into_iter().map(Into::into).collect(),
        }))
    }

    /// Goal-directed forward chaining towards `target`.
    #[must_use]
    pub fn derive_target<I, S>(target: impl Into<String>, facts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Operation::DeriveTarget(DeriveTargetPayload {
            target: target.into(),
            facts: facts.into_iter().map(Into::into).collect(),
        }))
    }

    /// Backward chaining for `target` from the known facts.
    #[must_use]
    pub fn prove<I, S>(target: impl Into<String>, known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Operation::Prove(ProvePayload {
            target: target.into(),
            known: known.into_iter().map(Into::into).collect(),
        }))
    }
}

/// All supported operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "payload", rename_all = "snake_case")]
pub enum Operation {
    /// Derive everything reachable from the selected facts.
    Saturate(SaturatePayload),

    /// Forward chain until a target fact is derived.
    DeriveTarget(DeriveTargetPayload),

    /// Justify a target fact backwards through the rules.
    Prove(ProvePayload),
}

impl Operation {
    /// Short operation name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Saturate(_) => "saturate",
            Self::DeriveTarget(_) => "derive_target",
            Self::Prove(_) => "prove",
        }
    }
}

/// Payload for SATURATE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaturatePayload {
    /// Selected starting fact ids.
    #[serde(default)]
    pub facts: Vec<String>,
}

/// Payload for DERIVE_TARGET.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveTargetPayload {
    /// Id of the fact to reach.
    pub target: String,

    /// Selected starting fact ids.
    #[serde(default)]
    pub facts: Vec<String>,
}

/// Payload for PROVE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvePayload {
    /// Id of the fact to prove.
    pub target: String,

    /// Ids of the facts taken as known.
    #[serde(default)]
    pub known: Vec<String>,
}
