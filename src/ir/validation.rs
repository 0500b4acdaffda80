//! Query validation.
//!
//! Queries arriving as JSON are not trusted: ids must be non-empty and
//! selections bounded before the engine resolves them.

use crate::error::ValidationError;
use crate::ir::operations::{DeriveTargetPayload, Operation, ProvePayload, Query, SaturatePayload};

/// Upper bound for a single fact id.
pub const MAX_ID_LEN: usize = 1024;

/// Upper bound for the number of ids in one selection.
pub const MAX_SELECTION: usize = 64 * 1024;

fn validate_id(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ValidationError::MissingField {
            field: field.to_string(),
        });
    }
    if v.len() > MAX_ID_LEN {
        return Err(ValidationError::FieldTooLong {
            field: field.to_string(),
            max_length: MAX_ID_LEN,
        });
    }
    Ok(())
}

fn validate_selection(field: &'static str, ids: &[String]) -> Result<(), ValidationError> {
    if ids.len() > MAX_SELECTION {
        return Err(ValidationError::FieldTooLong {
            field: field.to_string(),
            max_length: MAX_SELECTION,
        });
    }
    ids.iter().try_for_each(|id| validate_id(field, id))
}

impl SaturatePayload {
    /// Validate this payload.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_selection("facts", &self.facts)
    }
}

impl DeriveTargetPayload {
    /// Validate this payload.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_id("target", &self.target)?;
        validate_selection("facts", &self.facts)
    }
}

impl ProvePayload {
    /// Validate this payload.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_id("target", &self.target)?;
        validate_selection("known", &self.known)
    }
}

impl Operation {
    /// Validate the operation payload.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Saturate(p) => p.validate(),
            Self::DeriveTarget(p) => p.validate(),
            Self::Prove(p) => p.validate(),
        }
    }
}

impl Query {
    /// Validate the envelope and its operation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version != Self::CURRENT_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                version: self.version.clone(),
            });
        }
        self.operation.validate()
    }
}
