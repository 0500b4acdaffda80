//! JSON documents for queries.
//!
//! Queries arrive from files and other processes, so a document that does
//! not decode is the caller's mistake and reported as a validation error.
//! A decoded query is validated before it is handed back.

use crate::error::{FactchainError, FactchainResult, ValidationError};
use crate::ir::operations::Query;

/// Renders a query as indented JSON.
pub fn to_json_pretty(query: &Query) -> FactchainResult<String> {
    serde_json::to_string_pretty(query).map_err(|e| FactchainError::internal(format!("encode query: {e}")))
}

/// Decodes and validates a query document.
pub fn from_json(text: &str) -> FactchainResult<Query> {
    let query: Query = serde_json::from_str(text).map_err(|e| ValidationError::MalformedQuery {
        reason: e.to_string(),
    })?;
    query.validate()?;
    Ok(query)
}
