//! Query representation for engine operations.
//!
//! Queries are serializable so that a front end can hand the engine a
//! selection as JSON and log or replay it later.

mod operations;
mod serialization;
mod validation;

pub use operations::{DeriveTargetPayload, Operation, ProvePayload, Query, SaturatePayload};

pub use serialization::{from_json, to_json_pretty};
pub use validation::{MAX_ID_LEN, MAX_SELECTION};
