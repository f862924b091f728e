//! Planner errors.
//!
//! Every failure in this crate is fatal for the planning run that raised it; nothing
//! is retried internally.

use thiserror::Error;

use crate::expr::{RelRef, RowType};

pub type Result<T> = std::result::Result<T, PlanError>;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("cycle detected through {vertices:?}")]
    CycleDetected { vertices: Vec<RelRef> },

    #[error("row type mismatch: {left} vs {right}")]
    RowTypeMismatch { left: RowType, right: RowType },

    #[error("malformed program: {0}")]
    MalformedProgram(String),

    /// The dump describes every set and subset at the time of failure.
    #[error("node {subset} could not be implemented; planner state:\n{dump}")]
    NoPlanFound { subset: String, dump: String },

    #[error("rule {rule} failed")]
    RuleFailed {
        rule: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("search space exhausted: {sets} sets exceeds limit of {limit}")]
    SearchSpaceExhausted { sets: usize, limit: usize },

    #[error("no root expression has been set")]
    NoRoot,

    #[error("reference {0} does not name a planner node")]
    DanglingRef(RelRef),
}
