//! # relopt-core: Relational Plan Optimizer Core
//!
//! Operator-agnostic machinery for rewriting relational plans. Client crates supply
//! an [`Operator`](expr::Operator) type and a set of [`Rule`](rule::Rule)s; this crate
//! matches, rewrites and costs the plans.
//!
//! ## Module Overview
//!
//! - **`expr`**: Operator trait, plan trees, trait sets and row types.
//! - **`pattern`**: Operand trees and matching of operand trees against plan nodes.
//! - **`rule`**: The Rule trait, the rule call context and the rule registry.
//! - **`cost`**: Three-dimensional cost vectors.
//! - **`hep`**: Heuristic planner driven by an instruction program.
//! - **`volcano`**: Cost-based planner over equivalence sets.
//! - **`listener`**: Planner events for tracing and tests.
//! - **`error`**: Planner errors.

pub mod cost;
pub mod error;
pub mod expr;
pub mod hep;
pub mod listener;
pub mod pattern;
pub mod rule;
pub mod volcano;

#[cfg(test)]
mod testing;

pub use cost::Cost;
pub use error::{PlanError, Result};
pub use expr::{Field, Operator, Rel, RelRef, RowType, TraitSet};
pub use hep::{HepPlanner, HepProgram, HepProgramBuilder, MatchOrder};
pub use listener::{EventLog, PlannerEvent, PlannerListener};
pub use pattern::{Binding, Operand};
pub use rule::{ConverterSpec, Rule, RuleCall, RuleRegistry, RuleResult};
pub use volcano::{SearchConfig, VolcanoPlanner};
