//! # Reference Relational Algebra
//!
//! A small relational algebra ([`op::RelOp`]) and a set of rules for it, used to
//! drive both planners of `relopt-core` end to end.
//!
//! ## Rewrite Rules (Logical -> Logical)
//!
//! - **`FilterMergeRule`**: Combines two stacked filters into one.
//! - **`FilterRemoveTrueRule`**: Replaces a filter on `TRUE` by its input.
//! - **`ProjectMergeRule`**: Collapses two stacked projections.
//! - **`PredicatePushdownRule`**: Merges a filter predicate into the condition of
//!   the inner join below it.
//!
//! ## Implementation Rules (Logical -> Physical)
//!
//! - **`ImplementRule`**: One instance per operator kind. Joins get a hash join
//!   (equi-joins only) and a nested loop join alternative.

pub mod filter_merge;
pub mod implement;
pub mod op;
pub mod predicate_pushdown;
pub mod project_merge;
pub mod scalar;

use relopt_core::{Rule, RuleRegistry};
use std::sync::Arc;

use op::{RelOp, RelOpKind};

/// Logical-to-logical rewrite rules, in the order they are usually applied.
pub fn rewrite_rules() -> Vec<Arc<dyn Rule<RelOp>>> {
    vec![
        Arc::new(filter_merge::FilterRemoveTrueRule),
        Arc::new(filter_merge::FilterMergeRule),
        Arc::new(project_merge::ProjectMergeRule),
        Arc::new(predicate_pushdown::PredicatePushdownRule),
    ]
}

/// One implementation rule per operator kind.
pub fn implementation_rules() -> Vec<Arc<dyn Rule<RelOp>>> {
    [
        RelOpKind::Scan,
        RelOpKind::Filter,
        RelOpKind::Project,
        RelOpKind::Join,
        RelOpKind::Sort,
        RelOpKind::Limit,
    ]
    .into_iter()
    .map(|kind| Arc::new(implement::ImplementRule::new(kind)) as Arc<dyn Rule<RelOp>>)
    .collect()
}

/// Create a registry with every built-in rule.
pub fn default_rule_registry() -> RuleRegistry<RelOp> {
    let mut registry = RuleRegistry::new();
    for rule in rewrite_rules().into_iter().chain(implementation_rules()) {
        registry.add(rule);
    }
    registry
}
