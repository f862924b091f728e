//! End-to-end cost-based search over the reference algebra.
//!
//! Logical plans are registered with a physical root requirement, so every plan the
//! planner returns has been implemented by the converter rules and chosen by cost.

use relopt_algebra::default_rule_registry;
use relopt_algebra::op::{Convention, JoinStrategy, JoinType, RelBody, RelOp};
use relopt_algebra::scalar::{BinaryOp, Expr};
use relopt_core::{Cost, Operator, PlanError, Rel, SearchConfig, VolcanoPlanner};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn scan(table: &str, prefix: &str, rows: f64) -> Rel<RelOp> {
    let id = format!("{}_id", prefix);
    let v = format!("{}_v", prefix);
    Rel::leaf(RelOp::scan(table, &[(id.as_str(), "BIGINT"), (v.as_str(), "BIGINT")], rows))
}

fn planner() -> VolcanoPlanner<RelOp> {
    let mut planner = VolcanoPlanner::new(SearchConfig::default());
    for rule in default_rule_registry().iter() {
        planner.add_rule(rule.clone());
    }
    planner.change_root_traits(Convention::Physical.trait_set());
    planner
}

fn strategy(rel: &Rel<RelOp>) -> Option<JoinStrategy> {
    match &rel.op()?.body {
        RelBody::Join { strategy, .. } => Some(*strategy),
        _ => None,
    }
}

fn all_physical(rel: &Rel<RelOp>) -> bool {
    rel.op().map_or(false, |op| op.convention == Convention::Physical)
        && rel.inputs().iter().all(all_physical)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_equi_join_prefers_hash_join() {
    init_tracing();
    let plan = Rel::node(
        RelOp::join(JoinType::Inner, Expr::eq(Expr::col("a_id"), Expr::col("b_id"))),
        vec![scan("a", "a", 100.0), scan("b", "b", 1000.0)],
    );
    let mut planner = planner();
    let root = planner.set_root(&plan).unwrap();
    let best = planner.find_best_exp().unwrap();

    assert!(all_physical(&best));
    assert_eq!(strategy(&best), Some(JoinStrategy::Hash));
    // Logical root subset never gets an implementable plan.
    assert!(planner.best_cost(root).unwrap().is_infinite());
}

#[test]
fn test_non_equi_join_falls_back_to_nested_loop() {
    let cond = Expr::binary(BinaryOp::Lt, Expr::col("a_v"), Expr::col("b_v"));
    let plan = Rel::node(
        RelOp::join(JoinType::Inner, cond),
        vec![scan("a", "a", 10.0), scan("b", "b", 10.0)],
    );
    let mut planner = planner();
    planner.set_root(&plan).unwrap();
    let best = planner.find_best_exp().unwrap();
    assert_eq!(strategy(&best), Some(JoinStrategy::NestedLoop));
}

#[test]
fn test_pushdown_beats_filter_over_cross_join() {
    init_tracing();
    let plan = Rel::node(
        RelOp::filter(Expr::eq(Expr::col("a_id"), Expr::col("b_id"))),
        vec![Rel::node(
            RelOp::join(JoinType::Cross, Expr::and(vec![])),
            vec![scan("a", "a", 100.0), scan("b", "b", 1000.0)],
        )],
    );
    let mut planner = planner();
    planner.set_root(&plan).unwrap();
    let best = planner.find_best_exp().unwrap();

    assert!(all_physical(&best));
    let root = best.op().unwrap();
    assert_eq!(root.digest(), "HashJoin(Inner, a_id = b_id)");
    let pushed = planner
        .subset_of(&Rel::node(
            RelOp::join(JoinType::Inner, Expr::eq(Expr::col("a_id"), Expr::col("b_id"))),
            vec![scan("a", "a", 100.0), scan("b", "b", 1000.0)],
        ))
        .unwrap();
    let filtered = planner.subset_of(&plan).unwrap();
    assert!(planner.is_equivalent(pushed, filtered));
}

#[test]
fn test_best_cost_of_physical_subset() {
    let plan = Rel::node(RelOp::limit(10), vec![scan("a", "a", 100.0)]);
    let mut planner = planner();
    planner.set_root(&plan).unwrap();
    let best = planner.find_best_exp().unwrap();

    let physical = planner
        .subset_of(&Rel::node(
            RelOp::limit(10).to_physical(),
            vec![Rel::leaf(
                RelOp::scan("a", &[("a_id", "BIGINT"), ("a_v", "BIGINT")], 100.0).to_physical(),
            )],
        ))
        .unwrap();
    assert_eq!(
        planner.best_cost(physical),
        Some(Cost::new(110.0, 110.0, 100.0))
    );
    assert_eq!(best.node_count(), 2);
}

#[test]
fn test_logical_root_cannot_be_implemented_without_rules() {
    let mut planner = VolcanoPlanner::new(SearchConfig::default());
    planner.set_root(&scan("a", "a", 100.0)).unwrap();
    match planner.find_best_exp() {
        Err(PlanError::NoPlanFound { subset, dump }) => {
            assert_eq!(subset, "Subset#0.LOGICAL");
            assert!(dump.contains("Scan(a).LOGICAL()"));
        }
        other => panic!("expected NoPlanFound, got {:?}", other.map(|r| r.node_count())),
    }
}

#[test]
fn test_search_config_from_json() {
    let config: SearchConfig = serde_json::from_str(r#"{"max_iterations": 5}"#).unwrap();
    assert_eq!(config.max_iterations, 5);
    assert_eq!(config.max_sets, SearchConfig::default().max_sets);
}
