//! End-to-end heuristic rewrites over the reference algebra.
//!
//! Each test builds a small logical plan, runs a `HepProgram` over it and checks the
//! shape of the rewritten tree.

use relopt_algebra::op::{Convention, JoinType, RelBody, RelOp, RelOpKind};
use relopt_algebra::scalar::{BinaryOp, Expr};
use relopt_algebra::{implementation_rules, rewrite_rules};
use relopt_core::{EventLog, HepPlanner, HepProgram, MatchOrder, Operator, Rel};
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

fn scan_a() -> Rel<RelOp> {
    Rel::leaf(RelOp::scan("a", &[("a_id", "BIGINT"), ("a_v", "BIGINT")], 100.0))
}

fn scan_b() -> Rel<RelOp> {
    Rel::leaf(RelOp::scan("b", &[("b_id", "BIGINT"), ("b_v", "BIGINT")], 1000.0))
}

fn cross(left: Rel<RelOp>, right: Rel<RelOp>) -> Rel<RelOp> {
    Rel::node(RelOp::join(JoinType::Cross, Expr::and(vec![])), vec![left, right])
}

fn gt(col: &str, v: i64) -> Expr {
    Expr::binary(BinaryOp::Gt, Expr::col(col), Expr::int(v))
}

fn kinds(rel: &Rel<RelOp>) -> Vec<RelOpKind> {
    let mut out: Vec<RelOpKind> = rel.op().map(|op| op.kind()).into_iter().collect();
    for input in rel.inputs() {
        out.extend(kinds(input));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_filters_merge_then_push_into_join() {
    init_tracing();
    let plan = Rel::node(
        RelOp::filter(gt("a_v", 1)),
        vec![Rel::node(
            RelOp::filter(Expr::binary(BinaryOp::Lt, Expr::col("b_v"), Expr::int(5))),
            vec![cross(scan_a(), scan_b())],
        )],
    );
    let program = HepProgram::builder()
        .add_rule_instance(std::sync::Arc::new(
            relopt_algebra::filter_merge::FilterMergeRule,
        ))
        .add_rule_instance(std::sync::Arc::new(
            relopt_algebra::predicate_pushdown::PredicatePushdownRule,
        ))
        .build()
        .unwrap();

    let mut planner = HepPlanner::new(program);
    planner.set_root(&plan).unwrap();
    let result = planner.find_best_exp().unwrap();

    assert_eq!(planner.transformation_count(), 2);
    assert_eq!(
        result.op().unwrap().digest(),
        "Join(Inner, b_v < 5 AND a_v > 1)"
    );
    assert_eq!(
        kinds(&result),
        vec![RelOpKind::Join, RelOpKind::Scan, RelOpKind::Scan]
    );
}

#[test]
fn test_true_filter_and_stacked_projects_collapse() {
    init_tracing();
    let plan = Rel::node(
        RelOp::project(vec![(
            Expr::binary(BinaryOp::Plus, Expr::col("x"), Expr::int(1)),
            "y",
        )]),
        vec![Rel::node(
            RelOp::project(vec![(
                Expr::binary(BinaryOp::Multiply, Expr::col("a_v"), Expr::int(2)),
                "x",
            )]),
            vec![Rel::node(RelOp::filter(Expr::and(vec![])), vec![scan_a()])],
        )],
    );
    let program = HepProgram::builder()
        .add_match_order(MatchOrder::BottomUp)
        .add_rule_collection(rewrite_rules())
        .build()
        .unwrap();

    let log = EventLog::new();
    let mut planner = HepPlanner::new(program);
    planner.set_listener(Box::new(log.clone()));
    planner.set_root(&plan).unwrap();
    let result = planner.find_best_exp().unwrap();

    assert_eq!(result.op().unwrap().digest(), "Project(a_v * 2 + 1 AS y)");
    assert_eq!(kinds(&result), vec![RelOpKind::Project, RelOpKind::Scan]);
    let fired = log.fired();
    assert!(fired.contains(&"FilterRemoveTrue".to_string()));
    assert!(fired.contains(&"ProjectMerge".to_string()));
}

#[test]
fn test_left_join_keeps_filter() {
    let plan = Rel::node(
        RelOp::filter(gt("b_v", 3)),
        vec![Rel::node(
            RelOp::join(JoinType::Left, Expr::eq(Expr::col("a_id"), Expr::col("b_id"))),
            vec![scan_a(), scan_b()],
        )],
    );
    let program = HepProgram::builder()
        .add_rule_collection(rewrite_rules())
        .build()
        .unwrap();
    let mut planner = HepPlanner::new(program);
    planner.set_root(&plan).unwrap();
    let result = planner.find_best_exp().unwrap();
    assert_eq!(planner.transformation_count(), 0);
    assert_eq!(result, plan);
}

#[test]
fn test_converters_implement_whole_tree_for_physical_root() {
    init_tracing();
    let plan = Rel::node(
        RelOp::join(JoinType::Inner, Expr::eq(Expr::col("a_id"), Expr::col("b_id"))),
        vec![scan_a(), scan_b()],
    );
    let program = HepProgram::builder()
        .add_rule_collection(rewrite_rules())
        .add_converters(true)
        .build()
        .unwrap();

    let mut planner = HepPlanner::new(program);
    for rule in implementation_rules() {
        planner.add_rule(rule);
    }
    planner.change_root_traits(Convention::Physical.trait_set());
    planner.set_root(&plan).unwrap();
    let result = planner.find_best_exp().unwrap();

    let root = result.op().unwrap();
    assert_eq!(root.convention, Convention::Physical);
    assert!(root.digest().starts_with("HashJoin"));
    for input in result.inputs() {
        assert_eq!(input.op().unwrap().convention, Convention::Physical);
    }
}

#[test]
fn test_converters_idle_without_demand() {
    let program = HepProgram::builder().add_converters(true).build().unwrap();
    let mut planner = HepPlanner::new(program);
    for rule in implementation_rules() {
        planner.add_rule(rule);
    }
    planner.set_root(&scan_a()).unwrap();
    let result = planner.find_best_exp().unwrap();
    assert_eq!(planner.transformation_count(), 0);
    assert!(matches!(result.op().unwrap().body, RelBody::Scan { .. }));
}

#[test]
fn test_plan_serializes_to_json() {
    let plan = Rel::node(RelOp::limit(5), vec![scan_a()]);
    let json = serde_json::to_value(&plan).unwrap();
    assert!(json.to_string().contains("\"Limit\""));
    let back: Rel<RelOp> = serde_json::from_value(json).unwrap();
    assert_eq!(back, plan);
}
