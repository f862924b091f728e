//! # Filter Merge and Removal
//!
//! Two rules that shrink filter chains:
//!
//! ```text
//! FilterMerge:       Filter(p, Filter(q, X))  ->  Filter(q AND p, X)
//! FilterRemoveTrue:  Filter(TRUE, X)          ->  X
//! ```
//!
//! `FilterRemoveTrue` does not build a new node; it names the input itself as the
//! equivalent expression, which makes the filter and its input interchangeable.

use relopt_core::{Operand, Rel, Rule, RuleCall, RuleResult};

use crate::op::{RelBody, RelOp, RelOpKind};
use crate::scalar::Expr;

/// Combine two stacked filters into one.
pub struct FilterMergeRule;

impl Rule<RelOp> for FilterMergeRule {
    fn description(&self) -> &str {
        "FilterMerge"
    }

    fn operand(&self) -> Operand<RelOpKind> {
        Operand::with_children(RelOpKind::Filter, vec![Operand::of(RelOpKind::Filter)])
    }

    fn on_match(&self, call: &mut RuleCall<RelOp>) -> RuleResult {
        let top = call.rel(0);
        let bottom = call.rel(1);
        let (RelBody::Filter { predicate: outer }, RelBody::Filter { predicate: inner }) =
            (&top.op().body, &bottom.op().body)
        else {
            return Ok(());
        };
        if top.op().convention != bottom.op().convention {
            return Ok(());
        }

        let mut merged = RelOp::filter(Expr::and(vec![inner.clone(), outer.clone()]));
        merged.convention = top.op().convention;
        let inputs = bottom.input_rels();
        call.transform_to(Rel::node(merged, inputs));
        Ok(())
    }
}

/// Drop a filter whose predicate is always true.
pub struct FilterRemoveTrueRule;

impl Rule<RelOp> for FilterRemoveTrueRule {
    fn description(&self) -> &str {
        "FilterRemoveTrue"
    }

    fn operand(&self) -> Operand<RelOpKind> {
        Operand::of(RelOpKind::Filter)
    }

    fn on_match(&self, call: &mut RuleCall<RelOp>) -> RuleResult {
        let filter = call.rel(0);
        let RelBody::Filter { predicate } = &filter.op().body else {
            return Ok(());
        };
        if !predicate.is_true() {
            return Ok(());
        }
        let input = filter.input(0).ok_or("filter without input")?;
        call.transform_to(Rel::Ref(input));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_metadata() {
        assert_eq!(FilterMergeRule.description(), "FilterMerge");
        assert_eq!(
            FilterMergeRule.operand().children(),
            &[Operand::of(RelOpKind::Filter)]
        );
        assert!(FilterRemoveTrueRule.converter().is_none());
    }
}
