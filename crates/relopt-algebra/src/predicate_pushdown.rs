//! # Predicate Pushdown Rule
//!
//! Merges a filter that sits on top of a join into the join condition, so rows are
//! discarded while joining instead of in a separate pass afterwards.
//!
//! ```text
//! Before: Filter(pred, Join(A, B, cond))
//! After:  Join(A, B, cond AND pred)
//! ```
//!
//! Only inner and cross joins are rewritten. A filter above a left join also removes
//! the null-extended rows, which a join condition would keep. A cross join with a
//! pushed predicate becomes an inner join.

use relopt_core::{Operand, Rel, Rule, RuleCall, RuleResult};
use tracing::trace;

use crate::op::{JoinType, RelBody, RelOp, RelOpKind};
use crate::scalar::Expr;

/// Push filter predicates into join conditions.
pub struct PredicatePushdownRule;

impl Rule<RelOp> for PredicatePushdownRule {
    fn description(&self) -> &str {
        "PredicatePushdown"
    }

    fn operand(&self) -> Operand<RelOpKind> {
        // Filter(Join(_, _))
        Operand::with_children(
            RelOpKind::Filter,
            vec![Operand::with_children(
                RelOpKind::Join,
                vec![Operand::any(), Operand::any()],
            )],
        )
    }

    fn on_match(&self, call: &mut RuleCall<RelOp>) -> RuleResult {
        let filter = call.rel(0);
        let join = call.rel(1);
        let RelBody::Filter { predicate } = &filter.op().body else {
            return Ok(());
        };
        let RelBody::Join {
            join_type,
            condition,
            strategy,
        } = &join.op().body
        else {
            return Ok(());
        };
        if !filter.op().is_logical() || !join.op().is_logical() {
            return Ok(());
        }
        if !matches!(join_type, JoinType::Inner | JoinType::Cross) {
            trace!("Not pushing {} into {:?} join", predicate, join_type);
            return Ok(());
        }

        let pushed = RelOp::logical(RelBody::Join {
            join_type: JoinType::Inner,
            condition: Expr::and(vec![condition.clone(), predicate.clone()]),
            strategy: *strategy,
        });
        let inputs = join.input_rels();
        call.transform_to(Rel::node(pushed, inputs));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_metadata() {
        let rule = PredicatePushdownRule;
        assert_eq!(rule.description(), "PredicatePushdown");
        let operand = rule.operand();
        assert_eq!(operand.children().len(), 1);
        assert_eq!(operand.children()[0].children().len(), 2);
    }
}
