//! # Project Merge Rule
//!
//! Collapses two stacked projections by substituting the inner projection's
//! expressions into the outer one:
//!
//! ```text
//! Before: Project(a + 1 AS x, Project(p * 2 AS a, X))
//! After:  Project(p * 2 + 1 AS x, X)
//! ```
//!
//! The outer aliases are kept, so the merged node has the same row type as the
//! outer projection.

use relopt_core::{Operand, Rel, Rule, RuleCall, RuleResult};
use std::collections::HashMap;

use crate::op::{RelBody, RelOp, RelOpKind};
use crate::scalar::Expr;

pub struct ProjectMergeRule;

impl Rule<RelOp> for ProjectMergeRule {
    fn description(&self) -> &str {
        "ProjectMerge"
    }

    fn operand(&self) -> Operand<RelOpKind> {
        Operand::with_children(RelOpKind::Project, vec![Operand::of(RelOpKind::Project)])
    }

    fn on_match(&self, call: &mut RuleCall<RelOp>) -> RuleResult {
        let outer = call.rel(0);
        let inner = call.rel(1);
        let (
            RelBody::Project {
                exprs: outer_exprs,
                aliases,
            },
            RelBody::Project {
                exprs: inner_exprs,
                aliases: inner_aliases,
            },
        ) = (&outer.op().body, &inner.op().body)
        else {
            return Ok(());
        };
        if outer.op().convention != inner.op().convention {
            return Ok(());
        }

        let definitions: HashMap<&str, &Expr> = inner_aliases
            .iter()
            .map(String::as_str)
            .zip(inner_exprs)
            .collect();
        let Some(exprs) = outer_exprs
            .iter()
            .map(|e| substitute(e, &definitions))
            .collect::<Option<Vec<_>>>()
        else {
            return Ok(());
        };

        let merged = RelOp {
            body: RelBody::Project {
                exprs,
                aliases: aliases.clone(),
            },
            convention: outer.op().convention,
        };
        let inputs = inner.input_rels();
        call.transform_to(Rel::node(merged, inputs));
        Ok(())
    }
}

/// Replace column references by their definitions. `None` if a column is undefined.
fn substitute(expr: &Expr, definitions: &HashMap<&str, &Expr>) -> Option<Expr> {
    Some(match expr {
        Expr::Column(name) => (*definitions.get(name.as_str())?).clone(),
        Expr::Literal(_) => expr.clone(),
        Expr::BinaryOp { op, left, right } => Expr::BinaryOp {
            op: *op,
            left: Box::new(substitute(left, definitions)?),
            right: Box::new(substitute(right, definitions)?),
        },
        Expr::Not(inner) => Expr::Not(Box::new(substitute(inner, definitions)?)),
        Expr::And(exprs) => Expr::And(
            exprs
                .iter()
                .map(|e| substitute(e, definitions))
                .collect::<Option<_>>()?,
        ),
        Expr::Or(exprs) => Expr::Or(
            exprs
                .iter()
                .map(|e| substitute(e, definitions))
                .collect::<Option<_>>()?,
        ),
    })
}
