//! # Implementation Rules
//!
//! Implementation rules convert logical operators to the physical convention. They
//! are converter rules: they change the trait set and nothing else, so the
//! heuristic planner only fires them when a parent or the root requires physical
//! input.
//!
//! Each alternative asks for its inputs in the physical convention through
//! `Rel::Convert`, which the planners resolve to the physical subset (or the
//! demand for one) of the same input.
//!
//! ## Join Strategies
//!
//! A logical join yields one alternative per applicable strategy and the cost
//! model chooses between them:
//!
//! - **Hash join**: linear in both inputs. Only for conditions with an equality
//!   between two columns.
//! - **Nested loop join**: quadratic, but works for any condition. Always offered.

use relopt_core::{ConverterSpec, Operand, Rel, Rule, RuleCall, RuleResult};

use crate::op::{Convention, JoinStrategy, RelBody, RelOp, RelOpKind};

/// Implements logical operators of one kind in the physical convention.
pub struct ImplementRule {
    kind: RelOpKind,
    description: String,
}

impl ImplementRule {
    pub fn new(kind: RelOpKind) -> Self {
        Self {
            kind,
            description: format!("Implement({:?})", kind),
        }
    }
}

impl Rule<RelOp> for ImplementRule {
    fn description(&self) -> &str {
        &self.description
    }

    fn operand(&self) -> Operand<RelOpKind> {
        Operand::of(self.kind).with_traits(Convention::Logical.trait_set())
    }

    fn on_match(&self, call: &mut RuleCall<RelOp>) -> RuleResult {
        let matched = call.rel(0);
        let op = matched.op();
        let physical = Convention::Physical.trait_set();
        let inputs: Vec<Rel<RelOp>> = matched
            .inputs()
            .iter()
            .map(|input| Rel::Convert(*input, physical.clone()))
            .collect();

        let alternatives = match &op.body {
            RelBody::Join { condition, .. } => {
                let mut strategies = Vec::new();
                if condition.has_equi_conjunct() {
                    strategies.push(JoinStrategy::Hash);
                }
                strategies.push(JoinStrategy::NestedLoop);
                strategies
                    .into_iter()
                    .filter_map(|s| op.to_physical_join(s))
                    .collect()
            }
            _ => vec![op.to_physical()],
        };
        for alternative in alternatives {
            call.transform_to(Rel::node(alternative, inputs.clone()));
        }
        Ok(())
    }

    fn rule_class(&self) -> &str {
        "ImplementRule"
    }

    fn converter(&self) -> Option<ConverterSpec> {
        Some(ConverterSpec {
            out_traits: Convention::Physical.trait_set(),
            guaranteed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_metadata() {
        let rule = ImplementRule::new(RelOpKind::Join);
        assert_eq!(rule.description(), "Implement(Join)");
        assert_eq!(rule.rule_class(), "ImplementRule");
        let spec = rule.converter().unwrap();
        assert!(spec.guaranteed);
        assert_eq!(spec.out_traits.to_string(), "PHYSICAL");
    }
}
