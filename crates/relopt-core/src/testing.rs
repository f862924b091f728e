//! Scripted operator and rule helpers for unit tests.

use std::sync::Arc;

use crate::cost::Cost;
use crate::expr::{Field, Operator, Rel, RowType, TraitSet};
use crate::pattern::Operand;
use crate::rule::{ConverterSpec, Rule, RuleCall, RuleResult};

/// Operator whose kind, label, traits, cost and row count are set by the test.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TestOp {
    pub kind: &'static str,
    pub label: String,
    pub traits: TraitSet,
    pub cost: f64,
    pub rows: f64,
    pub width: usize,
}

impl TestOp {
    pub fn new(kind: &'static str, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
            traits: TraitSet::of("LOGICAL"),
            cost: 1.0,
            rows: 10.0,
            width: 1,
        }
    }

    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_traits(mut self, traits: &str) -> Self {
        self.traits = TraitSet::of(traits);
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

impl Operator for TestOp {
    type Kind = &'static str;

    fn kind(&self) -> &'static str {
        self.kind
    }

    fn digest(&self) -> String {
        format!("{}[{}]", self.kind, self.label)
    }

    fn traits(&self) -> TraitSet {
        self.traits.clone()
    }

    fn row_type(&self, _inputs: &[RowType]) -> RowType {
        RowType::new(
            (0..self.width)
                .map(|i| Field {
                    name: format!("c{}", i),
                    data_type: "INTEGER".to_string(),
                })
                .collect(),
        )
    }

    fn row_count(&self, _input_rows: &[f64]) -> f64 {
        self.rows
    }

    fn self_cost(&self, _input_rows: &[f64]) -> Cost {
        Cost::new(self.cost, 1.0, 1.0)
    }
}

pub(crate) fn leaf(kind: &'static str, label: &str) -> Rel<TestOp> {
    Rel::leaf(TestOp::new(kind, label))
}

pub(crate) fn node(kind: &'static str, label: &str, inputs: Vec<Rel<TestOp>>) -> Rel<TestOp> {
    Rel::node(TestOp::new(kind, label), inputs)
}

type Body = dyn Fn(&mut RuleCall<TestOp>) -> RuleResult + Send + Sync;

/// Rule whose behaviour is a closure.
pub(crate) struct FnRule {
    description: String,
    class: Option<String>,
    operand: Operand<&'static str>,
    converter: Option<ConverterSpec>,
    body: Box<Body>,
}

impl FnRule {
    pub fn new(
        description: &str,
        operand: Operand<&'static str>,
        body: impl Fn(&mut RuleCall<TestOp>) -> RuleResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.to_string(),
            class: None,
            operand,
            converter: None,
            body: Box::new(body),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn with_converter(mut self, out_traits: TraitSet, guaranteed: bool) -> Self {
        self.converter = Some(ConverterSpec {
            out_traits,
            guaranteed,
        });
        self
    }

    pub fn arc(self) -> Arc<dyn Rule<TestOp>> {
        Arc::new(self)
    }
}

impl Rule<TestOp> for FnRule {
    fn description(&self) -> &str {
        &self.description
    }

    fn operand(&self) -> Operand<&'static str> {
        self.operand.clone()
    }

    fn on_match(&self, call: &mut RuleCall<TestOp>) -> RuleResult {
        (self.body)(call)
    }

    fn rule_class(&self) -> &str {
        match &self.class {
            Some(class) => class,
            None => std::any::type_name::<Self>(),
        }
    }

    fn converter(&self) -> Option<ConverterSpec> {
        self.converter.clone()
    }
}

/// Rewrites every `from` node into a `to` node with the same label and inputs.
pub(crate) fn rename_rule(
    description: &str,
    from: &'static str,
    to: &'static str,
) -> Arc<dyn Rule<TestOp>> {
    FnRule::new(description, Operand::of(from), move |call| {
        let matched = call.rel(0);
        let op = matched.op().clone().with_kind(to);
        let inputs = matched.input_rels();
        call.transform_to(Rel::node(op, inputs));
        Ok(())
    })
    .arc()
}
