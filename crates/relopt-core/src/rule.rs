//! # Rule System
//!
//! This module defines the rule trait and the rule registry shared by the heuristic
//! and the cost-based planner.
//!
//! ## Rules
//!
//! A rule is an [`Operand`] tree plus a callback. When the operand matches, the
//! planner builds a [`RuleCall`] holding the matched nodes in pre-order and invokes
//! [`Rule::on_match`]. The rule may emit any number of equivalent alternatives with
//! [`RuleCall::transform_to`]; emitting nothing is a valid outcome.
//!
//! Alternatives are `Rel` trees. Leaves that refer to existing planner nodes use the
//! handles found in the bindings:
//!
//! ```text
//! Filter(p)                          Filter(p AND q)
//!   Filter(q)          ==>             #7
//!     #7
//! ```
//!
//! ## Converters
//!
//! A converter rule only changes the trait set of its input (for example, logical to
//! physical). It declares this through [`Rule::converter`]. The heuristic planner
//! fires a converter only when a parent or the requested root traits actually demand
//! the traits it produces, which keeps conversion chains from growing without bound.
//!
//! ## Rule Registry
//!
//! [`RuleRegistry`] keeps rules in insertion order, keyed by their description.
//! Programs can look rules up by description, by class (the family name shared by
//! instances of the same rule type), or collect every converter.

use crate::expr::{Operator, Rel, TraitSet};
use crate::pattern::{Binding, Operand};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Outcome of a rule callback. Errors propagate out of the planner unchanged.
pub type RuleResult = Result<(), Box<dyn Error + Send + Sync>>;

/// What a converter rule produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterSpec {
    /// Trait set of the converted expression.
    pub out_traits: TraitSet,
    /// Whether the conversion always succeeds.
    pub guaranteed: bool,
}

/// A rule rewrites a matched expression into equivalent alternatives.
pub trait Rule<O: Operator>: Send + Sync {
    /// Stable, unique name of this rule instance.
    fn description(&self) -> &str;

    /// Operand tree this rule matches against.
    fn operand(&self) -> Operand<O::Kind>;

    /// Called once per match. Alternatives are emitted with [`RuleCall::transform_to`].
    fn on_match(&self, call: &mut RuleCall<O>) -> RuleResult;

    /// Family name shared by all instances of this rule type.
    fn rule_class(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// `Some` for trait-changing converter rules.
    fn converter(&self) -> Option<ConverterSpec> {
        None
    }
}

/// One invocation of a rule on a matched expression.
pub struct RuleCall<O> {
    bindings: Vec<Binding<O>>,
    results: Vec<Rel<O>>,
}

impl<O: Clone> RuleCall<O> {
    pub(crate) fn new(bindings: Vec<Binding<O>>) -> Self {
        Self {
            bindings,
            results: Vec::new(),
        }
    }

    /// The `i`-th matched node, pre-order. Index 0 is the node the operand root matched.
    ///
    /// # Panics
    ///
    /// If `i` is not less than the number of operands in the rule's operand tree.
    pub fn rel(&self, i: usize) -> &Binding<O> {
        &self.bindings[i]
    }

    pub fn bindings(&self) -> &[Binding<O>] {
        &self.bindings
    }

    /// Register an alternative equivalent to `rel(0)`.
    pub fn transform_to(&mut self, alternative: Rel<O>) {
        self.results.push(alternative);
    }

    pub fn results(&self) -> &[Rel<O>] {
        &self.results
    }

    pub(crate) fn into_parts(self) -> (Vec<Binding<O>>, Vec<Rel<O>>) {
        (self.bindings, self.results)
    }
}

/// Registry of rules, keyed by description.
pub struct RuleRegistry<O: Operator> {
    rules: Vec<Arc<dyn Rule<O>>>,
}

impl<O: Operator> RuleRegistry<O> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Add a rule. Returns false if a rule with the same description is already present.
    pub fn add(&mut self, rule: Arc<dyn Rule<O>>) -> bool {
        if self.get(rule.description()).is_some() {
            return false;
        }
        self.rules.push(rule);
        true
    }

    /// Remove the rule with the given description. Returns false if absent.
    pub fn remove(&mut self, description: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.description() != description);
        self.rules.len() != before
    }

    pub fn get(&self, description: &str) -> Option<&Arc<dyn Rule<O>>> {
        self.rules.iter().find(|r| r.description() == description)
    }

    /// Registered rules whose class equals `class`.
    pub fn by_class(&self, class: &str) -> Vec<Arc<dyn Rule<O>>> {
        self.rules
            .iter()
            .filter(|r| r.rule_class() == class)
            .cloned()
            .collect()
    }

    /// Registered converter rules whose guarantee flag equals `guaranteed`.
    pub fn converters(&self, guaranteed: bool) -> Vec<Arc<dyn Rule<O>>> {
        self.rules
            .iter()
            .filter(|r| {
                r.converter()
                    .map_or(false, |spec| spec.guaranteed == guaranteed)
            })
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Rule<O>>> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<O: Operator> Default for RuleRegistry<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Operator> fmt::Debug for RuleRegistry<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.description()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{rename_rule, FnRule};

    #[test]
    fn test_add_rejects_duplicate_description() {
        let mut registry = RuleRegistry::new();
        assert!(registry.add(rename_rule("AtoB", "A", "B")));
        assert!(!registry.add(rename_rule("AtoB", "A", "C")));
        assert!(registry.add(rename_rule("AtoC", "A", "C")));
        assert_eq!(registry.len(), 2);

        assert!(registry.remove("AtoB"));
        assert!(!registry.remove("AtoB"));
        assert!(registry.get("AtoB").is_none());
        assert!(registry.get("AtoC").is_some());
    }

    #[test]
    fn test_lookup_by_class_and_converters() {
        let mut registry = RuleRegistry::new();
        registry.add(rename_rule("r1", "A", "B"));
        registry.add(
            FnRule::new("r2", Operand::of("B"), |_| Ok(()))
                .with_class("Family")
                .arc(),
        );
        registry.add(
            FnRule::new("conv", Operand::of("B"), |_| Ok(()))
                .with_class("Family")
                .with_converter(TraitSet::of("PHYSICAL"), false)
                .arc(),
        );

        let family: Vec<_> = registry
            .by_class("Family")
            .iter()
            .map(|r| r.description().to_string())
            .collect();
        assert_eq!(family, vec!["r2", "conv"]);
        assert_eq!(registry.converters(false).len(), 1);
        assert!(registry.converters(true).is_empty());
    }

    #[test]
    fn test_default_rule_class_is_type_name() {
        let rule = FnRule::new("r", Operand::of("A"), |_| Ok(()));
        assert!(Rule::rule_class(&rule).ends_with("FnRule"));
    }
}
