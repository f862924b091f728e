//! # Operand Pattern Matching
//!
//! Every rule declares an [`Operand`] tree describing the shape of expressions it can
//! transform. Before a rule fires, the planner matches the operand tree against the
//! expression rooted at a candidate node and collects the matched nodes, pre-order,
//! into a binding list that is handed to the rule.
//!
//! ## Operand Language
//!
//! - `Operand::Any`: matches any node and does not look at its inputs.
//! - `Operand::Op { kind, traits, children }`: matches a node whose operator kind
//!   equals `kind` (and whose trait set matches `traits`, if given). The node must have
//!   at least as many inputs as there are child operands; child operand `i` is matched
//!   against input `i`. Extra inputs are not inspected.
//!
//! Note the asymmetry with a bare `Operand::Op` with no children: the node matches
//! regardless of its inputs, but the node itself is still bound.
//!
//! ## Input Resolution
//!
//! The matcher is shared by both planners through [`MatchSource`]. A heuristic vertex
//! input resolves to exactly one candidate (the vertex's current expression), while a
//! cost-based subset input resolves to every member of the subset, so
//! [`enumerate_matches`] may produce several binding lists for one root node.

use crate::expr::{Operator, Rel, RelRef, TraitSet};

/// Pattern for matching expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<K> {
    /// Wildcard: matches anything, inputs are not inspected.
    Any,
    Op {
        kind: K,
        traits: Option<TraitSet>,
        children: Vec<Operand<K>>,
    },
}

impl<K: Copy + PartialEq> Operand<K> {
    pub fn any() -> Self {
        Operand::Any
    }

    /// Match a node of the given kind, inputs unconstrained.
    pub fn of(kind: K) -> Self {
        Operand::Op {
            kind,
            traits: None,
            children: vec![],
        }
    }

    /// Match a node of the given kind whose leading inputs match `children`.
    pub fn with_children(kind: K, children: Vec<Operand<K>>) -> Self {
        Operand::Op {
            kind,
            traits: None,
            children,
        }
    }

    /// Restrict the operand to nodes with the given trait set.
    pub fn with_traits(self, required: TraitSet) -> Self {
        match self {
            Operand::Any => Operand::Any,
            Operand::Op { kind, children, .. } => Operand::Op {
                kind,
                traits: Some(required),
                children,
            },
        }
    }

    pub fn children(&self) -> &[Operand<K>] {
        match self {
            Operand::Any => &[],
            Operand::Op { children, .. } => children,
        }
    }

    /// Does this operand accept `op`, ignoring inputs?
    pub fn matches<O>(&self, op: &O) -> bool
    where
        O: Operator<Kind = K>,
    {
        match self {
            Operand::Any => true,
            Operand::Op { kind, traits, .. } => {
                op.kind() == *kind && traits.as_ref().map_or(true, |t| op.traits().matches(t))
            }
        }
    }
}

/// One matched node, as seen by a rule.
#[derive(Debug, Clone)]
pub struct Binding<O> {
    op: O,
    inputs: Vec<RelRef>,
    handle: RelRef,
    pub(crate) node: RelRef,
}

impl<O: Clone> Binding<O> {
    pub fn op(&self) -> &O {
        &self.op
    }

    /// Handles of the node's inputs, usable as `Rel::Ref` leaves.
    pub fn inputs(&self) -> &[RelRef] {
        &self.inputs
    }

    pub fn input(&self, i: usize) -> Option<RelRef> {
        self.inputs.get(i).copied()
    }

    /// The node's inputs as `Rel` leaves, in order.
    pub fn input_rels(&self) -> Vec<Rel<O>> {
        self.inputs.iter().map(|r| Rel::Ref(*r)).collect()
    }

    /// Handle that refers to the matched node itself when used as an input.
    pub fn handle(&self) -> RelRef {
        self.handle
    }
}

/// Read access a planner grants the matcher.
pub trait MatchSource<O: Operator> {
    fn op(&self, node: RelRef) -> Option<&O>;

    fn inputs(&self, node: RelRef) -> Option<&[RelRef]>;

    /// Handle a rule should use to refer to `node` as an input.
    fn handle(&self, node: RelRef) -> RelRef;

    /// Nodes that may stand in for the given input handle.
    fn candidates(&self, input: RelRef) -> Vec<RelRef>;

    fn bind(&self, node: RelRef) -> Option<Binding<O>> {
        Some(Binding {
            op: self.op(node)?.clone(),
            inputs: self.inputs(node)?.to_vec(),
            handle: self.handle(node),
            node,
        })
    }
}

/// Match `operand` against the expression at `node`, using the first candidate of
/// each input.
///
/// Matched nodes are appended to `bindings` in pre-order. On mismatch the function
/// returns false; `bindings` may hold a partial prefix.
pub fn match_operands<O, S>(
    operand: &Operand<O::Kind>,
    source: &S,
    node: RelRef,
    bindings: &mut Vec<Binding<O>>,
) -> bool
where
    O: Operator,
    S: MatchSource<O> + ?Sized,
{
    let Some(op) = source.op(node) else {
        return false;
    };
    if !operand.matches(op) {
        return false;
    }
    let Some(binding) = source.bind(node) else {
        return false;
    };
    let inputs = binding.inputs.clone();
    bindings.push(binding);

    let children = operand.children();
    if inputs.len() < children.len() {
        return false;
    }
    for (child, input) in children.iter().zip(inputs) {
        let Some(candidate) = source.candidates(input).into_iter().next() else {
            return false;
        };
        if !match_operands(child, source, candidate, bindings) {
            return false;
        }
    }
    true
}

/// Every binding list under which `operand` matches the expression at `node`,
/// trying all candidates of each input.
pub fn enumerate_matches<O, S>(
    operand: &Operand<O::Kind>,
    source: &S,
    node: RelRef,
) -> Vec<Vec<Binding<O>>>
where
    O: Operator,
    S: MatchSource<O> + ?Sized,
{
    extend_matches(operand, source, node, Vec::new())
}

fn extend_matches<O, S>(
    operand: &Operand<O::Kind>,
    source: &S,
    node: RelRef,
    mut prefix: Vec<Binding<O>>,
) -> Vec<Vec<Binding<O>>>
where
    O: Operator,
    S: MatchSource<O> + ?Sized,
{
    let Some(op) = source.op(node) else {
        return vec![];
    };
    if !operand.matches(op) {
        return vec![];
    }
    let Some(binding) = source.bind(node) else {
        return vec![];
    };
    let inputs = binding.inputs.clone();
    prefix.push(binding);

    let children = operand.children();
    if inputs.len() < children.len() {
        return vec![];
    }
    let mut partials = vec![prefix];
    for (child, input) in children.iter().zip(inputs) {
        let candidates = source.candidates(input);
        let mut next = Vec::new();
        for partial in &partials {
            for &candidate in &candidates {
                next.extend(extend_matches(child, source, candidate, partial.clone()));
            }
        }
        partials = next;
        if partials.is_empty() {
            break;
        }
    }
    partials
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestOp;
    use std::collections::HashMap;

    /// Nodes by index; an input handle names a group of candidate nodes.
    struct Forest {
        nodes: Vec<(TestOp, Vec<RelRef>)>,
        groups: HashMap<RelRef, Vec<RelRef>>,
    }

    impl Forest {
        fn new() -> Self {
            Self {
                nodes: vec![],
                groups: HashMap::new(),
            }
        }

        fn add(&mut self, op: TestOp, inputs: Vec<RelRef>) -> RelRef {
            self.nodes.push((op, inputs));
            RelRef(self.nodes.len() - 1)
        }

        fn group(&mut self, handle: RelRef, members: Vec<RelRef>) {
            self.groups.insert(handle, members);
        }
    }

    impl MatchSource<TestOp> for Forest {
        fn op(&self, node: RelRef) -> Option<&TestOp> {
            self.nodes.get(node.0).map(|(op, _)| op)
        }

        fn inputs(&self, node: RelRef) -> Option<&[RelRef]> {
            self.nodes.get(node.0).map(|(_, inputs)| inputs.as_slice())
        }

        fn handle(&self, node: RelRef) -> RelRef {
            node
        }

        fn candidates(&self, input: RelRef) -> Vec<RelRef> {
            self.groups.get(&input).cloned().unwrap_or_else(|| vec![input])
        }
    }

    fn filter_over_join() -> (Forest, RelRef) {
        let mut f = Forest::new();
        let a = f.add(TestOp::new("Scan", "a"), vec![]);
        let b = f.add(TestOp::new("Scan", "b"), vec![]);
        let join = f.add(TestOp::new("Join", "j"), vec![a, b]);
        let filter = f.add(TestOp::new("Filter", "p"), vec![join]);
        (f, filter)
    }

    #[test]
    fn test_bindings_are_preorder() {
        let (f, root) = filter_over_join();
        let operand = Operand::with_children(
            "Filter",
            vec![Operand::with_children("Join", vec![Operand::of("Scan"), Operand::any()])],
        );
        let mut bindings = Vec::new();
        assert!(match_operands(&operand, &f, root, &mut bindings));
        let kinds: Vec<_> = bindings.iter().map(|b| b.op().kind).collect();
        assert_eq!(kinds, vec!["Filter", "Join", "Scan", "Scan"]);
    }

    #[test]
    fn test_any_does_not_recurse() {
        let (f, root) = filter_over_join();
        let mut bindings = Vec::new();
        assert!(match_operands(&Operand::<&str>::any(), &f, root, &mut bindings));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_kind_mismatch() {
        let (f, root) = filter_over_join();
        let operand = Operand::with_children("Filter", vec![Operand::of("Scan")]);
        let mut bindings = Vec::new();
        assert!(!match_operands(&operand, &f, root, &mut bindings));
    }

    #[test]
    fn test_requires_enough_inputs() {
        let (f, root) = filter_over_join();
        let operand = Operand::with_children("Filter", vec![Operand::any(), Operand::any()]);
        let mut bindings = Vec::new();
        assert!(!match_operands(&operand, &f, root, &mut bindings));

        // Fewer child operands than inputs is fine.
        let operand = Operand::with_children("Join", vec![Operand::of("Scan")]);
        let mut bindings = Vec::new();
        assert!(match_operands(&operand, &f, RelRef(2), &mut bindings));
    }

    #[test]
    fn test_trait_constraint() {
        let (f, root) = filter_over_join();
        let logical = Operand::of("Filter").with_traits(TraitSet::of("LOGICAL"));
        let physical = Operand::of("Filter").with_traits(TraitSet::of("PHYSICAL"));
        assert!(match_operands(&logical, &f, root, &mut Vec::new()));
        assert!(!match_operands(&physical, &f, root, &mut Vec::new()));
    }

    #[test]
    fn test_enumerate_tries_every_candidate() {
        let mut f = Forest::new();
        let s1 = f.add(TestOp::new("Scan", "s1"), vec![]);
        let s2 = f.add(TestOp::new("Scan", "s2"), vec![]);
        let p = f.add(TestOp::new("Project", "p"), vec![]);
        let group = RelRef(100);
        f.group(group, vec![s1, p, s2]);
        let filter = f.add(TestOp::new("Filter", "f"), vec![group]);

        let operand = Operand::with_children("Filter", vec![Operand::of("Scan")]);
        let matches = enumerate_matches(&operand, &f, filter);
        assert_eq!(matches.len(), 2);
        let labels: Vec<_> = matches.iter().map(|m| m[1].op().label.clone()).collect();
        assert_eq!(labels, vec!["s1", "s2"]);
    }
}
