//! # Expression Interface
//!
//! The core never inspects relational operators directly. Everything it needs from
//! the host's algebra is expressed by the [`Operator`] trait: a node kind for pattern
//! matching, a digest, a trait set, a row type, and self-cost / row-count estimates.
//!
//! ## Trees and Handles
//!
//! A [`Rel`] is a plain expression tree. Callers hand the planners `Rel` trees without
//! handles and get `Rel` trees without handles back. While planning, the planners own
//! every registered node in an arena and refer to them by [`RelRef`] handle: a
//! vertex in the heuristic planner, a subset in the cost-based planner.
//!
//! Rules build alternatives as `Rel` trees whose leaves point back into the arena
//! through `Rel::Ref` (an existing node) or `Rel::Convert` (an existing node, required
//! in a different trait set). This replaces in-place mutation of shared input lists.
//!
//! ## Digests
//!
//! A registered node's digest is its operator digest, its trait set and the handles
//! of its inputs:
//!
//! ```text
//! Filter(x > 1).LOGICAL(#3)
//! ```
//!
//! Two nodes with equal digests are structurally and semantically equivalent, which
//! is what both planners use for deduplication.

use crate::cost::Cost;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Operator payload of one expression node, supplied by the host algebra.
pub trait Operator: Clone + fmt::Debug {
    /// Data-free discriminant used by operand matching.
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;

    /// Canonical string over operator identity and parameters (not inputs).
    fn digest(&self) -> String;

    /// Physical properties of the node's output.
    fn traits(&self) -> TraitSet;

    fn row_type(&self, inputs: &[RowType]) -> RowType;

    /// Estimated output rows given the estimated rows of each input.
    fn row_count(&self, input_rows: &[f64]) -> f64;

    /// Cost of this node alone, excluding its inputs.
    fn self_cost(&self, input_rows: &[f64]) -> Cost;
}

/// Handle to a node owned by a planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelRef(pub(crate) usize);

impl RelRef {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A relational expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rel<O> {
    /// An operator with its inputs.
    Node { op: O, inputs: Vec<Rel<O>> },
    /// An existing planner node.
    Ref(RelRef),
    /// An existing planner node, required in the given trait set.
    ///
    /// The cost-based planner resolves this to the subset with those traits in the
    /// node's equivalence set. The heuristic planner has no subsets and resolves it to
    /// the node itself; conversion happens when a converter rule fires on that node.
    Convert(RelRef, TraitSet),
}

impl<O> Rel<O> {
    pub fn node(op: O, inputs: Vec<Rel<O>>) -> Self {
        Rel::Node { op, inputs }
    }

    pub fn leaf(op: O) -> Self {
        Rel::Node { op, inputs: vec![] }
    }

    /// The operator of a `Node`, `None` for handles.
    pub fn op(&self) -> Option<&O> {
        match self {
            Rel::Node { op, .. } => Some(op),
            _ => None,
        }
    }

    pub fn inputs(&self) -> &[Rel<O>] {
        match self {
            Rel::Node { inputs, .. } => inputs,
            _ => &[],
        }
    }

    /// True if the tree contains no planner handles.
    pub fn is_plain(&self) -> bool {
        match self {
            Rel::Node { inputs, .. } => inputs.iter().all(Rel::is_plain),
            _ => false,
        }
    }

    /// Number of `Node`s in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Rel::Node { inputs, .. } => 1 + inputs.iter().map(Rel::node_count).sum::<usize>(),
            _ => 0,
        }
    }
}

impl<O: Operator> Rel<O> {
    /// Recursive structural digest of the whole tree.
    pub fn digest(&self) -> String {
        match self {
            Rel::Node { op, inputs } => {
                let inputs: Vec<String> = inputs.iter().map(Rel::digest).collect();
                format!("{}.{}({})", op.digest(), op.traits(), inputs.join(", "))
            }
            Rel::Ref(r) => r.to_string(),
            Rel::Convert(r, traits) => format!("{}.{}", r, traits),
        }
    }

}

/// Digest of a registered node whose inputs are planner handles.
pub(crate) fn node_digest<O: Operator>(op: &O, inputs: &[RelRef]) -> String {
    let inputs: Vec<String> = inputs.iter().map(RelRef::to_string).collect();
    format!("{}.{}({})", op.digest(), op.traits(), inputs.join(","))
}

/// Ordered set of physical-property names, e.g. a calling convention and a collation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraitSet(Vec<String>);

impl TraitSet {
    pub fn new<I, S>(traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(traits.into_iter().map(Into::into).collect())
    }

    pub fn of(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    pub fn traits(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if every trait in `self` equals the trait at the same position in `other`.
    pub fn matches(&self, other: &TraitSet) -> bool {
        self == other
    }
}

impl fmt::Display for TraitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "NONE");
        }
        write!(f, "{}", self.0.join("."))
    }
}

/// One named, typed output column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: String,
}

/// Ordered output columns of an expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowType {
    pub fields: Vec<Field>,
}

impl RowType {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Build a row type from `(name, type)` pairs.
    pub fn of(fields: &[(&str, &str)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(name, data_type)| Field {
                    name: (*name).to_string(),
                    data_type: (*data_type).to_string(),
                })
                .collect(),
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Concatenate two row types, as a join does.
    pub fn concat(&self, other: &RowType) -> RowType {
        let mut fields = self.fields.clone();
        fields.extend(other.fields.iter().cloned());
        RowType { fields }
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|fd| format!("{} {}", fd.data_type, fd.name))
            .collect();
        write!(f, "RecordType({})", fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{leaf, node, TestOp};

    #[test]
    fn test_trait_set_display_and_match() {
        let a = TraitSet::new(["PHYSICAL", "SORTED"]);
        assert_eq!(a.to_string(), "PHYSICAL.SORTED");
        assert!(a.matches(&TraitSet::new(vec!["PHYSICAL".to_string(), "SORTED".to_string()])));
        assert!(!a.matches(&TraitSet::of("PHYSICAL")));
        assert_eq!(TraitSet::default().to_string(), "NONE");
    }

    #[test]
    fn test_row_type_concat() {
        let left = RowType::of(&[("a", "INTEGER")]);
        let right = RowType::of(&[("b", "VARCHAR")]);
        let joined = left.concat(&right);
        assert_eq!(joined.field_names(), vec!["a", "b"]);
        assert_eq!(joined.to_string(), "RecordType(INTEGER a, VARCHAR b)");
    }

    #[test]
    fn test_tree_digest_includes_inputs() {
        let a = node("R", "r", vec![leaf("A", "a")]);
        let b = node("R", "r", vec![leaf("A", "b")]);
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest(), a.clone().digest());
        assert!(a.is_plain());
        assert_eq!(a.node_count(), 2);
    }

    #[test]
    fn test_node_digest_uses_handles() {
        let op = TestOp::new("F", "f");
        assert_eq!(node_digest(&op, &[RelRef(3), RelRef(4)]), "F[f].LOGICAL(#3,#4)");
        let with_ref: Rel<TestOp> = Rel::node(op, vec![Rel::Ref(RelRef(1))]);
        assert!(!with_ref.is_plain());
    }
}
