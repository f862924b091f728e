//! Equivalence sets, subsets and memo expressions.
//!
//! All three live in arenas owned by the planner. A merged set or subset keeps its
//! slot and forwards to the survivor through `merged_into`; handles held by callers
//! therefore stay valid across merges.

use crate::cost::Cost;
use crate::expr::{RelRef, RowType, TraitSet};

pub(super) type SetId = usize;
pub(super) type SubsetId = usize;
pub(super) type ExprId = usize;

/// Expressions proven equivalent. All members share one row type.
#[derive(Debug)]
pub(super) struct RelSet {
    pub row_type: RowType,
    pub exprs: Vec<ExprId>,
    pub subsets: Vec<SubsetId>,
    pub merged_into: Option<SetId>,
}

impl RelSet {
    pub fn new(row_type: RowType) -> Self {
        Self {
            row_type,
            exprs: Vec::new(),
            subsets: Vec::new(),
            merged_into: None,
        }
    }
}

/// Members of a set with one trait set.
#[derive(Debug)]
pub(super) struct RelSubset {
    pub set: SetId,
    pub traits: TraitSet,
    pub members: Vec<ExprId>,
    /// Expressions that use this subset as an input.
    pub parents: Vec<ExprId>,
    pub best: Option<ExprId>,
    pub best_cost: Cost,
    pub best_rows: f64,
    pub merged_into: Option<SubsetId>,
}

impl RelSubset {
    pub fn new(set: SetId, traits: TraitSet) -> Self {
        Self {
            set,
            traits,
            members: Vec::new(),
            parents: Vec::new(),
            best: None,
            best_cost: Cost::INFINITY,
            best_rows: f64::INFINITY,
            merged_into: None,
        }
    }

    /// Estimated rows: those of the best member, or infinite if there is none.
    pub fn rows(&self) -> f64 {
        if self.best.is_some() {
            self.best_rows
        } else {
            f64::INFINITY
        }
    }

    pub fn add_parent(&mut self, expr: ExprId) {
        if !self.parents.contains(&expr) {
            self.parents.push(expr);
        }
    }
}

/// One registered expression. Inputs are subset handles.
#[derive(Debug)]
pub(super) struct MemoExpr<O> {
    pub op: O,
    pub inputs: Vec<RelRef>,
    pub set: SetId,
    pub subset: SubsetId,
    pub digest: String,
    pub discarded: bool,
}

pub(super) fn subset_digest(set: SetId, traits: &TraitSet) -> String {
    format!("Subset#{}.{}", set, traits)
}
