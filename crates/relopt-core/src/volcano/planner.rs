//! # Cost-Based Search
//!
//! The cost-based planner keeps every alternative it has ever seen. Expressions are
//! grouped into equivalence sets, and each set is partitioned into subsets by trait
//! set. Expression inputs are subsets, so one expression stands for every plan that
//! can be built from the members of its input subsets.
//!
//! ## Registration
//!
//! Registering a tree registers its inputs first, then looks the node's digest up.
//! A known digest resolves to the existing expression. When the caller asserted
//! that the tree is equivalent to some other set, and the existing expression lives
//! elsewhere, the two sets are merged. An unknown digest creates a new expression
//! in the target set (or in a fresh set) and in the subset for its traits.
//!
//! ## Merging
//!
//! Merging requires equal row types. The surviving set takes over the members and
//! subsets of the other; subsets with the same traits are fused. Because
//! expression digests embed their input subsets, every parent of the surviving
//! set is re-digested afterwards:
//!
//! ```text
//! P(#3) and P(#7)   --merge #7 into #3-->   P(#3) and P(#3)
//! ```
//!
//! Two parents with the same new digest are duplicates. One is discarded and, if
//! they sat in different sets, those sets are merged as well. Merges cascade
//! through a worklist until no duplicates remain.
//!
//! ## Costing
//!
//! An expression's cost is its self cost plus the best costs of its input subsets.
//! When an expression becomes strictly cheaper than its subset's best, the subset
//! adopts it and the improvement propagates to the parents. Propagation carries the
//! set of subsets currently being updated; reaching one of them again means the
//! cost depends on itself, and that path stops without an improvement.
//!
//! ## Rule Firing
//!
//! Rules are matched against every live expression, trying every member of each
//! input subset, until a full pass fires nothing new. A firing is remembered by the
//! rule description and the ids of the bound expressions and never repeated.
//! Alternatives are registered as equivalent to the first bound expression.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::set::{subset_digest, ExprId, MemoExpr, RelSet, RelSubset, SetId, SubsetId};
use crate::cost::Cost;
use crate::error::{PlanError, Result};
use crate::expr::{node_digest, Operator, Rel, RelRef, RowType, TraitSet};
use crate::listener::{PlannerEvent, PlannerListener};
use crate::pattern::{enumerate_matches, Binding, MatchSource};
use crate::rule::{Rule, RuleCall, RuleRegistry};

/// Limits for the cost-based search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Rule firings after which the search stops and extracts what it has.
    pub max_iterations: usize,
    /// Live equivalence sets beyond which registration fails.
    pub max_sets: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1_000_000,
            max_sets: 100_000,
        }
    }
}

/// Memoizing, cost-based planner.
pub struct VolcanoPlanner<O: Operator> {
    config: SearchConfig,
    registry: RuleRegistry<O>,
    sets: Vec<RelSet>,
    subsets: Vec<RelSubset>,
    exprs: Vec<MemoExpr<O>>,
    digest_index: HashMap<String, ExprId>,
    fired: HashSet<(String, Vec<ExprId>)>,
    root: Option<SubsetId>,
    requested_root_traits: Option<TraitSet>,
    iterations: usize,
    listener: Option<Box<dyn PlannerListener>>,
}

impl<O: Operator> VolcanoPlanner<O> {
    /// Create an empty planner bounded by `config`.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            registry: RuleRegistry::new(),
            sets: Vec::new(),
            subsets: Vec::new(),
            exprs: Vec::new(),
            digest_index: HashMap::new(),
            fired: HashSet::new(),
            root: None,
            requested_root_traits: None,
            iterations: 0,
            listener: None,
        }
    }

    /// Register a rule. Returns false if its description is already taken.
    pub fn add_rule(&mut self, rule: Arc<dyn Rule<O>>) -> bool {
        self.registry.add(rule)
    }

    /// Unregister the rule with this description. Returns false if there was none.
    pub fn remove_rule(&mut self, description: &str) -> bool {
        self.registry.remove(description)
    }

    /// Receive planner events from now on.
    pub fn set_listener(&mut self, listener: Box<dyn PlannerListener>) {
        self.listener = Some(listener);
    }

    /// Search limits in effect.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Register `rel` and make its subset the root.
    pub fn set_root(&mut self, rel: &Rel<O>) -> Result<RelRef> {
        let subset = self.register_rel(rel, None)?;
        self.root = Some(subset);
        debug!(
            "Root set to {}: sets={}, exprs={}",
            self.describe_subset(subset),
            self.set_count(),
            self.exprs.len()
        );
        Ok(RelRef(subset))
    }

    /// Traits the final plan must have. Defaults to the traits of the registered root.
    pub fn change_root_traits(&mut self, traits: TraitSet) {
        self.requested_root_traits = Some(traits);
    }

    /// Register `rel`, optionally as equivalent to the set containing `equivalent_to`.
    ///
    /// Returns the subset the tree's root landed in.
    pub fn register(&mut self, rel: &Rel<O>, equivalent_to: Option<RelRef>) -> Result<RelRef> {
        let target = match equivalent_to {
            Some(handle) => Some(self.set_of(handle)?),
            None => None,
        };
        self.register_rel(rel, target).map(RelRef)
    }

    /// The subset a tree would resolve to, without registering anything.
    pub fn subset_of(&self, rel: &Rel<O>) -> Option<RelRef> {
        match rel {
            Rel::Ref(r) => (r.0 < self.subsets.len()).then(|| RelRef(self.find_subset(r.0))),
            Rel::Convert(r, traits) => {
                if r.0 >= self.subsets.len() {
                    return None;
                }
                let set = self.find_set(self.subsets[self.find_subset(r.0)].set);
                self.sets[set]
                    .subsets
                    .iter()
                    .copied()
                    .find(|s| self.subsets[*s].traits == *traits)
                    .map(RelRef)
            }
            Rel::Node { op, inputs } => {
                let inputs = inputs
                    .iter()
                    .map(|input| self.subset_of(input))
                    .collect::<Option<Vec<_>>>()?;
                let expr = self.digest_index.get(&node_digest(op, &inputs))?;
                Some(RelRef(self.find_subset(self.exprs[*expr].subset)))
            }
        }
    }

    /// Best known cost of a subset; `Cost::INFINITY` until it has an implementable member.
    pub fn best_cost(&self, subset: RelRef) -> Option<Cost> {
        if subset.0 >= self.subsets.len() {
            return None;
        }
        Some(self.subsets[self.find_subset(subset.0)].best_cost)
    }

    /// True if both handles name subsets of the same equivalence set.
    pub fn is_equivalent(&self, a: RelRef, b: RelRef) -> bool {
        match (self.set_of(a), self.set_of(b)) {
            (Ok(x), Ok(y)) => x == y,
            _ => false,
        }
    }

    /// Number of live (unmerged) equivalence sets.
    pub fn set_count(&self) -> usize {
        self.sets.iter().filter(|s| s.merged_into.is_none()).count()
    }

    /// Fire rules to fixpoint and extract the cheapest plan for the root.
    pub fn find_best_exp(&mut self) -> Result<Rel<O>> {
        if self.root.is_none() {
            return Err(PlanError::NoRoot);
        }
        debug!(
            "Starting volcano search: sets={}, exprs={}, rules={}",
            self.set_count(),
            self.exprs.len(),
            self.registry.len()
        );

        let root = self.root_subset()?;
        self.fire_rules()?;
        let plan = self.build_cheapest(self.find_subset(root), &mut Vec::new())?;

        debug!(
            "Volcano search complete: cost={}, iterations={}, sets={}",
            self.subsets[self.find_subset(root)].best_cost,
            self.iterations,
            self.set_count()
        );
        Ok(plan)
    }

    fn root_subset(&mut self) -> Result<SubsetId> {
        let root = self.find_subset(self.root.ok_or(PlanError::NoRoot)?);
        let subset = match &self.requested_root_traits {
            Some(traits) if *traits != self.subsets[root].traits => {
                let traits = traits.clone();
                self.subset_for(self.subsets[root].set, traits)
            }
            _ => root,
        };
        self.root = Some(subset);
        Ok(subset)
    }

    // ---- Registration ----

    fn register_rel(&mut self, rel: &Rel<O>, target: Option<SetId>) -> Result<SubsetId> {
        match rel {
            Rel::Ref(r) => {
                let subset = self.canonical_subset(*r)?;
                if let Some(target) = target {
                    self.merge_sets(target, self.subsets[subset].set)?;
                }
                Ok(self.find_subset(subset))
            }
            Rel::Convert(r, traits) => {
                let subset = self.canonical_subset(*r)?;
                if let Some(target) = target {
                    self.merge_sets(target, self.subsets[subset].set)?;
                }
                let set = self.find_set(self.subsets[self.find_subset(subset)].set);
                Ok(self.subset_for(set, traits.clone()))
            }
            Rel::Node { op, inputs } => {
                let inputs = inputs
                    .iter()
                    .map(|input| self.register_rel(input, None).map(RelRef))
                    .collect::<Result<Vec<_>>>()?;
                self.register_expr(op, inputs, target)
            }
        }
    }

    fn register_expr(
        &mut self,
        op: &O,
        inputs: Vec<RelRef>,
        target: Option<SetId>,
    ) -> Result<SubsetId> {
        let inputs: Vec<RelRef> = inputs
            .into_iter()
            .map(|r| RelRef(self.find_subset(r.0)))
            .collect();
        let digest = node_digest(op, &inputs);

        if let Some(&existing) = self.digest_index.get(&digest) {
            trace!("Expression {} already registered as rel#{}", digest, existing);
            if let Some(target) = target {
                let existing_set = self.find_set(self.exprs[existing].set);
                if self.find_set(target) != existing_set {
                    self.merge_sets(target, existing_set)?;
                }
            }
            return Ok(self.find_subset(self.exprs[existing].subset));
        }

        let input_types: Vec<RowType> = inputs
            .iter()
            .map(|r| self.sets[self.find_set(self.subsets[r.0].set)].row_type.clone())
            .collect();
        let row_type = op.row_type(&input_types);
        let set = match target {
            Some(target) => {
                let target = self.find_set(target);
                if self.sets[target].row_type != row_type {
                    return Err(PlanError::RowTypeMismatch {
                        left: self.sets[target].row_type.clone(),
                        right: row_type,
                    });
                }
                target
            }
            None => self.new_set(row_type)?,
        };
        let subset = self.subset_for(set, op.traits());

        let id = self.exprs.len();
        self.exprs.push(MemoExpr {
            op: op.clone(),
            inputs: inputs.clone(),
            set,
            subset,
            digest: digest.clone(),
            discarded: false,
        });
        self.sets[set].exprs.push(id);
        self.subsets[subset].members.push(id);
        for input in &inputs {
            self.subsets[input.0].add_parent(id);
        }
        self.digest_index.insert(digest.clone(), id);
        trace!("Registered rel#{} {} in {}", id, digest, self.describe_subset(subset));

        self.notify(PlannerEvent::EquivalenceFound {
            digest,
            node: RelRef(subset),
        });
        self.propagate_cost_improvements(id, &mut HashSet::new());
        Ok(subset)
    }

    fn new_set(&mut self, row_type: RowType) -> Result<SetId> {
        let live = self.set_count();
        if live >= self.config.max_sets {
            return Err(PlanError::SearchSpaceExhausted {
                sets: live + 1,
                limit: self.config.max_sets,
            });
        }
        self.sets.push(RelSet::new(row_type));
        Ok(self.sets.len() - 1)
    }

    /// The subset of `set` with `traits`, created if missing.
    fn subset_for(&mut self, set: SetId, traits: TraitSet) -> SubsetId {
        let set = self.find_set(set);
        if let Some(existing) = self.sets[set]
            .subsets
            .iter()
            .copied()
            .find(|s| self.subsets[*s].traits == traits)
        {
            return existing;
        }
        self.subsets.push(RelSubset::new(set, traits));
        let id = self.subsets.len() - 1;
        self.sets[set].subsets.push(id);
        id
    }

    // ---- Merging ----

    fn merge_sets(&mut self, a: SetId, b: SetId) -> Result<()> {
        let mut pending = VecDeque::from([(a, b)]);
        while let Some((a, b)) = pending.pop_front() {
            let keep = self.find_set(a);
            let gone = self.find_set(b);
            if keep == gone {
                continue;
            }
            if self.sets[keep].row_type != self.sets[gone].row_type {
                return Err(PlanError::RowTypeMismatch {
                    left: self.sets[keep].row_type.clone(),
                    right: self.sets[gone].row_type.clone(),
                });
            }
            debug!("Merging set#{} into set#{}", gone, keep);

            self.sets[gone].merged_into = Some(keep);
            let exprs = std::mem::take(&mut self.sets[gone].exprs);
            for e in &exprs {
                self.exprs[*e].set = keep;
            }
            self.sets[keep].exprs.extend(exprs);

            for s in std::mem::take(&mut self.sets[gone].subsets) {
                let twin = self.sets[keep]
                    .subsets
                    .iter()
                    .copied()
                    .find(|t| self.subsets[*t].traits == self.subsets[s].traits);
                match twin {
                    Some(t) => self.absorb_subset(t, s),
                    None => {
                        self.subsets[s].set = keep;
                        self.sets[keep].subsets.push(s);
                    }
                }
            }

            // Parents embed input subsets in their digests.
            let mut affected = Vec::new();
            for s in &self.sets[keep].subsets {
                for p in &self.subsets[*s].parents {
                    if !affected.contains(p) {
                        affected.push(*p);
                    }
                }
            }
            for p in &affected {
                if let Some(duplicate) = self.rename(*p) {
                    pending.push_back((self.exprs[duplicate].set, self.exprs[*p].set));
                }
            }

            let members = self.sets[keep].exprs.clone();
            for e in members.into_iter().chain(affected) {
                self.propagate_cost_improvements(e, &mut HashSet::new());
            }
        }
        Ok(())
    }

    /// Fold subset `gone` into `keep`, which has the same traits.
    fn absorb_subset(&mut self, keep: SubsetId, gone: SubsetId) {
        let members = std::mem::take(&mut self.subsets[gone].members);
        let parents = std::mem::take(&mut self.subsets[gone].parents);
        self.subsets[gone].merged_into = Some(keep);
        for m in &members {
            self.exprs[*m].subset = keep;
        }
        self.subsets[keep].members.extend(members);
        for p in parents {
            self.subsets[keep].add_parent(p);
        }

        let (best, cost, rows) = {
            let g = &self.subsets[gone];
            (g.best, g.best_cost, g.best_rows)
        };
        if best.is_some() && cost.is_lt(&self.subsets[keep].best_cost) {
            let k = &mut self.subsets[keep];
            k.best = best;
            k.best_cost = cost;
            k.best_rows = rows;
        }
    }

    /// Re-canonicalize an expression's inputs and digest. Returns the expression it
    /// turned out to duplicate, in which case it has been discarded.
    fn rename(&mut self, e: ExprId) -> Option<ExprId> {
        if self.exprs[e].discarded {
            return None;
        }
        let inputs: Vec<RelRef> = self.exprs[e]
            .inputs
            .iter()
            .map(|r| RelRef(self.find_subset(r.0)))
            .collect();
        let digest = node_digest(&self.exprs[e].op, &inputs);
        self.exprs[e].inputs = inputs;
        if digest == self.exprs[e].digest {
            return None;
        }

        let old = std::mem::replace(&mut self.exprs[e].digest, digest.clone());
        if self.digest_index.get(&old) == Some(&e) {
            self.digest_index.remove(&old);
        }
        match self.digest_index.get(&digest).copied() {
            None => {
                self.digest_index.insert(digest, e);
                None
            }
            Some(existing) if existing == e => None,
            Some(existing) => {
                self.discard(e, existing);
                Some(existing)
            }
        }
    }

    fn discard(&mut self, e: ExprId, survivor: ExprId) {
        trace!("Discarding rel#{} as duplicate of rel#{}", e, survivor);
        self.exprs[e].discarded = true;
        let set = self.find_set(self.exprs[e].set);
        self.sets[set].exprs.retain(|x| *x != e);
        let subset = self.find_subset(self.exprs[e].subset);
        self.subsets[subset].members.retain(|x| *x != e);
        if self.subsets[subset].best == Some(e) {
            self.subsets[subset].best = Some(survivor);
        }
        for input in self.exprs[e].inputs.clone() {
            let s = self.find_subset(input.0);
            self.subsets[s].parents.retain(|x| *x != e);
        }
        let digest = self.exprs[e].digest.clone();
        self.notify(PlannerEvent::RelDiscarded { digest });
    }

    // ---- Costing ----

    fn propagate_cost_improvements(&mut self, e: ExprId, active: &mut HashSet<SubsetId>) {
        if self.exprs[e].discarded {
            return;
        }
        let subset = self.find_subset(self.exprs[e].subset);
        if !active.insert(subset) {
            trace!("Cyclic: {} already being updated", self.describe_subset(subset));
            return;
        }

        let (rows, cost) = self.expr_cost(e);
        let current = self.subsets[subset].best_cost;
        if !cost.is_infinite() && cost.is_lt(&current) {
            trace!(
                "Subset cost improved: {} was {} now {} (rel#{})",
                self.describe_subset(subset),
                current,
                cost,
                e
            );
            let s = &mut self.subsets[subset];
            s.best = Some(e);
            s.best_cost = cost;
            s.best_rows = rows;
            let parents = s.parents.clone();
            for p in parents {
                self.propagate_cost_improvements(p, active);
            }
        }
        active.remove(&subset);
    }

    /// Row estimate and cumulative cost of one expression over its inputs' best plans.
    fn expr_cost(&self, e: ExprId) -> (f64, Cost) {
        let expr = &self.exprs[e];
        let inputs: Vec<&RelSubset> = expr
            .inputs
            .iter()
            .map(|r| &self.subsets[self.find_subset(r.0)])
            .collect();
        let rows: Vec<f64> = inputs.iter().map(|s| s.rows()).collect();
        let cost = inputs
            .iter()
            .fold(expr.op.self_cost(&rows), |acc, s| acc.plus(&s.best_cost));
        (expr.op.row_count(&rows), cost)
    }

    // ---- Rule firing ----

    fn fire_rules(&mut self) -> Result<()> {
        let rules: Vec<Arc<dyn Rule<O>>> = self.registry.iter().cloned().collect();
        loop {
            let mut progress = false;
            let mut e = 0;
            while e < self.exprs.len() {
                if self.exprs[e].discarded {
                    e += 1;
                    continue;
                }
                for rule in &rules {
                    let operand = rule.operand();
                    for bindings in enumerate_matches(&operand, &*self, RelRef(e)) {
                        let key = (
                            rule.description().to_string(),
                            bindings.iter().map(|b| b.node.0).collect::<Vec<_>>(),
                        );
                        if self.fired.contains(&key) {
                            continue;
                        }
                        if self.iterations >= self.config.max_iterations {
                            debug!(
                                "Hit iteration limit of {}; extracting current best plan",
                                self.config.max_iterations
                            );
                            return Ok(());
                        }
                        self.fired.insert(key);
                        self.iterations += 1;
                        progress = true;
                        self.fire_rule(rule, bindings)?;
                    }
                }
                e += 1;
            }
            if !progress {
                return Ok(());
            }
        }
    }

    fn fire_rule(&mut self, rule: &Arc<dyn Rule<O>>, bindings: Vec<Binding<O>>) -> Result<()> {
        let Some(node) = bindings.first().map(|b| b.node.0) else {
            return Ok(());
        };
        trace!("Applying rule '{}' to rel#{}", rule.description(), node);
        self.notify(PlannerEvent::RuleAttempted {
            rule: rule.description().to_string(),
            node: RelRef(node),
        });

        let mut call = RuleCall::new(bindings);
        rule.on_match(&mut call)
            .map_err(|source| PlanError::RuleFailed {
                rule: rule.description().to_string(),
                source,
            })?;
        let (_, results) = call.into_parts();

        for alternative in results {
            let target = self.find_set(self.exprs[node].set);
            let subset = self.register_rel(&alternative, Some(target))?;
            trace!(
                "Rule '{}' produced {} in {}",
                rule.description(),
                alternative.digest(),
                self.describe_subset(subset)
            );
            self.notify(PlannerEvent::RuleFired {
                rule: rule.description().to_string(),
                node: RelRef(node),
                result: alternative.digest(),
            });
        }
        Ok(())
    }

    // ---- Extraction ----

    fn build_cheapest(&mut self, subset: SubsetId, path: &mut Vec<SubsetId>) -> Result<Rel<O>> {
        let subset = self.find_subset(subset);
        if let Some(pos) = path.iter().position(|s| *s == subset) {
            return Err(PlanError::CycleDetected {
                vertices: path[pos..].iter().map(|s| RelRef(*s)).collect(),
            });
        }
        let Some(best) = self.subsets[subset].best else {
            let description = self.describe_subset(subset);
            let dump = self.dump();
            warn!(
                "Node [{}] could not be implemented; planner state:\n{}",
                description, dump
            );
            return Err(PlanError::NoPlanFound {
                subset: description,
                dump,
            });
        };

        let op = self.exprs[best].op.clone();
        let inputs = self.exprs[best].inputs.clone();
        let digest = self.exprs[best].digest.clone();
        self.notify(PlannerEvent::RelChosen { digest });

        path.push(subset);
        let mut children = Vec::with_capacity(inputs.len());
        for input in inputs {
            children.push(self.build_cheapest(input.0, path)?);
        }
        path.pop();
        Ok(Rel::node(op, children))
    }

    // ---- Diagnostics ----

    /// Every live set with its subsets, their best members and all members.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (id, set) in self.sets.iter().enumerate() {
            if set.merged_into.is_some() {
                continue;
            }
            let _ = writeln!(out, "Set#{}, type: {}", id, set.row_type);
            for s in &set.subsets {
                let subset = &self.subsets[*s];
                let best = subset
                    .best
                    .map(|b| format!("rel#{}", b))
                    .unwrap_or_else(|| "null".to_string());
                let _ = writeln!(
                    out,
                    "    {}, best={}, cost={}",
                    subset_digest(id, &subset.traits),
                    best,
                    subset.best_cost
                );
                for m in &subset.members {
                    let (rows, cost) = self.expr_cost(*m);
                    let _ = writeln!(
                        out,
                        "        rel#{}:{}, rowcount={}, cumulative cost={}",
                        m, self.exprs[*m].digest, rows, cost
                    );
                }
            }
        }
        out
    }

    fn describe_subset(&self, subset: SubsetId) -> String {
        let s = &self.subsets[self.find_subset(subset)];
        subset_digest(self.find_set(s.set), &s.traits)
    }

    // ---- Handles ----

    fn find_set(&self, mut set: SetId) -> SetId {
        while let Some(next) = self.sets.get(set).and_then(|s| s.merged_into) {
            set = next;
        }
        set
    }

    fn find_subset(&self, mut subset: SubsetId) -> SubsetId {
        while let Some(next) = self.subsets.get(subset).and_then(|s| s.merged_into) {
            subset = next;
        }
        subset
    }

    fn canonical_subset(&self, handle: RelRef) -> Result<SubsetId> {
        if handle.0 >= self.subsets.len() {
            return Err(PlanError::DanglingRef(handle));
        }
        Ok(self.find_subset(handle.0))
    }

    fn set_of(&self, handle: RelRef) -> Result<SetId> {
        let subset = self.canonical_subset(handle)?;
        Ok(self.find_set(self.subsets[subset].set))
    }

    fn notify(&mut self, event: PlannerEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_event(&event);
        }
    }
}

impl<O: Operator> MatchSource<O> for VolcanoPlanner<O> {
    fn op(&self, node: RelRef) -> Option<&O> {
        self.exprs
            .get(node.0)
            .filter(|e| !e.discarded)
            .map(|e| &e.op)
    }

    fn inputs(&self, node: RelRef) -> Option<&[RelRef]> {
        self.exprs
            .get(node.0)
            .filter(|e| !e.discarded)
            .map(|e| e.inputs.as_slice())
    }

    fn handle(&self, node: RelRef) -> RelRef {
        match self.exprs.get(node.0) {
            Some(e) => RelRef(self.find_subset(e.subset)),
            None => node,
        }
    }

    fn candidates(&self, input: RelRef) -> Vec<RelRef> {
        match self.subsets.get(self.find_subset(input.0)) {
            Some(subset) => subset
                .members
                .iter()
                .filter(|m| !self.exprs[**m].discarded)
                .map(|m| RelRef(*m))
                .collect(),
            None => Vec::new(),
        }
    }
}
