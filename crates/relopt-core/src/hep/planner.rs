//! # Heuristic Planner
//!
//! The heuristic planner rewrites an expression DAG in place by executing a
//! [`HepProgram`] against it. It does not keep alternatives: when a rule produces
//! an alternative, the winner replaces the matched vertex and the loser becomes
//! garbage.
//!
//! ## Vertex Graph
//!
//! Every registered node is a vertex in an arena, addressed by [`RelRef`]. A vertex
//! holds an operator and the handles of its input vertices; edges point from parent
//! to child. Inserting an expression inserts its inputs first and then looks the
//! node's digest up in the digest index. An existing vertex with the same digest is
//! reused, so common subexpressions are shared:
//!
//! ```text
//!        Join               Join
//!       /    \              /  \
//!   Scan(t)  Scan(t)  =>    \  /
//!                          Scan(t)
//! ```
//!
//! ## Contraction
//!
//! Incorporating a rule result inserts the winning alternative as a new vertex (or
//! finds an equal existing one) and redirects the input slots of the old vertex's
//! parents to it. The old vertex is left orphaned; if it was the root, the new
//! vertex becomes the root.
//!
//! Parents are captured before the alternative is inserted, so the alternative's
//! own reference to the old vertex (if any) is preserved. For a converter rule only
//! parents whose traits equal the converter's output traits are redirected.
//!
//! ## Garbage Collection
//!
//! Mark and sweep from the root. Sweeping removes the vertex and every digest
//! index entry that points at it. Collection runs:
//!
//! - after an instruction, when the transformations since the last collection
//!   outnumber the vertices that survived it;
//! - before every ordered (top-down or bottom-up) traversal;
//! - after every transformation while a listener is attached;
//! - before the final plan is extracted.
//!
//! ## Match Loop
//!
//! A rule set is applied until a full sweep of the graph changes nothing, or until
//! the current match limit is reached. In arbitrary order, matching resumes from
//! the new vertex after a transformation and another full sweep is owed. In the
//! ordered modes, traversal restarts from the root.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, trace, warn, Level};

use super::program::{HepInstruction, HepProgram, MatchOrder, MATCH_UNTIL_FIXPOINT};
use crate::cost::Cost;
use crate::error::{PlanError, Result};
use crate::expr::{node_digest, Operator, Rel, RelRef, TraitSet};
use crate::listener::{PlannerEvent, PlannerListener};
use crate::pattern::{match_operands, MatchSource};
use crate::rule::{ConverterSpec, Rule, RuleCall, RuleRegistry};

#[derive(Debug, Clone)]
struct HepVertex<O> {
    op: O,
    inputs: Vec<RelRef>,
    digest: String,
}

/// Per-execution state of one (sub)program.
struct ProgramState<O: Operator> {
    match_order: MatchOrder,
    match_limit: usize,
    group: Option<Vec<Arc<dyn Rule<O>>>>,
}

impl<O: Operator> ProgramState<O> {
    fn new() -> Self {
        Self {
            match_order: MatchOrder::Arbitrary,
            match_limit: MATCH_UNTIL_FIXPOINT,
            group: None,
        }
    }
}

/// Program-driven DAG rewriter.
pub struct HepPlanner<O: Operator> {
    program: Arc<HepProgram<O>>,
    registry: RuleRegistry<O>,
    vertices: BTreeMap<usize, HepVertex<O>>,
    next_vertex: usize,
    digest_index: HashMap<String, RelRef>,
    root: Option<RelRef>,
    requested_root_traits: Option<TraitSet>,
    n_transformations: usize,
    n_transformations_last_gc: usize,
    graph_size_last_gc: usize,
    listener: Option<Box<dyn PlannerListener>>,
}

impl<O: Operator> HepPlanner<O> {
    /// Create a planner that will run `program`.
    pub fn new(program: HepProgram<O>) -> Self {
        Self {
            program: Arc::new(program),
            registry: RuleRegistry::new(),
            vertices: BTreeMap::new(),
            next_vertex: 0,
            digest_index: HashMap::new(),
            root: None,
            requested_root_traits: None,
            n_transformations: 0,
            n_transformations_last_gc: 0,
            graph_size_last_gc: 0,
            listener: None,
        }
    }

    /// Register a rule for lookup by description, class, or as a converter.
    pub fn add_rule(&mut self, rule: Arc<dyn Rule<O>>) -> bool {
        self.registry.add(rule)
    }

    /// Unregister the rule with this description. Returns false if there was none.
    pub fn remove_rule(&mut self, description: &str) -> bool {
        self.registry.remove(description)
    }

    /// Rules available to description, class and converter instructions.
    pub fn rules(&self) -> &RuleRegistry<O> {
        &self.registry
    }

    /// Receive planner events from now on.
    pub fn set_listener(&mut self, listener: Box<dyn PlannerListener>) {
        self.listener = Some(listener);
    }

    /// Insert `rel` into the graph and make it the root.
    pub fn set_root(&mut self, rel: &Rel<O>) -> Result<RelRef> {
        let root = self.add_rel_to_graph(rel)?;
        self.root = Some(root);
        debug!("Hep root set to {}: vertices={}", root, self.vertices.len());
        self.trace_graph()?;
        Ok(root)
    }

    pub fn root(&self) -> Option<RelRef> {
        self.root
    }

    pub fn root_traits(&self) -> Option<&TraitSet> {
        self.requested_root_traits.as_ref()
    }

    /// Traits only matter at the root, where they decide which converters may fire.
    pub fn change_root_traits(&mut self, traits: TraitSet) {
        self.requested_root_traits = Some(traits);
    }

    /// Rewrites applied so far, across every program run.
    pub fn transformation_count(&self) -> usize {
        self.n_transformations
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Execute the program, collect garbage and extract the rewritten tree.
    pub fn find_best_exp(&mut self) -> Result<Rel<O>> {
        let root = self.root.ok_or(PlanError::NoRoot)?;
        debug!("Executing hep program: root={}, vertices={}", root, self.vertices.len());

        let program = Arc::clone(&self.program);
        self.execute_program(&program)?;
        self.collect_garbage();

        let root = self.root.ok_or(PlanError::NoRoot)?;
        let plan = self.build_final_plan(root, &mut Vec::new())?;
        debug!(
            "Hep program finished: transformations={}, vertices={}",
            self.n_transformations,
            self.vertices.len()
        );
        Ok(plan)
    }

    // ---- Program execution ----

    fn execute_program(&mut self, program: &HepProgram<O>) -> Result<()> {
        let mut state = ProgramState::new();
        for instruction in program.instructions() {
            self.execute_instruction(instruction, &mut state)?;
            let delta = self.n_transformations - self.n_transformations_last_gc;
            if delta > self.graph_size_last_gc {
                self.collect_garbage();
            }
        }
        Ok(())
    }

    fn execute_instruction(
        &mut self,
        instruction: &HepInstruction<O>,
        state: &mut ProgramState<O>,
    ) -> Result<()> {
        trace!("Executing instruction {:?}", instruction);
        match instruction {
            HepInstruction::RuleInstance(rule) => self.fire(state, vec![Arc::clone(rule)], true),
            HepInstruction::RuleByDescription(description) => {
                match self.registry.get(description).cloned() {
                    Some(rule) => self.fire(state, vec![rule], true),
                    None => {
                        warn!("No rule registered as '{}'; skipping", description);
                        Ok(())
                    }
                }
            }
            HepInstruction::RuleClass(class) => {
                let rules = self.registry.by_class(class);
                self.fire(state, rules, true)
            }
            HepInstruction::RuleCollection(rules) => self.fire(state, rules.clone(), true),
            HepInstruction::Converters { guaranteed } => {
                let rules = self.registry.converters(*guaranteed);
                self.fire(state, rules, *guaranteed)
            }
            HepInstruction::BeginGroup => {
                state.group = Some(Vec::new());
                Ok(())
            }
            HepInstruction::EndGroup => {
                let rules = state.group.take().unwrap_or_default();
                trace!("Leaving group with {} rules", rules.len());
                self.fire(state, rules, true)
            }
            HepInstruction::MatchOrder(order) => {
                state.match_order = *order;
                Ok(())
            }
            HepInstruction::MatchLimit(limit) => {
                state.match_limit = *limit;
                Ok(())
            }
            HepInstruction::Subprogram(subprogram) => loop {
                let before = self.n_transformations;
                self.execute_program(subprogram)?;
                if self.n_transformations == before {
                    return Ok(());
                }
            },
        }
    }

    /// Apply `rules`, or collect them if a group is open.
    fn fire(
        &mut self,
        state: &mut ProgramState<O>,
        rules: Vec<Arc<dyn Rule<O>>>,
        force_conversions: bool,
    ) -> Result<()> {
        if let Some(group) = state.group.as_mut() {
            for rule in rules {
                if !group.iter().any(|r| r.description() == rule.description()) {
                    group.push(rule);
                }
            }
            return Ok(());
        }
        self.apply_rules(state, &rules, force_conversions)
    }

    fn apply_rules(
        &mut self,
        state: &ProgramState<O>,
        rules: &[Arc<dyn Rule<O>>],
        force_conversions: bool,
    ) -> Result<()> {
        if rules.is_empty() {
            return Ok(());
        }
        let Some(root) = self.root else {
            return Err(PlanError::NoRoot);
        };
        trace!(
            "Applying rules {:?} in {:?} order",
            rules.iter().map(|r| r.description()).collect::<Vec<_>>(),
            state.match_order
        );

        let full_restart = state.match_order != MatchOrder::Arbitrary;
        let mut n_matches = 0usize;
        loop {
            let mut fixpoint = true;
            let mut order = self.graph_order(state.match_order, self.root.unwrap_or(root))?;
            let mut i = 0;
            while i < order.len() {
                let vertex = order[i];
                i += 1;
                if !self.vertices.contains_key(&vertex.0) {
                    continue;
                }
                for rule in rules {
                    let Some(new_vertex) = self.apply_rule(rule, vertex, force_conversions)? else {
                        continue;
                    };
                    n_matches += 1;
                    if n_matches >= state.match_limit {
                        return Ok(());
                    }
                    let current_root = self.root.unwrap_or(root);
                    if full_restart {
                        order = self.graph_order(state.match_order, current_root)?;
                    } else {
                        order = self.depth_first(new_vertex);
                        fixpoint = false;
                    }
                    i = 0;
                    break;
                }
            }
            if fixpoint {
                return Ok(());
            }
        }
    }

    /// Try one rule on one vertex. Returns the vertex that replaced it, if any.
    fn apply_rule(
        &mut self,
        rule: &Arc<dyn Rule<O>>,
        vertex: RelRef,
        force_conversions: bool,
    ) -> Result<Option<RelRef>> {
        let mut parent_traits = None;
        if let Some(spec) = rule.converter() {
            if spec.guaranteed || !force_conversions {
                if !self.converter_applies(&spec, vertex) {
                    return Ok(None);
                }
                parent_traits = Some(spec.out_traits);
            }
        }

        let operand = rule.operand();
        let mut bindings = Vec::new();
        if !match_operands(&operand, &*self, vertex, &mut bindings) {
            return Ok(None);
        }

        self.notify(PlannerEvent::RuleAttempted {
            rule: rule.description().to_string(),
            node: vertex,
        });
        let mut call = RuleCall::new(bindings);
        rule.on_match(&mut call)
            .map_err(|source| PlanError::RuleFailed {
                rule: rule.description().to_string(),
                source,
            })?;
        let (_, results) = call.into_parts();
        if results.is_empty() {
            return Ok(None);
        }
        self.apply_transformation_results(rule.description(), vertex, results, parent_traits)
    }

    /// A converter is only worth firing if a parent, or the requested root traits,
    /// want what it produces.
    fn converter_applies(&self, spec: &ConverterSpec, vertex: RelRef) -> bool {
        let wanted_by_parent = self
            .parents_of(vertex)
            .into_iter()
            .filter_map(|p| self.vertices.get(&p.0))
            .any(|p| p.op.traits().matches(&spec.out_traits));
        if wanted_by_parent {
            return true;
        }
        Some(vertex) == self.root
            && self
                .requested_root_traits
                .as_ref()
                .map_or(false, |t| t.matches(&spec.out_traits))
    }

    fn apply_transformation_results(
        &mut self,
        rule: &str,
        vertex: RelRef,
        results: Vec<Rel<O>>,
        parent_traits: Option<TraitSet>,
    ) -> Result<Option<RelRef>> {
        // A single result is taken without costing it.
        let best = if results.len() == 1 {
            results.into_iter().next()
        } else {
            let mut best: Option<(Rel<O>, Cost)> = None;
            for rel in results {
                let cost = self.cumulative_cost(&rel)?;
                trace!("Considering alternative {} with cost {}", rel.digest(), cost);
                let better = match &best {
                    None => true,
                    Some((_, best_cost)) => cost.is_lt(best_cost),
                };
                if better {
                    best = Some((rel, cost));
                }
            }
            best.map(|(rel, _)| rel)
        };
        let Some(best) = best else {
            return Ok(None);
        };

        let parents: Vec<RelRef> = self
            .parents_of(vertex)
            .into_iter()
            .filter(|p| match &parent_traits {
                None => true,
                Some(wanted) => self
                    .vertices
                    .get(&p.0)
                    .map_or(false, |v| v.op.traits().matches(wanted)),
            })
            .collect();

        let new_vertex = self.add_rel_to_graph(&best)?;
        if new_vertex == vertex {
            trace!("Rule '{}' returned vertex {} itself", rule, vertex);
            return Ok(None);
        }

        self.n_transformations += 1;
        self.contract_vertices(new_vertex, vertex, &parents);
        debug!("Rule '{}' transformed {} into {}", rule, vertex, new_vertex);

        let result = self
            .vertices
            .get(&new_vertex.0)
            .map(|v| v.digest.clone())
            .unwrap_or_default();
        self.notify(PlannerEvent::RuleFired {
            rule: rule.to_string(),
            node: vertex,
            result,
        });
        if self.listener.is_some() {
            self.collect_garbage();
        }
        self.trace_graph()?;
        Ok(Some(new_vertex))
    }

    // ---- Graph maintenance ----

    fn add_rel_to_graph(&mut self, rel: &Rel<O>) -> Result<RelRef> {
        match rel {
            Rel::Ref(r) | Rel::Convert(r, _) => {
                if self.vertices.contains_key(&r.0) {
                    Ok(*r)
                } else {
                    Err(PlanError::DanglingRef(*r))
                }
            }
            Rel::Node { op, inputs } => {
                let inputs = inputs
                    .iter()
                    .map(|input| self.add_rel_to_graph(input))
                    .collect::<Result<Vec<_>>>()?;
                let digest = node_digest(op, &inputs);
                if let Some(existing) = self.digest_index.get(&digest) {
                    return Ok(*existing);
                }

                let id = RelRef(self.next_vertex);
                self.next_vertex += 1;
                trace!("New vertex {}: {}", id, digest);
                self.digest_index.insert(digest.clone(), id);
                self.vertices.insert(
                    id.0,
                    HepVertex {
                        op: op.clone(),
                        inputs,
                        digest: digest.clone(),
                    },
                );
                self.notify(PlannerEvent::EquivalenceFound { digest, node: id });
                Ok(id)
            }
        }
    }

    /// Redirect `parents`' edges from `discarded` to `preserved`.
    fn contract_vertices(&mut self, preserved: RelRef, discarded: RelRef, parents: &[RelRef]) {
        if preserved == discarded {
            return;
        }
        for parent in parents {
            if let Some(v) = self.vertices.get_mut(&parent.0) {
                for input in v.inputs.iter_mut() {
                    if *input == discarded {
                        *input = preserved;
                    }
                }
            }
            self.update_digest(*parent);
        }
        if self.root == Some(discarded) {
            self.root = Some(preserved);
        }
    }

    /// Recompute a vertex's digest after its inputs changed.
    ///
    /// If another vertex already owns the new digest, the index keeps pointing there.
    fn update_digest(&mut self, vertex: RelRef) {
        let Some(v) = self.vertices.get(&vertex.0) else {
            return;
        };
        let old = v.digest.clone();
        let new = node_digest(&v.op, &v.inputs);
        if self.digest_index.get(&old) == Some(&vertex) {
            self.digest_index.remove(&old);
        }
        self.digest_index.entry(new.clone()).or_insert(vertex);
        if let Some(v) = self.vertices.get_mut(&vertex.0) {
            v.digest = new.clone();
        }
        self.notify(PlannerEvent::EquivalenceFound {
            digest: new,
            node: vertex,
        });
    }

    fn collect_garbage(&mut self) {
        self.n_transformations_last_gc = self.n_transformations;
        let Some(root) = self.root else {
            return;
        };
        let live: HashSet<RelRef> = self.depth_first(root).into_iter().collect();
        if live.len() < self.vertices.len() {
            let swept: Vec<usize> = self
                .vertices
                .keys()
                .copied()
                .filter(|id| !live.contains(&RelRef(*id)))
                .collect();
            trace!("Collecting garbage: swept={}, live={}", swept.len(), live.len());
            for id in swept {
                if let Some(v) = self.vertices.remove(&id) {
                    self.notify(PlannerEvent::RelDiscarded { digest: v.digest });
                }
            }
            self.digest_index.retain(|_, v| live.contains(v));
        }
        self.graph_size_last_gc = self.vertices.len();
    }

    // ---- Traversal ----

    fn parents_of(&self, vertex: RelRef) -> Vec<RelRef> {
        self.vertices
            .iter()
            .filter(|(_, v)| v.inputs.contains(&vertex))
            .map(|(id, _)| RelRef(*id))
            .collect()
    }

    /// Pre-order depth-first walk over vertices reachable from `start`.
    fn depth_first(&self, start: RelRef) -> Vec<RelRef> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![start];
        while let Some(vertex) = stack.pop() {
            if !seen.insert(vertex) {
                continue;
            }
            let Some(v) = self.vertices.get(&vertex.0) else {
                continue;
            };
            order.push(vertex);
            for input in v.inputs.iter().rev() {
                if !seen.contains(input) {
                    stack.push(*input);
                }
            }
        }
        order
    }

    fn graph_order(&mut self, order: MatchOrder, root: RelRef) -> Result<Vec<RelRef>> {
        match order {
            MatchOrder::Arbitrary => Ok(self.depth_first(root)),
            MatchOrder::TopDown => {
                self.collect_garbage();
                self.topological_order()
            }
            MatchOrder::BottomUp => {
                self.collect_garbage();
                let mut sorted = self.topological_order()?;
                sorted.reverse();
                Ok(sorted)
            }
        }
    }

    /// Parents before children over the whole graph.
    fn topological_order(&self) -> Result<Vec<RelRef>> {
        let mut in_degree: BTreeMap<usize, usize> = self.vertices.keys().map(|id| (*id, 0)).collect();
        for v in self.vertices.values() {
            let distinct: HashSet<&RelRef> = v.inputs.iter().collect();
            for input in distinct {
                if let Some(d) = in_degree.get_mut(&input.0) {
                    *d += 1;
                }
            }
        }
        let mut ready: VecDeque<usize> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut sorted = Vec::with_capacity(self.vertices.len());
        while let Some(id) = ready.pop_front() {
            sorted.push(RelRef(id));
            let Some(v) = self.vertices.get(&id) else {
                continue;
            };
            let distinct: Vec<RelRef> = {
                let mut seen = HashSet::new();
                v.inputs.iter().copied().filter(|i| seen.insert(*i)).collect()
            };
            for input in distinct {
                if let Some(d) = in_degree.get_mut(&input.0) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push_back(input.0);
                    }
                }
            }
        }
        if sorted.len() < self.vertices.len() {
            let placed: HashSet<RelRef> = sorted.iter().copied().collect();
            let vertices = self
                .vertices
                .keys()
                .map(|id| RelRef(*id))
                .filter(|v| !placed.contains(v))
                .collect();
            return Err(PlanError::CycleDetected { vertices });
        }
        Ok(sorted)
    }

    // ---- Extraction ----

    fn build_final_plan(&mut self, vertex: RelRef, path: &mut Vec<RelRef>) -> Result<Rel<O>> {
        if let Some(pos) = path.iter().position(|v| *v == vertex) {
            return Err(PlanError::CycleDetected {
                vertices: path[pos..].to_vec(),
            });
        }
        let (op, inputs, digest) = match self.vertices.get(&vertex.0) {
            Some(v) => (v.op.clone(), v.inputs.clone(), v.digest.clone()),
            None => return Err(PlanError::DanglingRef(vertex)),
        };
        self.notify(PlannerEvent::RelChosen { digest });

        path.push(vertex);
        let mut children = Vec::with_capacity(inputs.len());
        for input in inputs {
            children.push(self.build_final_plan(input, path)?);
        }
        path.pop();
        Ok(Rel::node(op, children))
    }

    // ---- Costing ----

    fn cumulative_cost(&self, rel: &Rel<O>) -> Result<Cost> {
        let mut memo = HashMap::new();
        Ok(self.rel_estimate(rel, &mut memo, &mut HashSet::new())?.1)
    }

    /// Row count and cumulative cost of a tree whose leaves may be vertices.
    fn rel_estimate(
        &self,
        rel: &Rel<O>,
        memo: &mut HashMap<RelRef, (f64, Cost)>,
        active: &mut HashSet<RelRef>,
    ) -> Result<(f64, Cost)> {
        match rel {
            Rel::Ref(r) | Rel::Convert(r, _) => self.vertex_estimate(*r, memo, active),
            Rel::Node { op, inputs } => {
                let mut rows = Vec::with_capacity(inputs.len());
                let mut cost = Cost::ZERO;
                for input in inputs {
                    let (r, c) = self.rel_estimate(input, memo, active)?;
                    rows.push(r);
                    cost = cost.plus(&c);
                }
                Ok((op.row_count(&rows), op.self_cost(&rows).plus(&cost)))
            }
        }
    }

    fn vertex_estimate(
        &self,
        vertex: RelRef,
        memo: &mut HashMap<RelRef, (f64, Cost)>,
        active: &mut HashSet<RelRef>,
    ) -> Result<(f64, Cost)> {
        if let Some(estimate) = memo.get(&vertex) {
            return Ok(*estimate);
        }
        if !active.insert(vertex) {
            return Ok((0.0, Cost::INFINITY));
        }
        let v = self
            .vertices
            .get(&vertex.0)
            .ok_or(PlanError::DanglingRef(vertex))?;
        let mut rows = Vec::with_capacity(v.inputs.len());
        let mut cost = Cost::ZERO;
        for input in &v.inputs {
            let (r, c) = self.vertex_estimate(*input, memo, active)?;
            rows.push(r);
            cost = cost.plus(&c);
        }
        active.remove(&vertex);
        let estimate = (v.op.row_count(&rows), v.op.self_cost(&rows).plus(&cost));
        memo.insert(vertex, estimate);
        Ok(estimate)
    }

    // ---- Diagnostics ----

    /// Breadth-first listing of the live graph with row counts and cumulative costs.
    pub fn dump_graph(&self) -> String {
        let mut out = String::from("Breadth-first from root: {\n");
        if let Some(root) = self.root {
            let mut memo = HashMap::new();
            let mut seen = HashSet::from([root]);
            let mut queue = VecDeque::from([root]);
            while let Some(vertex) = queue.pop_front() {
                let Some(v) = self.vertices.get(&vertex.0) else {
                    continue;
                };
                let (rows, cost) = self
                    .vertex_estimate(vertex, &mut memo, &mut HashSet::new())
                    .unwrap_or((0.0, Cost::INFINITY));
                out.push_str(&format!(
                    "    {} = {}, rowcount={}, cumulative cost={}\n",
                    vertex, v.digest, rows, cost
                ));
                for input in &v.inputs {
                    if seen.insert(*input) {
                        queue.push_back(*input);
                    }
                }
            }
        }
        out.push('}');
        out
    }

    fn trace_graph(&self) -> Result<()> {
        if !tracing::enabled!(Level::TRACE) {
            return Ok(());
        }
        trace!("{}", self.dump_graph());
        self.topological_order().map(|_| ())
    }

    fn notify(&mut self, event: PlannerEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_event(&event);
        }
    }
}

impl<O: Operator> MatchSource<O> for HepPlanner<O> {
    fn op(&self, node: RelRef) -> Option<&O> {
        self.vertices.get(&node.0).map(|v| &v.op)
    }

    fn inputs(&self, node: RelRef) -> Option<&[RelRef]> {
        self.vertices.get(&node.0).map(|v| v.inputs.as_slice())
    }

    fn handle(&self, node: RelRef) -> RelRef {
        node
    }

    fn candidates(&self, input: RelRef) -> Vec<RelRef> {
        vec![input]
    }
}
