//! # Heuristic Programs
//!
//! A [`HepProgram`] is an ordered list of instructions interpreted by the
//! [`HepPlanner`](super::HepPlanner). Programs are built with [`HepProgramBuilder`]:
//!
//! ```text
//! HepProgram::builder()
//!     .add_match_order(MatchOrder::BottomUp)
//!     .add_rule_instance(filter_merge)
//!     .add_group_begin()
//!     .add_rule_by_description("FilterIntoJoin")
//!     .add_rule_class("ProjectRules")
//!     .add_group_end()
//!     .add_subprogram(cleanup)
//!     .build()?
//! ```
//!
//! ## Groups
//!
//! Rule instructions between `add_group_begin` and `add_group_end` do not fire on
//! their own. Their rules are collected and, when the group closes, fired together
//! as one rule set. Only rule instructions are allowed inside a group, and groups do
//! not nest.
//!
//! ## State
//!
//! Match order and match limit are program state, not rule state. Every execution of
//! a program (the main program, or each pass of a subprogram) starts with
//! [`MatchOrder::Arbitrary`] and [`MATCH_UNTIL_FIXPOINT`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};
use crate::expr::Operator;
use crate::rule::Rule;

/// Match limit meaning "no limit".
pub const MATCH_UNTIL_FIXPOINT: usize = usize::MAX;

/// Order in which graph vertices are visited when matching rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOrder {
    /// Depth-first from the root. After a transformation, matching resumes from the
    /// new vertex and another full sweep is owed.
    #[default]
    Arbitrary,
    /// Parents before children. Restarts from the root after every transformation.
    TopDown,
    /// Children before parents. Restarts from the root after every transformation.
    BottomUp,
}

pub enum HepInstruction<O: Operator> {
    RuleInstance(Arc<dyn Rule<O>>),
    /// Resolved against the planner's registry when executed.
    RuleByDescription(String),
    RuleClass(String),
    RuleCollection(Vec<Arc<dyn Rule<O>>>),
    Converters { guaranteed: bool },
    BeginGroup,
    EndGroup,
    MatchOrder(MatchOrder),
    MatchLimit(usize),
    Subprogram(HepProgram<O>),
}

impl<O: Operator> HepInstruction<O> {
    fn is_rule(&self) -> bool {
        matches!(
            self,
            HepInstruction::RuleInstance(_)
                | HepInstruction::RuleByDescription(_)
                | HepInstruction::RuleClass(_)
                | HepInstruction::RuleCollection(_)
        )
    }
}

impl<O: Operator> fmt::Debug for HepInstruction<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HepInstruction::RuleInstance(rule) => write!(f, "RuleInstance({})", rule.description()),
            HepInstruction::RuleByDescription(d) => write!(f, "RuleByDescription({})", d),
            HepInstruction::RuleClass(c) => write!(f, "RuleClass({})", c),
            HepInstruction::RuleCollection(rules) => {
                let names: Vec<&str> = rules.iter().map(|r| r.description()).collect();
                write!(f, "RuleCollection({:?})", names)
            }
            HepInstruction::Converters { guaranteed } => {
                write!(f, "Converters(guaranteed={})", guaranteed)
            }
            HepInstruction::BeginGroup => write!(f, "BeginGroup"),
            HepInstruction::EndGroup => write!(f, "EndGroup"),
            HepInstruction::MatchOrder(order) => write!(f, "MatchOrder({:?})", order),
            HepInstruction::MatchLimit(limit) => write!(f, "MatchLimit({})", limit),
            HepInstruction::Subprogram(program) => write!(f, "Subprogram({:?})", program),
        }
    }
}

/// An immutable, validated instruction list.
pub struct HepProgram<O: Operator> {
    instructions: Vec<HepInstruction<O>>,
}

impl<O: Operator> HepProgram<O> {
    pub fn builder() -> HepProgramBuilder<O> {
        HepProgramBuilder::new()
    }

    pub fn instructions(&self) -> &[HepInstruction<O>] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl<O: Operator> fmt::Debug for HepProgram<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.instructions.iter()).finish()
    }
}

/// Builder for [`HepProgram`].
///
/// Structural mistakes do not panic. The first one is remembered and returned by
/// [`build`](Self::build) as [`PlanError::MalformedProgram`].
pub struct HepProgramBuilder<O: Operator> {
    instructions: Vec<HepInstruction<O>>,
    in_group: bool,
    error: Option<String>,
}

impl<O: Operator> HepProgramBuilder<O> {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            in_group: false,
            error: None,
        }
    }

    fn push(mut self, instruction: HepInstruction<O>) -> Self {
        if self.in_group && !instruction.is_rule() {
            self.fail(format!("{:?} is not allowed inside a group", instruction));
        }
        self.instructions.push(instruction);
        self
    }

    fn fail(&mut self, message: String) {
        if self.error.is_none() {
            self.error = Some(message);
        }
    }

    pub fn add_rule_instance(self, rule: Arc<dyn Rule<O>>) -> Self {
        self.push(HepInstruction::RuleInstance(rule))
    }

    /// Fire the registered rule with this description. Unknown descriptions are
    /// skipped at execution time.
    pub fn add_rule_by_description(self, description: impl Into<String>) -> Self {
        self.push(HepInstruction::RuleByDescription(description.into()))
    }

    /// Fire every registered rule whose [`Rule::rule_class`] equals `class`.
    pub fn add_rule_class(self, class: impl Into<String>) -> Self {
        self.push(HepInstruction::RuleClass(class.into()))
    }

    pub fn add_rule_collection(self, rules: Vec<Arc<dyn Rule<O>>>) -> Self {
        self.push(HepInstruction::RuleCollection(rules))
    }

    /// Fire the registered converter rules with the given guarantee flag.
    pub fn add_converters(self, guaranteed: bool) -> Self {
        self.push(HepInstruction::Converters { guaranteed })
    }

    pub fn add_group_begin(mut self) -> Self {
        if self.in_group {
            self.fail("group begun inside another group".to_string());
        }
        self.in_group = true;
        self.instructions.push(HepInstruction::BeginGroup);
        self
    }

    pub fn add_group_end(mut self) -> Self {
        if !self.in_group {
            self.fail("group end without a matching begin".to_string());
        }
        self.in_group = false;
        self.instructions.push(HepInstruction::EndGroup);
        self
    }

    pub fn add_match_order(self, order: MatchOrder) -> Self {
        self.push(HepInstruction::MatchOrder(order))
    }

    /// Stop a rule instruction after `limit` successful transformations.
    pub fn add_match_limit(self, limit: usize) -> Self {
        self.push(HepInstruction::MatchLimit(limit))
    }

    /// Run `program` repeatedly until a pass performs no transformation.
    pub fn add_subprogram(self, program: HepProgram<O>) -> Self {
        self.push(HepInstruction::Subprogram(program))
    }

    pub fn build(mut self) -> Result<HepProgram<O>> {
        if self.in_group {
            self.fail("group not closed".to_string());
        }
        match self.error {
            Some(message) => Err(PlanError::MalformedProgram(message)),
            None => Ok(HepProgram {
                instructions: self.instructions,
            }),
        }
    }
}

impl<O: Operator> Default for HepProgramBuilder<O> {
    fn default() -> Self {
        Self::new()
    }
}
