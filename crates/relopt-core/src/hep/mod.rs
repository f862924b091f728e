//! Heuristic, program-driven planning.
//!
//! See [`HepPlanner`] for the rewriting engine and [`HepProgram`] for the
//! instruction language that drives it.

mod planner;
mod program;

pub use planner::HepPlanner;
pub use program::{HepInstruction, HepProgram, HepProgramBuilder, MatchOrder, MATCH_UNTIL_FIXPOINT};
