//! Memoizing, cost-based planning.
//!
//! [`VolcanoPlanner`] explores every alternative the rules produce and extracts
//! the cheapest plan per [`Cost`](crate::cost::Cost).

mod planner;
mod set;

pub use planner::{SearchConfig, VolcanoPlanner};
