//! Observer hooks.
//!
//! A [`PlannerListener`] is registered once on a planner and is told, synchronously,
//! about rule attempts and firings, discovered equivalences, nodes chosen for the final
//! plan and discarded duplicates. Listeners observe only; nothing they do feeds back
//! into planning decisions.

use std::cell::RefCell;
use std::rc::Rc;

use crate::expr::RelRef;

#[derive(Debug, Clone, PartialEq)]
pub enum PlannerEvent {
    /// A rule matched `node` and is about to be invoked.
    RuleAttempted { rule: String, node: RelRef },
    /// A rule produced an alternative that was incorporated as `result`.
    RuleFired {
        rule: String,
        node: RelRef,
        result: String,
    },
    /// An expression was found to belong to the equivalence identified by `node`.
    EquivalenceFound { digest: String, node: RelRef },
    /// An expression was chosen for the final plan.
    RelChosen { digest: String },
    /// A duplicate expression was dropped in favour of an existing one.
    RelDiscarded { digest: String },
}

pub trait PlannerListener {
    fn on_event(&mut self, event: &PlannerEvent);
}

/// Listener that records every event. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<PlannerEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlannerEvent> {
        self.events.borrow().clone()
    }

    /// Descriptions of fired rules, in firing order.
    pub fn fired(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                PlannerEvent::RuleFired { rule, .. } => Some(rule.clone()),
                _ => None,
            })
            .collect()
    }
}

impl PlannerListener for EventLog {
    fn on_event(&mut self, event: &PlannerEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
