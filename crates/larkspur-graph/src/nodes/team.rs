//! Research team dispatcher.
//!
//! The dispatcher itself does no work: it inspects the plan, logs the
//! dispatch decision, and defers to the routing table, which sends the
//! first pending step to a worker or closes the plan out.

use larkspur_state::WorkflowState;
use tracing::{info, instrument};

use crate::nodes::NodeOutcome;
use crate::routing::from_research_team;

#[instrument(name = "research_team", skip_all)]
pub fn run(state: &WorkflowState) -> NodeOutcome {
  let next = from_research_team(state);
  let pending = state
    .current_plan
    .as_ref()
    .and_then(|draft| draft.as_plan())
    .and_then(|plan| plan.first_pending_step());

  match pending {
    Some(step) => info!(step = %step.title, next = %next, "dispatching step"),
    None => info!(next = %next, "no pending steps"),
  }

  NodeOutcome::route()
}
