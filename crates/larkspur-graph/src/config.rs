use std::time::Duration;

use larkspur_state::Resource;
use larkspur_tools::ToolServerRegistry;
use tracing::warn;

/// Fallback when `max_agent_steps` is configured non-positive.
const DEFAULT_AGENT_STEPS: u32 = 25;

/// Configuration for one workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
  /// Plan revisions accepted before the planner gives up and reports.
  pub max_plan_iterations: u32,
  /// Upper bound on the number of steps the planner may emit.
  pub max_step_num: u32,
  /// Result limit forwarded to the researcher's search tool.
  pub max_search_results: u32,
  /// Bound on a worker's internal tool-call loop. Non-positive values
  /// are rejected at read time and the default of 25 is used.
  pub max_agent_steps: i64,
  /// Reference documents handed to the researcher.
  pub resources: Vec<Resource>,
  /// Auxiliary tool servers, scoped per worker role.
  pub tool_servers: ToolServerRegistry,
  /// Deadline for one ordinary step execution.
  pub step_timeout: Duration,
  /// Deadline for summary/consolidation steps, which process more data.
  pub summary_step_timeout: Duration,
  /// Deadline for final report generation.
  pub report_timeout: Duration,
}

impl Default for WorkflowConfig {
  fn default() -> Self {
    Self {
      max_plan_iterations: 1,
      max_step_num: 3,
      max_search_results: 3,
      max_agent_steps: DEFAULT_AGENT_STEPS as i64,
      resources: Vec::new(),
      tool_servers: ToolServerRegistry::default(),
      step_timeout: Duration::from_secs(180),
      summary_step_timeout: Duration::from_secs(300),
      report_timeout: Duration::from_secs(300),
    }
  }
}

impl WorkflowConfig {
  /// The effective tool-call budget for one worker invocation.
  pub fn agent_step_budget(&self) -> u32 {
    if self.max_agent_steps > 0 {
      self.max_agent_steps as u32
    } else {
      warn!(
        configured = self.max_agent_steps,
        default = DEFAULT_AGENT_STEPS,
        "max_agent_steps is not positive, using default"
      );
      DEFAULT_AGENT_STEPS
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn non_positive_agent_steps_fall_back_to_default() {
    let mut config = WorkflowConfig::default();

    config.max_agent_steps = 0;
    assert_eq!(config.agent_step_budget(), 25);

    config.max_agent_steps = -7;
    assert_eq!(config.agent_step_budget(), 25);

    config.max_agent_steps = 10;
    assert_eq!(config.agent_step_budget(), 10);
  }
}
