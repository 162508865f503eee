use larkspur_plan::PlanDraft;
use larkspur_plan::Step;
use serde::{Deserialize, Serialize};

use crate::delta::StateDelta;
use crate::message::Message;

/// An externally supplied reference document descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
  pub uri: String,
  pub title: String,
  #[serde(default)]
  pub description: String,
}

/// The shared blackboard for one workflow run.
///
/// Created once per run, owned exclusively by the currently executing
/// node, updated only through [`WorkflowState::apply`], and serialized
/// verbatim at the human-feedback suspension point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
  /// Append-only dialogue log.
  pub messages: Vec<Message>,
  pub locale: String,
  /// Empty means the coordinator handled the request directly.
  pub research_topic: String,
  /// Append-only, one entry per completed step.
  pub observations: Vec<String>,
  pub resources: Vec<Resource>,
  /// Incremented each time a plan revision is accepted.
  pub plan_iterations: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_plan: Option<PlanDraft>,
  /// Reserved for per-step parallel dispatch; the sequential engine never
  /// populates it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_step: Option<Step>,
  pub final_report: String,
  pub auto_accepted_plan: bool,
  pub enable_background_investigation: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub background_investigation_results: Option<String>,
}

impl Default for WorkflowState {
  fn default() -> Self {
    Self {
      messages: Vec::new(),
      locale: "en-US".to_string(),
      research_topic: String::new(),
      observations: Vec::new(),
      resources: Vec::new(),
      plan_iterations: 0,
      current_plan: None,
      current_step: None,
      final_report: String::new(),
      auto_accepted_plan: false,
      enable_background_investigation: true,
      background_investigation_results: None,
    }
  }
}

impl WorkflowState {
  /// Create a fresh state seeded with the user's request.
  pub fn from_user_message(content: impl Into<String>) -> Self {
    let content = content.into();
    Self {
      research_topic: content.clone(),
      messages: vec![Message::user(content).named("user")],
      ..Self::default()
    }
  }

  /// Merge a node's returned delta into this state.
  ///
  /// Messages and observations are appended, never overwritten. The step
  /// result, if present, is written into the first pending step of the
  /// accepted plan. Scalar fields are replaced only when the delta
  /// carries a value for them.
  pub fn apply(&mut self, delta: StateDelta) {
    self.messages.extend(delta.messages);
    self.observations.extend(delta.observations);

    if let Some(result) = delta.step_result {
      let pending = self
        .current_plan
        .as_mut()
        .and_then(|draft| draft.as_plan_mut())
        .and_then(|plan| plan.first_pending_step_mut());
      if let Some(step) = pending {
        step.execution_res = Some(result);
      }
    }

    if let Some(locale) = delta.locale {
      self.locale = locale;
    }
    if let Some(topic) = delta.research_topic {
      self.research_topic = topic;
    }
    if let Some(resources) = delta.resources {
      self.resources = resources;
    }
    if let Some(iterations) = delta.plan_iterations {
      self.plan_iterations = iterations;
    }
    if let Some(plan) = delta.current_plan {
      self.current_plan = Some(plan);
    }
    if let Some(report) = delta.final_report {
      self.final_report = report;
    }
    if let Some(results) = delta.background_investigation_results {
      self.background_investigation_results = Some(results);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use larkspur_plan::{Plan, PlanDraft, Step, StepType};

  fn plan_with_steps(steps: Vec<Step>) -> PlanDraft {
    PlanDraft::Plan(Plan {
      locale: "en-US".to_string(),
      has_enough_context: false,
      thought: String::new(),
      title: "T".to_string(),
      steps,
    })
  }

  fn pending_step(title: &str) -> Step {
    Step {
      need_search: true,
      title: title.to_string(),
      description: String::new(),
      step_type: StepType::Research,
      execution_res: None,
    }
  }

  #[test]
  fn observations_are_appended_not_replaced() {
    let mut state = WorkflowState::default();
    state.observations.push("first".to_string());

    state.apply(StateDelta {
      observations: vec!["second".to_string()],
      ..StateDelta::default()
    });

    assert_eq!(state.observations, vec!["first", "second"]);
  }

  #[test]
  fn scalars_survive_empty_delta() {
    let mut state = WorkflowState::default();
    state.research_topic = "quantum".to_string();
    state.plan_iterations = 2;

    state.apply(StateDelta::default());

    assert_eq!(state.research_topic, "quantum");
    assert_eq!(state.plan_iterations, 2);
  }

  #[test]
  fn step_result_lands_on_first_pending_step() {
    let mut state = WorkflowState::default();
    let mut done = pending_step("one");
    done.execution_res = Some("already".to_string());
    state.current_plan = Some(plan_with_steps(vec![done, pending_step("two")]));

    state.apply(StateDelta {
      step_result: Some("result for two".to_string()),
      ..StateDelta::default()
    });

    let plan = state.current_plan.as_ref().unwrap().as_plan().unwrap();
    assert_eq!(plan.steps[1].execution_res.as_deref(), Some("result for two"));
  }

  #[test]
  fn step_result_without_plan_is_dropped() {
    let mut state = WorkflowState::default();
    state.apply(StateDelta {
      step_result: Some("orphan".to_string()),
      ..StateDelta::default()
    });
    assert!(state.current_plan.is_none());
  }

  #[test]
  fn from_user_message_seeds_topic_and_log() {
    let state = WorkflowState::from_user_message("what is rust");
    assert_eq!(state.research_topic, "what is rust");
    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.messages[0].name.as_deref(), Some("user"));
  }
}
