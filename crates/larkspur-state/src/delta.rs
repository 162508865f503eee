use larkspur_plan::PlanDraft;
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::state::Resource;

/// What a node returns to the engine.
///
/// Every field is optional or appendable; a default delta is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDelta {
  /// Appended to the dialogue log.
  #[serde(default)]
  pub messages: Vec<Message>,
  /// Appended to the observation log.
  #[serde(default)]
  pub observations: Vec<String>,
  /// Written into the first pending step of the accepted plan.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub step_result: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub locale: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub research_topic: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resources: Option<Vec<Resource>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plan_iterations: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_plan: Option<PlanDraft>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub final_report: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub background_investigation_results: Option<String>,
}

impl StateDelta {
  /// A delta that only appends one message.
  pub fn with_message(message: Message) -> Self {
    Self {
      messages: vec![message],
      ..Self::default()
    }
  }
}
