use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlanError;

/// Title used when an edited or repaired plan arrives without one.
pub const DEFAULT_PLAN_TITLE: &str = "Deep Research";

/// The nature of a step: information gathering or data processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
  Research,
  Processing,
}

/// One unit of delegated work within a plan.
///
/// A step is done iff `execution_res` is set; error text written by a
/// failed worker counts as done. Steps are totally ordered within a plan
/// and are executed strictly in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
  pub need_search: bool,
  pub title: String,
  pub description: String,
  pub step_type: StepType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub execution_res: Option<String>,
}

impl Step {
  /// Whether this step has been executed (successfully or not).
  pub fn is_done(&self) -> bool {
    self.execution_res.is_some()
  }
}

/// Structured output of the planning stage.
///
/// Immutable once accepted, except for in-place `execution_res` writes by
/// the worker that executes each step. When `has_enough_context` is true
/// the steps are context only, never pending work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
  pub locale: String,
  pub has_enough_context: bool,
  pub thought: String,
  pub title: String,
  #[serde(default)]
  pub steps: Vec<Step>,
}

impl Plan {
  /// The first step without an execution result, if any.
  pub fn first_pending_step(&self) -> Option<&Step> {
    self.steps.iter().find(|s| !s.is_done())
  }

  /// Mutable access to the first step without an execution result.
  pub fn first_pending_step_mut(&mut self) -> Option<&mut Step> {
    self.steps.iter_mut().find(|s| !s.is_done())
  }

  /// The steps that already carry an execution result, in order.
  pub fn completed_steps(&self) -> impl Iterator<Item = &Step> {
    self.steps.iter().filter(|s| s.is_done())
  }

  /// Whether every step of the plan has been executed.
  pub fn all_steps_done(&self) -> bool {
    !self.steps.is_empty() && self.steps.iter().all(|s| s.is_done())
  }

  /// Parse a plan from a JSON value, backfilling missing fields.
  ///
  /// Used for plans supplied by an external editor and for repaired raw
  /// planner output, where partial objects are expected. Missing plan
  /// fields default to `"Deep Research"` / `""` / `[]` / `false` /
  /// `fallback_locale`; missing step fields default to `need_search =
  /// true`, `step_type = research`, `execution_res = null`.
  pub fn from_value_with_defaults(value: Value, fallback_locale: &str) -> Result<Plan, PlanError> {
    let mut fields = match value {
      Value::Object(fields) => fields,
      other => {
        return Err(PlanError::NotAnObject {
          found: json_type_name(&other),
        });
      }
    };

    let title = take_string(&mut fields, "title").unwrap_or_else(|| DEFAULT_PLAN_TITLE.to_string());
    let thought = take_string(&mut fields, "thought").unwrap_or_default();
    let locale =
      take_string(&mut fields, "locale").unwrap_or_else(|| fallback_locale.to_string());
    let has_enough_context = fields
      .remove("has_enough_context")
      .and_then(|v| v.as_bool())
      .unwrap_or(false);

    let steps = match fields.remove("steps") {
      Some(Value::Array(raw_steps)) => raw_steps
        .into_iter()
        .filter_map(step_with_defaults)
        .collect(),
      _ => Vec::new(),
    };

    Ok(Plan {
      locale,
      has_enough_context,
      thought,
      title,
      steps,
    })
  }
}

/// Backfill one step object; entries that are not objects are dropped.
fn step_with_defaults(value: Value) -> Option<Step> {
  let Value::Object(mut fields) = value else {
    return None;
  };

  let need_search = fields
    .remove("need_search")
    .and_then(|v| v.as_bool())
    .unwrap_or(true);
  let step_type = match fields.remove("step_type") {
    Some(v) => serde_json::from_value(v).unwrap_or(StepType::Research),
    None => StepType::Research,
  };
  let execution_res = take_string(&mut fields, "execution_res");

  Some(Step {
    need_search,
    title: take_string(&mut fields, "title").unwrap_or_default(),
    description: take_string(&mut fields, "description").unwrap_or_default(),
    step_type,
    execution_res,
  })
}

fn take_string(fields: &mut serde_json::Map<String, Value>, key: &str) -> Option<String> {
  match fields.remove(key) {
    Some(Value::String(s)) => Some(s),
    _ => None,
  }
}

fn json_type_name(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

/// A candidate plan held on the blackboard.
///
/// The planner stores raw text when its output did not validate as a
/// sufficient plan; the feedback gate is responsible for repairing and
/// parsing the raw variant before work is dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanDraft {
  Plan(Plan),
  Raw(String),
}

impl PlanDraft {
  /// The validated plan, if this draft holds one.
  pub fn as_plan(&self) -> Option<&Plan> {
    match self {
      PlanDraft::Plan(plan) => Some(plan),
      PlanDraft::Raw(_) => None,
    }
  }

  /// Mutable access to the validated plan, if this draft holds one.
  pub fn as_plan_mut(&mut self) -> Option<&mut Plan> {
    match self {
      PlanDraft::Plan(plan) => Some(plan),
      PlanDraft::Raw(_) => None,
    }
  }

  /// Whether this draft is still raw, unparsed planner output.
  pub fn is_raw(&self) -> bool {
    matches!(self, PlanDraft::Raw(_))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn step_is_done_iff_execution_res_set() {
    let mut step = Step {
      need_search: true,
      title: "Collect data".to_string(),
      description: "Find market numbers".to_string(),
      step_type: StepType::Research,
      execution_res: None,
    };
    assert!(!step.is_done());

    // Error text still counts as done.
    step.execution_res = Some("Error: worker timed out".to_string());
    assert!(step.is_done());
  }

  #[test]
  fn strict_parse_requires_plan_fields() {
    let missing_locale = json!({
      "has_enough_context": false,
      "thought": "t",
      "title": "x",
      "steps": []
    });
    assert!(serde_json::from_value::<Plan>(missing_locale).is_err());

    let complete = json!({
      "locale": "en-US",
      "has_enough_context": false,
      "thought": "t",
      "title": "x"
    });
    let plan: Plan = serde_json::from_value(complete).unwrap();
    assert!(plan.steps.is_empty());
  }

  #[test]
  fn defaults_backfill_plan_and_steps() {
    let value = json!({
      "title": "X",
      "steps": [{ "description": "do the thing" }]
    });
    let plan = Plan::from_value_with_defaults(value, "zh-CN").unwrap();

    assert_eq!(plan.title, "X");
    assert_eq!(plan.thought, "");
    assert_eq!(plan.locale, "zh-CN");
    assert!(!plan.has_enough_context);
    assert_eq!(plan.steps.len(), 1);
    assert!(plan.steps[0].need_search);
    assert_eq!(plan.steps[0].step_type, StepType::Research);
    assert!(plan.steps[0].execution_res.is_none());
  }

  #[test]
  fn defaults_backfill_empty_object() {
    let plan = Plan::from_value_with_defaults(json!({}), "en-US").unwrap();
    assert_eq!(plan.title, DEFAULT_PLAN_TITLE);
    assert!(plan.steps.is_empty());
  }

  #[test]
  fn defaults_reject_non_object() {
    let err = Plan::from_value_with_defaults(json!([1, 2]), "en-US").unwrap_err();
    assert!(matches!(err, PlanError::NotAnObject { found: "array" }));
  }

  #[test]
  fn first_pending_step_respects_order() {
    let plan = Plan {
      locale: "en-US".to_string(),
      has_enough_context: false,
      thought: String::new(),
      title: "T".to_string(),
      steps: vec![
        Step {
          need_search: true,
          title: "one".to_string(),
          description: String::new(),
          step_type: StepType::Research,
          execution_res: Some("done".to_string()),
        },
        Step {
          need_search: false,
          title: "two".to_string(),
          description: String::new(),
          step_type: StepType::Processing,
          execution_res: None,
        },
      ],
    };

    assert_eq!(plan.first_pending_step().unwrap().title, "two");
    assert!(!plan.all_steps_done());
  }
}
