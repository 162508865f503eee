//! Human feedback gate.
//!
//! Decides whether to proceed with the candidate plan. Without
//! auto-accept, the gate asks the engine to suspend and waits for an
//! external feedback value. The feedback grammar:
//!
//! - `edit_plan` (case-insensitive): back to the planner.
//! - `accepted` (case-insensitive) or a leading `[ACCEPTED]`: proceed.
//! - a leading `[EDIT_PLAN]` followed by a `{`-prefixed JSON object: the
//!   object replaces the plan, with missing fields backfilled.
//! - anything else: accepted, with a warning. The gate never blocks on
//!   input it does not recognize.

use larkspur_llm::repair_json;
use larkspur_plan::{Plan, PlanDraft};
use larkspur_state::{Message, StateDelta, WorkflowState};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::nodes::{GateOutcome, NodeOutcome};
use crate::routing::NodeId;

#[instrument(name = "human_feedback", skip_all, fields(auto = state.auto_accepted_plan))]
pub fn run(state: &WorkflowState, feedback: Option<&str>) -> GateOutcome {
  if !state.auto_accepted_plan {
    let Some(feedback) = feedback else {
      info!("plan review required, suspending");
      return GateOutcome::AwaitFeedback;
    };
    let trimmed = feedback.trim();

    if trimmed.eq_ignore_ascii_case("edit_plan") {
      info!("reviewer asked for a planner revision");
      return GateOutcome::Proceed(NodeOutcome {
        delta: StateDelta::with_message(
          Message::user("Please revise the research plan based on user feedback.")
            .named("feedback"),
        ),
        goto: Some(NodeId::Planner),
      });
    }

    let upper = trimmed.to_uppercase();
    if trimmed.eq_ignore_ascii_case("accepted") || upper.starts_with("[ACCEPTED]") {
      info!("reviewer accepted the plan");
    } else if upper.starts_with("[EDIT_PLAN]") {
      match inline_edited_plan(trimmed, state) {
        Ok(plan) => {
          info!(title = %plan.title, steps = plan.steps.len(), "using reviewer-edited plan");
          let goto = if plan.has_enough_context {
            NodeId::Reporter
          } else {
            NodeId::ResearchTeam
          };
          return GateOutcome::Proceed(NodeOutcome {
            delta: StateDelta {
              messages: vec![
                Message::user(format!("Plan updated by user: {}", plan.title)).named("feedback"),
              ],
              locale: Some(plan.locale.clone()),
              plan_iterations: Some(state.plan_iterations + 1),
              current_plan: Some(PlanDraft::Plan(plan)),
              ..StateDelta::default()
            },
            goto: Some(goto),
          });
        }
        Err(reason) => {
          warn!(reason = %reason, "edited plan unusable, sending feedback to planner");
          return GateOutcome::Proceed(NodeOutcome {
            delta: StateDelta::with_message(Message::user(trimmed).named("feedback")),
            goto: Some(NodeId::Planner),
          });
        }
      }
    } else {
      warn!(feedback = %trimmed, "unrecognized feedback, treating as accepted");
    }
  }

  GateOutcome::Proceed(accept_current_plan(state))
}

/// Extract and parse the JSON object embedded in `[EDIT_PLAN]` feedback.
fn inline_edited_plan(feedback: &str, state: &WorkflowState) -> Result<Plan, String> {
  let start = feedback
    .find('{')
    .ok_or_else(|| "no JSON object in feedback".to_string())?;
  let value: Value = serde_json::from_str(&feedback[start..]).map_err(|e| e.to_string())?;
  Plan::from_value_with_defaults(value, &state.locale).map_err(|e| e.to_string())
}

/// Move forward with whatever plan is on the blackboard. Raw drafts are
/// repaired and parsed here, with the same default backfilling an edited
/// plan gets.
fn accept_current_plan(state: &WorkflowState) -> NodeOutcome {
  match &state.current_plan {
    Some(PlanDraft::Raw(raw)) => {
      let repaired = repair_json(raw);
      let parsed = serde_json::from_str::<Value>(&repaired)
        .map_err(|e| e.to_string())
        .and_then(|value| {
          Plan::from_value_with_defaults(value, &state.locale).map_err(|e| e.to_string())
        });

      match parsed {
        Ok(plan) => {
          let goto = if plan.has_enough_context {
            NodeId::Reporter
          } else {
            NodeId::ResearchTeam
          };
          info!(title = %plan.title, steps = plan.steps.len(), goto = %goto, "draft plan accepted");
          NodeOutcome {
            delta: StateDelta {
              locale: Some(plan.locale.clone()),
              plan_iterations: Some(state.plan_iterations + 1),
              current_plan: Some(PlanDraft::Plan(plan)),
              ..StateDelta::default()
            },
            goto: Some(goto),
          }
        }
        Err(reason) => {
          error!(reason = %reason, "accepted draft did not parse");
          if state.plan_iterations > 1 {
            NodeOutcome::goto(NodeId::Reporter)
          } else {
            NodeOutcome::goto(NodeId::End)
          }
        }
      }
    }
    Some(PlanDraft::Plan(plan)) => {
      let goto = if plan.has_enough_context {
        NodeId::Reporter
      } else {
        NodeId::ResearchTeam
      };
      NodeOutcome {
        delta: StateDelta {
          plan_iterations: Some(state.plan_iterations + 1),
          ..StateDelta::default()
        },
        goto: Some(goto),
      }
    }
    None => {
      warn!("feedback gate reached without a candidate plan");
      NodeOutcome::goto(NodeId::Planner)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use larkspur_plan::StepType;

  fn reviewed_state() -> WorkflowState {
    let mut state = WorkflowState::default();
    state.locale = "fr-FR".to_string();
    state.current_plan = Some(PlanDraft::Raw(
      r#"{"locale": "fr-FR", "title": "Draft", "thought": "", "has_enough_context": false,
          "steps": [{"title": "find data", "description": "look", "need_search": true,
                     "step_type": "research"}]}"#
        .to_string(),
    ));
    state
  }

  fn proceed(outcome: GateOutcome) -> NodeOutcome {
    match outcome {
      GateOutcome::Proceed(outcome) => outcome,
      GateOutcome::AwaitFeedback => panic!("gate unexpectedly suspended"),
    }
  }

  #[test]
  fn suspends_without_feedback_when_not_auto_accepted() {
    let state = reviewed_state();
    assert!(matches!(run(&state, None), GateOutcome::AwaitFeedback));
  }

  #[test]
  fn auto_accept_skips_interaction() {
    let mut state = reviewed_state();
    state.auto_accepted_plan = true;

    let outcome = proceed(run(&state, None));
    assert_eq!(outcome.goto, Some(NodeId::ResearchTeam));
    assert_eq!(outcome.delta.plan_iterations, Some(1));
  }

  #[test]
  fn edit_plan_keyword_loops_back_to_planner() {
    let state = reviewed_state();
    let outcome = proceed(run(&state, Some("Edit_Plan")));
    assert_eq!(outcome.goto, Some(NodeId::Planner));
    // The candidate plan is untouched.
    assert!(outcome.delta.current_plan.is_none());
  }

  #[test]
  fn inline_edit_backfills_and_increments() {
    let state = reviewed_state();
    let outcome = proceed(run(&state, Some(r#"[EDIT_PLAN]{"title":"X","steps":[]}"#)));

    assert_eq!(outcome.goto, Some(NodeId::ResearchTeam));
    assert_eq!(outcome.delta.plan_iterations, Some(1));

    let Some(PlanDraft::Plan(plan)) = outcome.delta.current_plan else {
      panic!("expected an accepted plan");
    };
    assert_eq!(plan.title, "X");
    assert_eq!(plan.thought, "");
    assert!(!plan.has_enough_context);
    assert_eq!(plan.locale, "fr-FR");
  }

  #[test]
  fn inline_edit_backfills_step_fields() {
    let state = reviewed_state();
    let feedback = r#"[EDIT_PLAN] here {"title":"X","steps":[{"title":"s","description":"d"}]}"#;
    let outcome = proceed(run(&state, Some(feedback)));

    let Some(PlanDraft::Plan(plan)) = outcome.delta.current_plan else {
      panic!("expected an accepted plan");
    };
    assert!(plan.steps[0].need_search);
    assert_eq!(plan.steps[0].step_type, StepType::Research);
    assert!(plan.steps[0].execution_res.is_none());
  }

  #[test]
  fn edit_marker_without_json_goes_back_to_planner() {
    let state = reviewed_state();
    let outcome = proceed(run(&state, Some("[EDIT_PLAN] please add a budget step")));
    assert_eq!(outcome.goto, Some(NodeId::Planner));
    assert_eq!(outcome.delta.messages.len(), 1);
  }

  #[test]
  fn unrecognized_feedback_is_implicit_acceptance() {
    let state = reviewed_state();
    let outcome = proceed(run(&state, Some("looks fine I guess")));
    assert_eq!(outcome.goto, Some(NodeId::ResearchTeam));
    assert_eq!(outcome.delta.plan_iterations, Some(1));
  }

  #[test]
  fn accepted_marker_repairs_raw_draft() {
    let state = reviewed_state();
    let outcome = proceed(run(&state, Some("[ACCEPTED] ship it")));

    assert_eq!(outcome.goto, Some(NodeId::ResearchTeam));
    let Some(PlanDraft::Plan(plan)) = outcome.delta.current_plan else {
      panic!("expected the raw draft to be parsed");
    };
    assert_eq!(plan.title, "Draft");
  }

  #[test]
  fn unparseable_draft_ends_early_run() {
    let mut state = reviewed_state();
    state.current_plan = Some(PlanDraft::Raw("not a plan at all".to_string()));

    let outcome = proceed(run(&state, Some("accepted")));
    assert_eq!(outcome.goto, Some(NodeId::End));
  }

  #[test]
  fn unparseable_draft_salvages_after_iterations() {
    let mut state = reviewed_state();
    state.plan_iterations = 2;
    state.current_plan = Some(PlanDraft::Raw("not a plan at all".to_string()));

    let outcome = proceed(run(&state, Some("accepted")));
    assert_eq!(outcome.goto, Some(NodeId::Reporter));
  }

  #[test]
  fn sufficient_edited_plan_goes_to_reporter() {
    let state = reviewed_state();
    let feedback = r#"[EDIT_PLAN]{"title":"X","has_enough_context":true}"#;
    let outcome = proceed(run(&state, Some(feedback)));
    assert_eq!(outcome.goto, Some(NodeId::Reporter));
  }
}
