//! Graph-construction degradation tests.

mod support;

use std::sync::Arc;

use larkspur_graph::{GraphBuilder, RunOutcome, Topology, WorkflowConfig};
use larkspur_llm::ModelRegistry;
use larkspur_state::WorkflowState;
use tokio_util::sync::CancellationToken;

use support::{ScriptedModel, handoff, sufficient_plan_json, text};

#[tokio::test]
async fn durable_tier_failure_degrades_to_ephemeral_full_graph() {
  let model = ScriptedModel::new(vec![
    handoff("known topic", "en-US"),
    text(&sufficient_plan_json()),
    text("# Report"),
  ]);
  let models = Arc::new(ModelRegistry::with_model(model));

  // A checkpoint path whose parent is a file: the SQLite connect fails,
  // which fails the durable tier.
  let dir = tempfile::tempdir().unwrap();
  let blocker = dir.path().join("blocker");
  std::fs::write(&blocker, b"not a directory").unwrap();

  let graph = GraphBuilder::new(WorkflowConfig::default(), models)
    .with_checkpoint_path(blocker.join("checkpoints.db"))
    .build()
    .await;

  // Tier two: full topology, no persistence.
  assert_eq!(graph.topology(), Topology::Full);
  assert!(!graph.has_checkpoints());

  // The degraded graph still runs end to end.
  let mut state = WorkflowState::from_user_message("known topic");
  state.enable_background_investigation = false;

  let outcome = graph.run(state, CancellationToken::new()).await.unwrap();
  let RunOutcome::Completed { state } = outcome else {
    panic!("expected completion on the degraded graph");
  };
  assert_eq!(state.final_report, "# Report");
}

#[tokio::test]
async fn ephemeral_graph_suspends_without_a_token() {
  let model = ScriptedModel::new(vec![
    handoff("topic", "en-US"),
    text(r#"{"title": "Draft", "has_enough_context": false, "steps": []}"#),
    text("ignored"),
  ]);
  let models = Arc::new(ModelRegistry::with_model(model));

  let dir = tempfile::tempdir().unwrap();
  let blocker = dir.path().join("blocker");
  std::fs::write(&blocker, b"not a directory").unwrap();

  let graph = GraphBuilder::new(WorkflowConfig::default(), models)
    .with_checkpoint_path(blocker.join("checkpoints.db"))
    .build()
    .await;

  let mut state = WorkflowState::from_user_message("topic");
  state.enable_background_investigation = false;

  let outcome = graph.run(state, CancellationToken::new()).await.unwrap();
  let RunOutcome::Suspended { token, state } = outcome else {
    panic!("expected suspension");
  };

  // No durable token without a store; the caller resumes with the state.
  assert!(token.is_none());
  let resumed = graph
    .resume_with_state(state, "accepted", CancellationToken::new())
    .await
    .unwrap();
  assert!(matches!(resumed, RunOutcome::Completed { .. }));

  // And token-based resume is an explicit error on this tier.
  let err = graph
    .resume("whatever", "accepted", CancellationToken::new())
    .await
    .unwrap_err();
  assert!(matches!(err, larkspur_graph::GraphError::NoCheckpointStore));
}

#[tokio::test]
async fn default_build_uses_the_durable_tier() {
  let models = Arc::new(ModelRegistry::with_model(ScriptedModel::new(vec![])));
  let graph = GraphBuilder::new(WorkflowConfig::default(), models).build().await;

  assert_eq!(graph.topology(), Topology::Full);
  assert!(graph.has_checkpoints());
}
