//! Sequential workflow engine.
//!
//! One node runs at a time; the next node comes from the node's explicit
//! routing override or the routing table. The blackboard is owned by the
//! running node for the duration of its call and updated only via the
//! delta it returns. The human-feedback gate is the only suspension
//! point: the engine checkpoints the state there and yields until the
//! caller resumes with a feedback value.

use std::sync::Arc;

use larkspur_checkpoint::CheckpointStore;
use larkspur_llm::ModelRegistry;
use larkspur_state::WorkflowState;
use larkspur_tools::WorkerRole;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::config::WorkflowConfig;
use crate::error::GraphError;
use crate::events::{ExecutionEvent, ExecutionNotifier};
use crate::nodes::{self, GateOutcome};
use crate::routing::{
  NodeId, from_coordinator, from_human_feedback, from_planner, from_research_team,
};

/// Upper bound on node transitions per run; a routing cycle that reaches
/// it is forced into the reporter so the run still terminates with output.
const MAX_TRANSITIONS: u32 = 128;

/// Which topology a graph was compiled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
  /// The full research topology with conditional routing.
  Full,
  /// The last-resort `coordinator -> reporter` graph.
  Minimal,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
  /// The run reached the terminal state.
  Completed { state: WorkflowState },
  /// The run is waiting for external feedback at the plan-review gate.
  /// `token` resumes it via [`WorkflowGraph::resume`]; without a
  /// checkpoint store the token is absent and the caller resumes with
  /// the returned state via [`WorkflowGraph::resume_with_state`].
  Suspended {
    token: Option<String>,
    state: WorkflowState,
  },
}

/// A compiled, runnable workflow graph.
pub struct WorkflowGraph {
  pub(crate) topology: Topology,
  pub(crate) config: WorkflowConfig,
  pub(crate) models: Arc<ModelRegistry>,
  pub(crate) checkpoints: Option<Arc<dyn CheckpointStore>>,
  pub(crate) notifier: Arc<dyn ExecutionNotifier>,
}

impl WorkflowGraph {
  /// The topology this graph was compiled with.
  pub fn topology(&self) -> Topology {
    self.topology
  }

  /// Whether suspension produces durable resume tokens.
  pub fn has_checkpoints(&self) -> bool {
    self.checkpoints.is_some()
  }

  /// Run a workflow from the beginning.
  pub async fn run(
    &self,
    state: WorkflowState,
    cancel: CancellationToken,
  ) -> Result<RunOutcome, GraphError> {
    self.drive(state, NodeId::Coordinator, None, cancel).await
  }

  /// Resume a suspended run from its checkpoint token.
  pub async fn resume(
    &self,
    token: &str,
    feedback: &str,
    cancel: CancellationToken,
  ) -> Result<RunOutcome, GraphError> {
    let store = self.checkpoints.as_ref().ok_or(GraphError::NoCheckpointStore)?;
    let state = store.resume(token).await?;
    info!(token = %token, "resuming suspended run");
    self
      .drive(state, NodeId::HumanFeedback, Some(feedback.to_string()), cancel)
      .await
  }

  /// Resume a suspended run from caller-held state (no checkpoint store
  /// required).
  pub async fn resume_with_state(
    &self,
    state: WorkflowState,
    feedback: &str,
    cancel: CancellationToken,
  ) -> Result<RunOutcome, GraphError> {
    self
      .drive(state, NodeId::HumanFeedback, Some(feedback.to_string()), cancel)
      .await
  }

  /// The main execution loop.
  #[instrument(name = "workflow_run", skip_all, fields(start = %start))]
  async fn drive(
    &self,
    mut state: WorkflowState,
    start: NodeId,
    mut feedback: Option<String>,
    cancel: CancellationToken,
  ) -> Result<RunOutcome, GraphError> {
    let run_id = uuid::Uuid::new_v4().to_string();
    let mut current = start;
    let mut transitions = 0u32;
    let mut forced_report = false;

    info!(run_id = %run_id, "workflow started");

    loop {
      if cancel.is_cancelled() {
        warn!(run_id = %run_id, "workflow cancelled");
        return Err(GraphError::Cancelled);
      }

      transitions += 1;
      if transitions > MAX_TRANSITIONS && !forced_report {
        error!(
          run_id = %run_id,
          limit = MAX_TRANSITIONS,
          "transition limit reached, forcing report generation"
        );
        forced_report = true;
        current = NodeId::Reporter;
      }

      self.notifier.notify(ExecutionEvent::NodeStarted {
        run_id: run_id.clone(),
        node: current,
      });

      let outcome = match current {
        NodeId::Coordinator => {
          nodes::coordinator::run(&state, &self.config, &self.models).await
        }
        NodeId::BackgroundInvestigator => nodes::investigator::run(&state),
        NodeId::Planner => nodes::planner::run(&state, &self.config, &self.models).await,
        NodeId::HumanFeedback => match nodes::feedback::run(&state, feedback.take().as_deref()) {
          GateOutcome::Proceed(outcome) => outcome,
          GateOutcome::AwaitFeedback => {
            let token = self.save_checkpoint(&state).await;
            self.notifier.notify(ExecutionEvent::WorkflowSuspended {
              run_id: run_id.clone(),
              token: token.clone(),
            });
            info!(run_id = %run_id, durable = token.is_some(), "workflow suspended for plan review");
            return Ok(RunOutcome::Suspended { token, state });
          }
        },
        NodeId::ResearchTeam => nodes::team::run(&state),
        NodeId::Researcher => {
          nodes::worker::run(WorkerRole::Researcher, &state, &self.config, &self.models).await
        }
        NodeId::Coder => {
          nodes::worker::run(WorkerRole::Coder, &state, &self.config, &self.models).await
        }
        NodeId::Reporter => nodes::reporter::run(&state, &self.config, &self.models).await,
        NodeId::End => {
          // Routing never targets End without going through the arm
          // below, but terminate cleanly if it ever does.
          self.notifier.notify(ExecutionEvent::WorkflowCompleted {
            run_id: run_id.clone(),
          });
          return Ok(RunOutcome::Completed { state });
        }
      };

      for message in &outcome.delta.messages {
        self.notifier.notify(ExecutionEvent::MessageAppended {
          run_id: run_id.clone(),
          message: message.clone(),
        });
      }
      let explicit = outcome.goto;
      state.apply(outcome.delta);

      self.notifier.notify(ExecutionEvent::NodeCompleted {
        run_id: run_id.clone(),
        node: current,
      });

      let next = explicit.unwrap_or_else(|| self.next_node(current, &state));
      if next == NodeId::End {
        info!(run_id = %run_id, "workflow completed");
        self.notifier.notify(ExecutionEvent::WorkflowCompleted {
          run_id: run_id.clone(),
        });
        return Ok(RunOutcome::Completed { state });
      }
      current = next;
    }
  }

  /// Pick the next node from the routing table.
  fn next_node(&self, current: NodeId, state: &WorkflowState) -> NodeId {
    match self.topology {
      Topology::Minimal => match current {
        NodeId::Coordinator => NodeId::Reporter,
        _ => NodeId::End,
      },
      Topology::Full => match current {
        NodeId::Coordinator => from_coordinator(state),
        NodeId::BackgroundInvestigator => NodeId::Planner,
        NodeId::Planner => from_planner(state),
        NodeId::HumanFeedback => from_human_feedback(state),
        NodeId::ResearchTeam => from_research_team(state),
        NodeId::Researcher | NodeId::Coder => NodeId::ResearchTeam,
        NodeId::Reporter | NodeId::End => NodeId::End,
      },
    }
  }

  /// Checkpoint the state if a store is attached. A failed save degrades
  /// to an in-memory suspension rather than failing the run.
  async fn save_checkpoint(&self, state: &WorkflowState) -> Option<String> {
    let store = self.checkpoints.as_ref()?;
    match store.save(state).await {
      Ok(token) => Some(token),
      Err(e) => {
        warn!(error = %e, "checkpoint save failed, suspension is not durable");
        None
      }
    }
  }
}
