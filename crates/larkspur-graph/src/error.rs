//! Workflow errors.
//!
//! Most failures in the workflow are contained where they happen and
//! surface as data: a step result string, a degraded report, a log
//! entry. The variants here exist so those sites share one vocabulary;
//! only [`GraphError::Cancelled`] and the checkpoint variants ever cross
//! the engine boundary.

use larkspur_checkpoint::CheckpointError;

/// Errors that can occur while running or constructing a workflow.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
  /// Planner output did not parse as a plan.
  #[error("planner output could not be parsed as a plan: {detail}")]
  PlanParse { detail: String },

  /// A worker exceeded its step deadline.
  #[error("{worker} timed out after {elapsed_secs} seconds executing step '{step}'")]
  StepTimeout {
    worker: String,
    step: String,
    elapsed_secs: u64,
  },

  /// A worker failed during step execution.
  #[error("{worker} failed executing step '{step}': {detail}")]
  StepExecution {
    worker: String,
    step: String,
    detail: String,
  },

  /// One graph-construction tier failed.
  #[error("graph construction failed: {detail}")]
  Construction { detail: String },

  /// Checkpoint save or restore failed.
  #[error("checkpoint operation failed")]
  Checkpoint(#[from] CheckpointError),

  /// Resume was called on a graph without a checkpoint store.
  #[error("no checkpoint store attached; resume with the caller-held state instead")]
  NoCheckpointStore,

  /// The run was cancelled from outside.
  #[error("workflow cancelled")]
  Cancelled,
}
