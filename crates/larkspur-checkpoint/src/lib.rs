//! Larkspur Checkpoint
//!
//! Durable storage for workflow state snapshots taken at the
//! human-feedback suspension point. The contract is deliberately small:
//! save a state and get an opaque token; later resume with the token and
//! get the prior state back verbatim.
//!
//! Two implementations are provided: [`SqliteCheckpointStore`] for
//! durable suspension across processes and [`MemoryCheckpointStore`] for
//! tests and single-process runs.

mod memory;
mod sqlite;

pub use memory::MemoryCheckpointStore;
pub use sqlite::SqliteCheckpointStore;

use async_trait::async_trait;
use larkspur_state::WorkflowState;

/// Errors raised by checkpoint storage.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
  /// No checkpoint exists for the supplied token.
  #[error("no checkpoint found for token '{0}'")]
  NotFound(String),

  /// A database error occurred.
  #[error("checkpoint database error")]
  Database(#[from] sqlx::Error),

  /// The stored snapshot could not be decoded.
  #[error("checkpoint snapshot is corrupt")]
  Corrupt(#[from] serde_json::Error),
}

/// Storage for suspended workflow state.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
  /// Persist a snapshot and return its resume token.
  async fn save(&self, state: &WorkflowState) -> Result<String, CheckpointError>;

  /// Restore the snapshot saved under `token`.
  async fn resume(&self, token: &str) -> Result<WorkflowState, CheckpointError>;
}
