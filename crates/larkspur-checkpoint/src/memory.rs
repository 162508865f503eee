use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use larkspur_state::WorkflowState;

use crate::{CheckpointError, CheckpointStore};

/// In-memory checkpoint store.
///
/// Suspension works within the process lifetime only; useful for tests
/// and single-process interactive runs.
#[derive(Default)]
pub struct MemoryCheckpointStore {
  snapshots: RwLock<HashMap<String, WorkflowState>>,
}

impl MemoryCheckpointStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
  async fn save(&self, state: &WorkflowState) -> Result<String, CheckpointError> {
    let token = uuid::Uuid::new_v4().to_string();
    self
      .snapshots
      .write()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .insert(token.clone(), state.clone());
    Ok(token)
  }

  async fn resume(&self, token: &str) -> Result<WorkflowState, CheckpointError> {
    self
      .snapshots
      .read()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .get(token)
      .cloned()
      .ok_or_else(|| CheckpointError::NotFound(token.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn save_then_resume_round_trips() {
    let store = MemoryCheckpointStore::new();
    let state = WorkflowState::from_user_message("topic");

    let token = store.save(&state).await.unwrap();
    let restored = store.resume(&token).await.unwrap();

    assert_eq!(restored, state);
  }

  #[tokio::test]
  async fn unknown_token_is_not_found() {
    let store = MemoryCheckpointStore::new();
    let err = store.resume("missing").await.unwrap_err();
    assert!(matches!(err, CheckpointError::NotFound(_)));
  }
}
