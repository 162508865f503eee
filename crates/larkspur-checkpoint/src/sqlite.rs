use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use larkspur_state::WorkflowState;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use tracing::debug;

use crate::{CheckpointError, CheckpointStore};

/// SQLite-backed checkpoint store.
pub struct SqliteCheckpointStore {
  pool: SqlitePool,
}

impl SqliteCheckpointStore {
  /// Open (or create) the checkpoint database at `path` and ensure the
  /// schema exists.
  pub async fn connect(path: &Path) -> Result<Self, CheckpointError> {
    let options = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    let store = Self { pool };
    store.ensure_schema().await?;
    Ok(store)
  }

  /// Create a store from an existing pool. The schema must already exist
  /// or be created by calling [`Self::ensure_schema`].
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Create the checkpoints table if it is missing.
  pub async fn ensure_schema(&self) -> Result<(), CheckpointError> {
    sqlx::query(
      r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                token TEXT PRIMARY KEY,
                state TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
    )
    .execute(&self.pool)
    .await?;
    Ok(())
  }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
  async fn save(&self, state: &WorkflowState) -> Result<String, CheckpointError> {
    let token = uuid::Uuid::new_v4().to_string();
    let snapshot = serde_json::to_string(state)?;

    sqlx::query(
      r#"
            INSERT INTO checkpoints (token, state, created_at)
            VALUES (?, ?, ?)
            "#,
    )
    .bind(&token)
    .bind(&snapshot)
    .bind(Utc::now().to_rfc3339())
    .execute(&self.pool)
    .await?;

    debug!(token = %token, "checkpoint saved");
    Ok(token)
  }

  async fn resume(&self, token: &str) -> Result<WorkflowState, CheckpointError> {
    let row: Option<(String,)> = sqlx::query_as(
      r#"
            SELECT state FROM checkpoints WHERE token = ?
            "#,
    )
    .bind(token)
    .fetch_optional(&self.pool)
    .await?;

    let (snapshot,) = row.ok_or_else(|| CheckpointError::NotFound(token.to_string()))?;
    let state = serde_json::from_str(&snapshot)?;

    debug!(token = %token, "checkpoint restored");
    Ok(state)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use larkspur_plan::{Plan, PlanDraft};

  async fn open_store(dir: &tempfile::TempDir) -> SqliteCheckpointStore {
    SqliteCheckpointStore::connect(&dir.path().join("checkpoints.db"))
      .await
      .unwrap()
  }

  #[tokio::test]
  async fn save_then_resume_restores_state_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    let mut state = WorkflowState::from_user_message("ev adoption");
    state.plan_iterations = 1;
    state.current_plan = Some(PlanDraft::Plan(Plan {
      locale: "en-US".to_string(),
      has_enough_context: false,
      thought: "gather sales data".to_string(),
      title: "EV adoption".to_string(),
      steps: Vec::new(),
    }));

    let token = store.save(&state).await.unwrap();
    let restored = store.resume(&token).await.unwrap();

    assert_eq!(restored, state);
  }

  #[tokio::test]
  async fn tokens_are_unique_per_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;
    let state = WorkflowState::default();

    let first = store.save(&state).await.unwrap();
    let second = store.save(&state).await.unwrap();
    assert_ne!(first, second);
  }

  #[tokio::test]
  async fn unknown_token_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir).await;

    let err = store.resume("nope").await.unwrap_err();
    assert!(matches!(err, CheckpointError::NotFound(_)));
  }
}
