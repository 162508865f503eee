//! Graph assembly with graceful degradation.
//!
//! Construction must always return a runnable graph. The builder walks
//! an ordered list of tiers: the full topology with a durable checkpoint
//! store, the full topology without persistence, and finally a minimal
//! `coordinator -> reporter` graph. Each tier's failure is logged and
//! the next tier is tried; the last tier cannot fail.

use std::path::PathBuf;
use std::sync::Arc;

use larkspur_checkpoint::{CheckpointStore, MemoryCheckpointStore, SqliteCheckpointStore};
use larkspur_llm::ModelRegistry;
use tracing::{info, warn};

use crate::config::WorkflowConfig;
use crate::engine::{Topology, WorkflowGraph};
use crate::error::GraphError;
use crate::events::{ExecutionNotifier, NoopNotifier};

/// The ordered degradation tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
  /// Full topology, checkpoint-backed suspension.
  Durable,
  /// Full topology, suspension without persistence.
  Ephemeral,
  /// Minimal `coordinator -> reporter` topology.
  Minimal,
}

const TIERS: [Tier; 3] = [Tier::Durable, Tier::Ephemeral, Tier::Minimal];

/// Builds a [`WorkflowGraph`], degrading through tiers instead of
/// failing.
pub struct GraphBuilder {
  config: WorkflowConfig,
  models: Arc<ModelRegistry>,
  notifier: Arc<dyn ExecutionNotifier>,
  checkpoint_path: Option<PathBuf>,
  checkpoint_store: Option<Arc<dyn CheckpointStore>>,
}

impl GraphBuilder {
  pub fn new(config: WorkflowConfig, models: Arc<ModelRegistry>) -> Self {
    Self {
      config,
      models,
      notifier: Arc::new(NoopNotifier),
      checkpoint_path: None,
      checkpoint_store: None,
    }
  }

  /// Stream execution events to `notifier`.
  pub fn with_notifier(mut self, notifier: Arc<dyn ExecutionNotifier>) -> Self {
    self.notifier = notifier;
    self
  }

  /// Persist checkpoints in a SQLite database at `path`.
  pub fn with_checkpoint_path(mut self, path: PathBuf) -> Self {
    self.checkpoint_path = Some(path);
    self
  }

  /// Use a caller-provided checkpoint store.
  pub fn with_checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
    self.checkpoint_store = Some(store);
    self
  }

  /// Compile the graph. Never fails: tiers are tried in order and the
  /// minimal tier always succeeds.
  pub async fn build(self) -> WorkflowGraph {
    for tier in TIERS {
      match self.try_build(tier).await {
        Ok(graph) => {
          info!(tier = ?tier, "workflow graph compiled");
          return graph;
        }
        Err(e) => {
          warn!(tier = ?tier, error = %e, "graph tier failed, trying next");
        }
      }
    }

    // The loop always returns at Tier::Minimal; keep a direct fallback
    // anyway so construction is infallible by inspection.
    self.graph(Topology::Minimal, None)
  }

  /// Compile one tier.
  async fn try_build(&self, tier: Tier) -> Result<WorkflowGraph, GraphError> {
    match tier {
      Tier::Durable => {
        let store = self.open_store().await?;
        Ok(self.graph(Topology::Full, Some(store)))
      }
      Tier::Ephemeral => Ok(self.graph(Topology::Full, None)),
      Tier::Minimal => Ok(self.graph(Topology::Minimal, None)),
    }
  }

  /// The durable tier's checkpoint store: caller-provided, SQLite at the
  /// configured path, or in-memory when nothing was configured.
  async fn open_store(&self) -> Result<Arc<dyn CheckpointStore>, GraphError> {
    if let Some(store) = &self.checkpoint_store {
      return Ok(store.clone());
    }
    match &self.checkpoint_path {
      Some(path) => {
        let store = SqliteCheckpointStore::connect(path)
          .await
          .map_err(|e| GraphError::Construction {
            detail: format!("checkpoint store at '{}': {}", path.display(), e),
          })?;
        Ok(Arc::new(store))
      }
      None => Ok(Arc::new(MemoryCheckpointStore::new())),
    }
  }

  fn graph(&self, topology: Topology, checkpoints: Option<Arc<dyn CheckpointStore>>) -> WorkflowGraph {
    WorkflowGraph {
      topology,
      config: self.config.clone(),
      models: self.models.clone(),
      checkpoints,
      notifier: self.notifier.clone(),
    }
  }
}
