use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::LlmError;
use crate::model::{ChatModel, ModelRole};

type ModelFactory = dyn Fn(ModelRole) -> Result<Arc<dyn ChatModel>, LlmError> + Send + Sync;

/// Process-wide cache of model clients, keyed by role.
///
/// Lifecycle: created once at process start, populated lazily the first
/// time each role is requested, read-only afterwards, dropped at process
/// shutdown. Initialization is at-most-once per role; the write lock is
/// held only during client construction.
pub struct ModelRegistry {
  factory: Box<ModelFactory>,
  clients: RwLock<HashMap<ModelRole, Arc<dyn ChatModel>>>,
}

impl ModelRegistry {
  /// Create a registry that builds clients on demand with `factory`.
  pub fn new<F>(factory: F) -> Self
  where
    F: Fn(ModelRole) -> Result<Arc<dyn ChatModel>, LlmError> + Send + Sync + 'static,
  {
    Self {
      factory: Box::new(factory),
      clients: RwLock::new(HashMap::new()),
    }
  }

  /// Create a registry that serves the same client for every role.
  pub fn with_model(model: Arc<dyn ChatModel>) -> Self {
    Self::new(move |_| Ok(model.clone()))
  }

  /// Get the client for a role, constructing it on first use.
  pub fn get(&self, role: ModelRole) -> Result<Arc<dyn ChatModel>, LlmError> {
    if let Some(client) = self
      .clients
      .read()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .get(&role)
    {
      return Ok(client.clone());
    }

    let mut clients = self
      .clients
      .write()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    // Another caller may have won the race while we waited for the lock.
    if let Some(client) = clients.get(&role) {
      return Ok(client.clone());
    }

    debug!(role = %role, "constructing model client");
    let client = (self.factory)(role)?;
    clients.insert(role, client.clone());
    Ok(client)
  }
}
