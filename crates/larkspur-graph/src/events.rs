//! Execution events and notifiers for observability.
//!
//! Events are emitted while a workflow runs so consumers can stream
//! dialogue to a caller, persist progress, or drive a UI.

use larkspur_state::Message;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::routing::NodeId;

/// Events emitted during a workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecutionEvent {
  /// A node has started executing.
  NodeStarted { run_id: String, node: NodeId },

  /// A node has finished and its delta was merged.
  NodeCompleted { run_id: String, node: NodeId },

  /// A node appended a dialogue message.
  MessageAppended { run_id: String, message: Message },

  /// The run suspended at the human-feedback gate. `token` is absent
  /// when no checkpoint store is attached; the caller must then hold the
  /// returned state to resume.
  WorkflowSuspended {
    run_id: String,
    token: Option<String>,
  },

  /// The run reached the terminal state.
  WorkflowCompleted { run_id: String },
}

/// Trait for receiving execution events.
///
/// The engine calls `notify` for each event; implementations decide what
/// to do with them (stream, persist, log, ignore).
pub trait ExecutionNotifier: Send + Sync {
  fn notify(&self, event: ExecutionEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl ExecutionNotifier for NoopNotifier {
  fn notify(&self, _event: ExecutionEvent) {
    // Intentionally empty
  }
}

/// A notifier that sends events to an unbounded channel.
///
/// Unbounded so a slow consumer never stalls the engine; event volume is
/// a handful per node, so memory growth is not a concern in practice.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<ExecutionEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<ExecutionEvent>) -> Self {
    Self { sender }
  }
}

impl ExecutionNotifier for ChannelNotifier {
  fn notify(&self, event: ExecutionEvent) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
