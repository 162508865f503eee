//! Larkspur State
//!
//! The shared blackboard threaded through every node of a research
//! workflow. Nodes never mutate [`WorkflowState`] directly: each node
//! returns a [`StateDelta`] and the engine merges it with
//! [`WorkflowState::apply`]. Message and observation logs are append-only
//! under that merge; scalar fields are replaced only when a delta carries
//! them.

mod delta;
mod message;
mod state;

pub use delta::StateDelta;
pub use message::{Message, MessageRole};
pub use state::{Resource, WorkflowState};
