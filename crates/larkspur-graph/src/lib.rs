//! Larkspur Graph
//!
//! The research workflow orchestration engine: a fixed-topology state
//! machine that coordinates a planner, a researcher, a coder, and a
//! reporter over a shared blackboard.
//!
//! ```text
//! GraphBuilder ──► WorkflowGraph::run ──► nodes ──► StateDelta
//!      │                │                             │
//!      │                ├─► routers pick the next node
//!      │                ├─► human feedback gate suspends via checkpoint
//!      │                └─► ExecutionNotifier streams progress
//!      │
//!      └─► degradation tiers: durable → ephemeral → minimal
//! ```
//!
//! Failure containment: step timeouts and worker errors become step
//! results, tool discovery failures degrade to base tools, construction
//! failures degrade tiers, and routers are total. The only hard stops
//! are a non-research request and an unparseable first plan.

mod builder;
mod config;
mod engine;
mod error;
mod events;
pub mod nodes;
mod routing;

pub use builder::GraphBuilder;
pub use config::WorkflowConfig;
pub use engine::{RunOutcome, Topology, WorkflowGraph};
pub use error::GraphError;
pub use events::{ChannelNotifier, ExecutionEvent, ExecutionNotifier, NoopNotifier};
pub use routing::{
  NodeId, from_coordinator, from_human_feedback, from_planner, from_research_team,
};
