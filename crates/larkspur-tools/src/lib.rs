//! Larkspur Tools
//!
//! Tool provisioning for step-executing workers. Each worker role has a
//! fixed base tool set; auxiliary tool servers may contribute more tools
//! scoped to a role. Discovery failures never abort step execution: the
//! worker silently falls back to its base tools.

mod builtin;
mod discovery;
mod error;
mod tool;

pub use builtin::{CodeSandboxTool, CrawlTool, RetrieverTool, WebSearchTool, base_tools};
pub use discovery::{ToolServerConfig, ToolServerRegistry, provision_tools};
pub use error::ToolError;
pub use tool::{Tool, WorkerRole};
