//! Larkspur LLM
//!
//! The model invocation collaborator. Nodes talk to language models
//! through the [`ChatModel`] trait: an ordered list of role-tagged
//! messages plus an optional bound tool set in, plain text and
//! zero-or-more tool invocation requests out.
//!
//! [`ModelRegistry`] is the process-wide client cache: created at process
//! start, populated lazily per model role, read thereafter, torn down on
//! drop. [`OpenAiChatModel`] is the HTTP client for OpenAI-compatible
//! chat-completions endpoints. [`repair_json`] is the best-effort repair
//! pass applied to model output before any JSON parse; callers always
//! guard the subsequent parse.

mod error;
mod model;
mod openai;
mod registry;
mod repair;

pub use error::LlmError;
pub use model::{ChatModel, ChatResponse, ModelRole, ToolCall, ToolSpec};
pub use openai::{OpenAiChatModel, OpenAiConfig};
pub use registry::ModelRegistry;
pub use repair::repair_json;
