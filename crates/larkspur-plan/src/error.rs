//! Plan errors.

/// Errors that can occur while parsing or validating a plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
  /// The plan text was not valid JSON, even after repair.
  #[error("plan is not valid JSON: {0}")]
  InvalidJson(#[from] serde_json::Error),

  /// The plan JSON was parseable but not an object.
  #[error("plan JSON must be an object, got {found}")]
  NotAnObject { found: &'static str },
}
