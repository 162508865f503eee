//! Model invocation errors.

/// Errors that can occur while invoking a model.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
  /// The HTTP request itself failed.
  #[error("model request failed")]
  Http(#[from] reqwest::Error),

  /// The endpoint answered with a non-success status.
  #[error("model endpoint returned {status}: {body}")]
  Api { status: u16, body: String },

  /// The response carried no choices.
  #[error("model response contained no choices")]
  EmptyResponse,

  /// No client is configured for the requested role.
  #[error("no model configured for role '{0}'")]
  MissingModel(String),
}
