//! Tool errors.

/// Errors raised by tool invocation or tool-server discovery.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
  /// The tool-server request failed.
  #[error("tool server request failed")]
  Http(#[from] reqwest::Error),

  /// The tool server answered with a non-success status.
  #[error("tool server returned {status}: {body}")]
  Server { status: u16, body: String },

  /// The tool was called with arguments it cannot interpret.
  #[error("invalid tool arguments: {0}")]
  InvalidArguments(String),
}
