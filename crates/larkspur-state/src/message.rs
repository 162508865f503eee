use serde::{Deserialize, Serialize};

/// The speaker category of a dialogue message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
  System,
  User,
  Assistant,
}

/// One turn in the workflow dialogue log.
///
/// `name` attributes the turn to a specific participant (coordinator,
/// planner, feedback, researcher, coder, reporter, or the user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
  pub role: MessageRole,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub content: String,
}

impl Message {
  pub fn system(content: impl Into<String>) -> Self {
    Self {
      role: MessageRole::System,
      name: None,
      content: content.into(),
    }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self {
      role: MessageRole::User,
      name: None,
      content: content.into(),
    }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self {
      role: MessageRole::Assistant,
      name: None,
      content: content.into(),
    }
  }

  /// Attribute this message to a named participant.
  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }
}
