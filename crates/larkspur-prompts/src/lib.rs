//! Larkspur Prompts
//!
//! Named prompt templates for every model-backed node, rendered with
//! minijinja against the workflow state. Rendering produces the message
//! list for a model invocation: the rendered system prompt followed by
//! the dialogue log so far.
//!
//! The engine treats rendering as pure; a template that fails to render
//! is a programming error surfaced as [`PromptError`], which callers
//! guard by falling back to a minimal task message.

mod templates;

use larkspur_state::{Message, WorkflowState};
use minijinja::Environment;
use serde::Serialize;

/// Errors raised while rendering a prompt template.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
  #[error("unknown prompt template '{0}'")]
  UnknownTemplate(String),

  #[error("failed to render prompt template")]
  Render(#[from] minijinja::Error),
}

/// Per-invocation values that are not part of the workflow state.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemplateVars {
  /// Upper bound on the number of steps the planner may emit.
  pub max_step_num: u32,
}

impl Default for TemplateVars {
  fn default() -> Self {
    Self { max_step_num: 3 }
  }
}

#[derive(Serialize)]
struct TemplateContext<'a> {
  locale: &'a str,
  research_topic: &'a str,
  max_step_num: u32,
  background_investigation_results: Option<&'a str>,
  resources: &'a [larkspur_state::Resource],
}

/// Render the named template and prepend it to the dialogue log.
pub fn render(
  name: &str,
  state: &WorkflowState,
  vars: TemplateVars,
) -> Result<Vec<Message>, PromptError> {
  let source = templates::source(name)
    .ok_or_else(|| PromptError::UnknownTemplate(name.to_string()))?;

  let mut env = Environment::new();
  env.add_template(name, source)?;

  let context = TemplateContext {
    locale: &state.locale,
    research_topic: &state.research_topic,
    max_step_num: vars.max_step_num,
    background_investigation_results: state.background_investigation_results.as_deref(),
    resources: &state.resources,
  };

  let system = env.get_template(name)?.render(&context)?;

  let mut messages = Vec::with_capacity(state.messages.len() + 1);
  messages.push(Message::system(system));
  messages.extend(state.messages.iter().cloned());
  Ok(messages)
}

/// Render the named template into a bare system prompt, without the
/// dialogue log. Used by nodes that assemble their own message list.
pub fn render_system(
  name: &str,
  state: &WorkflowState,
  vars: TemplateVars,
) -> Result<Message, PromptError> {
  let mut messages = render(name, state, vars)?;
  Ok(messages.remove(0))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_all_known_templates() {
    let state = WorkflowState::from_user_message("solar panel efficiency");
    for name in ["coordinator", "planner", "researcher", "coder", "reporter"] {
      let messages = render(name, &state, TemplateVars::default()).unwrap();
      assert_eq!(messages[0].role, larkspur_state::MessageRole::System);
      // System prompt first, then the seeded user message.
      assert_eq!(messages.len(), 2);
    }
  }

  #[test]
  fn unknown_template_is_an_error() {
    let state = WorkflowState::default();
    let err = render("no-such-template", &state, TemplateVars::default()).unwrap_err();
    assert!(matches!(err, PromptError::UnknownTemplate(_)));
  }

  #[test]
  fn planner_template_interpolates_state() {
    let mut state = WorkflowState::from_user_message("ev adoption in norway");
    state.background_investigation_results = Some("EV sales doubled in 2024.".to_string());

    let messages = render("planner", &state, TemplateVars { max_step_num: 5 }).unwrap();
    let system = &messages[0].content;

    assert!(system.contains("ev adoption in norway"));
    assert!(system.contains("EV sales doubled in 2024."));
    assert!(system.contains('5'));
  }
}
