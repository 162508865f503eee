//! Base tool sets.
//!
//! The research workflow treats concrete tool backends (search engines,
//! crawlers, code sandboxes) as deployment configuration. The built-in
//! tools here are the typed surface the workers always see; where no
//! backend is wired in, a tool answers with an explicit "not configured"
//! result instead of failing, so step execution keeps moving.

use std::sync::Arc;

use async_trait::async_trait;
use larkspur_state::Resource;
use serde_json::{Value, json};

use crate::error::ToolError;
use crate::tool::{Tool, WorkerRole};

fn query_arg(arguments: &Value) -> Result<&str, ToolError> {
  arguments
    .get("query")
    .and_then(|v| v.as_str())
    .ok_or_else(|| ToolError::InvalidArguments("expected a string 'query' field".to_string()))
}

/// Web search with a bounded result count.
pub struct WebSearchTool {
  max_results: u32,
}

impl WebSearchTool {
  pub fn new(max_results: u32) -> Self {
    Self { max_results }
  }
}

#[async_trait]
impl Tool for WebSearchTool {
  fn name(&self) -> &str {
    "web_search"
  }

  fn description(&self) -> &str {
    "Search the web and return the most relevant results."
  }

  fn parameters(&self) -> Value {
    json!({
      "type": "object",
      "properties": {
        "query": { "type": "string", "description": "The search query." }
      },
      "required": ["query"]
    })
  }

  async fn call(&self, arguments: Value) -> Result<String, ToolError> {
    let query = query_arg(&arguments)?;
    Ok(format!(
      "No search backend is configured; unable to search for '{}' (limit {} results). \
       Answer from the conversation context instead.",
      query, self.max_results
    ))
  }
}

/// Fetch and extract the readable content of one page.
pub struct CrawlTool;

#[async_trait]
impl Tool for CrawlTool {
  fn name(&self) -> &str {
    "crawl"
  }

  fn description(&self) -> &str {
    "Fetch a URL and return its readable text content."
  }

  fn parameters(&self) -> Value {
    json!({
      "type": "object",
      "properties": {
        "url": { "type": "string", "description": "The URL to fetch." }
      },
      "required": ["url"]
    })
  }

  async fn call(&self, arguments: Value) -> Result<String, ToolError> {
    let url = arguments
      .get("url")
      .and_then(|v| v.as_str())
      .ok_or_else(|| ToolError::InvalidArguments("expected a string 'url' field".to_string()))?;
    Ok(format!(
      "No crawler backend is configured; unable to fetch '{}'.",
      url
    ))
  }
}

/// Sandboxed code execution for processing steps.
pub struct CodeSandboxTool;

#[async_trait]
impl Tool for CodeSandboxTool {
  fn name(&self) -> &str {
    "code_sandbox"
  }

  fn description(&self) -> &str {
    "Execute a code snippet in a sandbox and return its output."
  }

  fn parameters(&self) -> Value {
    json!({
      "type": "object",
      "properties": {
        "code": { "type": "string", "description": "The code to execute." }
      },
      "required": ["code"]
    })
  }

  async fn call(&self, arguments: Value) -> Result<String, ToolError> {
    arguments
      .get("code")
      .and_then(|v| v.as_str())
      .ok_or_else(|| ToolError::InvalidArguments("expected a string 'code' field".to_string()))?;
    Ok("No sandbox backend is configured; describe the computation and its expected result instead.".to_string())
  }
}

/// Look up user-supplied reference material by query.
pub struct RetrieverTool {
  resources: Vec<Resource>,
}

impl RetrieverTool {
  pub fn new(resources: Vec<Resource>) -> Self {
    Self { resources }
  }
}

#[async_trait]
impl Tool for RetrieverTool {
  fn name(&self) -> &str {
    "local_search"
  }

  fn description(&self) -> &str {
    "Search the user-supplied reference documents."
  }

  fn parameters(&self) -> Value {
    json!({
      "type": "object",
      "properties": {
        "query": { "type": "string", "description": "What to look for." }
      },
      "required": ["query"]
    })
  }

  async fn call(&self, arguments: Value) -> Result<String, ToolError> {
    let query = query_arg(&arguments)?;
    let matches: Vec<String> = self
      .resources
      .iter()
      .filter(|r| {
        let query = query.to_lowercase();
        r.title.to_lowercase().contains(&query) || r.description.to_lowercase().contains(&query)
      })
      .map(|r| format!("- {} ({}): {}", r.title, r.uri, r.description))
      .collect();

    if matches.is_empty() {
      Ok(format!("No reference documents matched '{}'.", query))
    } else {
      Ok(matches.join("\n"))
    }
  }
}

/// The fixed base tool set for a worker role.
///
/// The researcher gets retrieval over any user-supplied resources plus
/// search and crawl; the coder gets the code sandbox.
pub fn base_tools(
  role: WorkerRole,
  resources: &[Resource],
  max_search_results: u32,
) -> Vec<Arc<dyn Tool>> {
  match role {
    WorkerRole::Researcher => {
      let mut tools: Vec<Arc<dyn Tool>> = Vec::new();
      if !resources.is_empty() {
        tools.push(Arc::new(RetrieverTool::new(resources.to_vec())));
      }
      tools.push(Arc::new(WebSearchTool::new(max_search_results)));
      tools.push(Arc::new(CrawlTool));
      tools
    }
    WorkerRole::Coder => vec![Arc::new(CodeSandboxTool)],
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn retriever_matches_on_title_and_description() {
    let tool = RetrieverTool::new(vec![Resource {
      uri: "file:///notes.md".to_string(),
      title: "EV adoption notes".to_string(),
      description: "sales figures for norway".to_string(),
    }]);

    let hit = tool.call(json!({ "query": "norway" })).await.unwrap();
    assert!(hit.contains("EV adoption notes"));

    let miss = tool.call(json!({ "query": "denmark" })).await.unwrap();
    assert!(miss.contains("No reference documents matched"));
  }

  #[tokio::test]
  async fn missing_arguments_are_rejected() {
    let tool = WebSearchTool::new(3);
    let err = tool.call(json!({})).await.unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));
  }

  #[test]
  fn researcher_base_set_includes_retriever_only_with_resources() {
    let with = base_tools(
      WorkerRole::Researcher,
      &[Resource {
        uri: "u".to_string(),
        title: "t".to_string(),
        description: "d".to_string(),
      }],
      3,
    );
    assert_eq!(with[0].name(), "local_search");

    let without = base_tools(WorkerRole::Researcher, &[], 3);
    assert!(without.iter().all(|t| t.name() != "local_search"));
  }

  #[test]
  fn coder_base_set_is_the_sandbox() {
    let tools = base_tools(WorkerRole::Coder, &[], 3);
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name(), "code_sandbox");
  }
}
