//! Auxiliary tool-server discovery.
//!
//! Deployments can register HTTP tool servers that contribute extra
//! tools to specific worker roles. Discovery is best-effort: any failure
//! (connection error, bad payload, misconfiguration) is logged and the
//! worker keeps its base tool set.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::tool::{Tool, WorkerRole};

/// One auxiliary tool server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolServerConfig {
  pub name: String,
  /// Base URL; the server must expose `GET /tools` and `POST /call`.
  pub url: String,
  /// Tools to take from this server; empty means none.
  #[serde(default)]
  pub enabled_tools: Vec<String>,
  /// Worker roles that receive this server's tools.
  #[serde(default)]
  pub add_to_roles: Vec<String>,
}

/// The configured set of auxiliary tool servers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolServerRegistry {
  #[serde(default)]
  pub servers: Vec<ToolServerConfig>,
}

impl ToolServerRegistry {
  /// Servers that contribute tools to `role`.
  fn servers_for(&self, role: WorkerRole) -> Vec<&ToolServerConfig> {
    self
      .servers
      .iter()
      .filter(|s| !s.enabled_tools.is_empty() && s.add_to_roles.iter().any(|r| r == role.as_str()))
      .collect()
  }
}

#[derive(Debug, Deserialize)]
struct AdvertisedTool {
  name: String,
  #[serde(default)]
  description: String,
  #[serde(default = "default_parameters")]
  parameters: Value,
}

fn default_parameters() -> Value {
  json!({ "type": "object", "properties": {} })
}

/// A tool served by an auxiliary tool server.
struct RemoteTool {
  base_url: String,
  http: reqwest::Client,
  advertised: AdvertisedTool,
  description: String,
}

impl RemoteTool {
  fn new(server: &ToolServerConfig, http: reqwest::Client, advertised: AdvertisedTool) -> Self {
    let description = format!("Powered by '{}'. {}", server.name, advertised.description);
    Self {
      base_url: server.url.trim_end_matches('/').to_string(),
      http,
      advertised,
      description,
    }
  }
}

#[async_trait]
impl Tool for RemoteTool {
  fn name(&self) -> &str {
    &self.advertised.name
  }

  fn description(&self) -> &str {
    &self.description
  }

  fn parameters(&self) -> Value {
    self.advertised.parameters.clone()
  }

  async fn call(&self, arguments: Value) -> Result<String, ToolError> {
    let response = self
      .http
      .post(format!("{}/call", self.base_url))
      .json(&json!({ "name": self.advertised.name, "arguments": arguments }))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ToolError::Server {
        status: status.as_u16(),
        body,
      });
    }

    Ok(response.text().await?)
  }
}

/// Fetch the tools one server advertises for a role.
async fn discover_from_server(
  server: &ToolServerConfig,
  http: reqwest::Client,
) -> Result<Vec<Arc<dyn Tool>>, ToolError> {
  let response = http
    .get(format!("{}/tools", server.url.trim_end_matches('/')))
    .send()
    .await?;

  let status = response.status();
  if !status.is_success() {
    let body = response.text().await.unwrap_or_default();
    return Err(ToolError::Server {
      status: status.as_u16(),
      body,
    });
  }

  let advertised: Vec<AdvertisedTool> = response.json().await?;
  Ok(
    advertised
      .into_iter()
      .filter(|t| server.enabled_tools.iter().any(|name| name == &t.name))
      .map(|t| Arc::new(RemoteTool::new(server, http.clone(), t)) as Arc<dyn Tool>)
      .collect(),
  )
}

/// Assemble the tool set for a worker: base tools plus whatever the
/// configured servers contribute for the role.
///
/// Never fails: a server that cannot be reached or answers garbage is
/// skipped with a warning and the base set stands.
pub async fn provision_tools(
  role: WorkerRole,
  base: Vec<Arc<dyn Tool>>,
  registry: &ToolServerRegistry,
) -> Vec<Arc<dyn Tool>> {
  let servers = registry.servers_for(role);
  if servers.is_empty() {
    return base;
  }

  let http = match reqwest::Client::builder().build() {
    Ok(http) => http,
    Err(e) => {
      warn!(role = %role, error = %e, "tool discovery unavailable, using base tools");
      return base;
    }
  };

  let discoveries = join_all(
    servers
      .iter()
      .map(|server| discover_from_server(server, http.clone())),
  )
  .await;

  let mut tools = base;
  for (server, discovered) in servers.iter().zip(discoveries) {
    match discovered {
      Ok(remote) => {
        debug!(
          role = %role,
          server = %server.name,
          count = remote.len(),
          "discovered auxiliary tools"
        );
        tools.extend(remote);
      }
      Err(e) => {
        warn!(
          role = %role,
          server = %server.name,
          error = %e,
          "tool discovery failed, continuing with base tools"
        );
      }
    }
  }
  tools
}
