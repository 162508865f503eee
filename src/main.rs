use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use larkspur_graph::{
  ChannelNotifier, ExecutionEvent, GraphBuilder, RunOutcome, WorkflowConfig, WorkflowGraph,
};
use larkspur_llm::{ChatModel, ModelRegistry, OpenAiChatModel, OpenAiConfig};
use larkspur_state::WorkflowState;

/// Larkspur - a deep research assistant built on a durable workflow graph
#[derive(Parser)]
#[command(name = "larkspur")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.larkspur)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a research workflow for a user message
  Run {
    /// The request to research
    message: String,

    /// Accept the generated plan without review
    #[arg(long)]
    auto_accept: bool,

    /// Skip the background investigation pass
    #[arg(long)]
    no_background_investigation: bool,

    /// Plan revisions to accept before reporting with what exists
    #[arg(long, default_value_t = 1)]
    max_plan_iterations: u32,
  },

  /// Resume a suspended run with a plan-review feedback value
  Resume {
    /// The checkpoint token printed at suspension
    token: String,

    /// Feedback: "accepted", "edit_plan", or "[EDIT_PLAN]{...}"
    feedback: String,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("larkspur=info")),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .unwrap_or_else(|| PathBuf::from("."))
      .join(".larkspur")
  });
  std::fs::create_dir_all(&data_dir)
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

  match cli.command {
    Some(Commands::Run {
      message,
      auto_accept,
      no_background_investigation,
      max_plan_iterations,
    }) => {
      let mut config = WorkflowConfig::default();
      config.max_plan_iterations = max_plan_iterations;

      let graph = build_graph(config, &data_dir).await?;

      let mut state = WorkflowState::from_user_message(message);
      state.auto_accepted_plan = auto_accept;
      state.enable_background_investigation = !no_background_investigation;

      let outcome = graph.run(state, CancellationToken::new()).await?;
      report_outcome(outcome);
    }
    Some(Commands::Resume { token, feedback }) => {
      let graph = build_graph(WorkflowConfig::default(), &data_dir).await?;
      let outcome = graph
        .resume(&token, &feedback, CancellationToken::new())
        .await?;
      report_outcome(outcome);
    }
    None => {
      println!("larkspur - use --help to see available commands");
    }
  }

  Ok(())
}

/// Compile the workflow graph with models from the environment and a
/// progress stream printed to stderr.
async fn build_graph(config: WorkflowConfig, data_dir: &std::path::Path) -> Result<WorkflowGraph> {
  let base_url = std::env::var("LARKSPUR_BASE_URL")
    .context("LARKSPUR_BASE_URL is not set (OpenAI-compatible endpoint base)")?;
  let model = std::env::var("LARKSPUR_MODEL").context("LARKSPUR_MODEL is not set")?;
  let api_key = std::env::var("LARKSPUR_API_KEY").ok();

  let models = Arc::new(ModelRegistry::new(move |_role| {
    let client = OpenAiChatModel::new(OpenAiConfig {
      base_url: base_url.clone(),
      api_key: api_key.clone(),
      model: model.clone(),
    })?;
    Ok(Arc::new(client) as Arc<dyn ChatModel>)
  }));

  let (sender, mut receiver) = mpsc::unbounded_channel();
  tokio::spawn(async move {
    while let Some(event) = receiver.recv().await {
      match event {
        ExecutionEvent::MessageAppended { message, .. } => {
          let name = message.name.unwrap_or_else(|| "assistant".to_string());
          eprintln!("[{}] {}", name, message.content);
        }
        ExecutionEvent::WorkflowSuspended { token, .. } => match token {
          Some(token) => eprintln!(
            "Plan review required. Resume with: larkspur resume {} <feedback>",
            token
          ),
          None => eprintln!("Plan review required, but no checkpoint store is available."),
        },
        _ => {}
      }
    }
  });

  let graph = GraphBuilder::new(config, models)
    .with_checkpoint_path(data_dir.join("checkpoints.db"))
    .with_notifier(Arc::new(ChannelNotifier::new(sender)))
    .build()
    .await;

  Ok(graph)
}

fn report_outcome(outcome: RunOutcome) {
  match outcome {
    RunOutcome::Completed { state } => {
      if state.final_report.is_empty() {
        if let Some(message) = state.messages.last() {
          println!("{}", message.content);
        }
      } else {
        println!("{}", state.final_report);
      }
    }
    RunOutcome::Suspended { token, .. } => match token {
      Some(token) => println!("suspended: {}", token),
      None => println!("suspended (not durable)"),
    },
  }
}
