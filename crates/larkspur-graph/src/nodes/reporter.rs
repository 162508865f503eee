//! Reporter node.
//!
//! Synthesizes the collected observations into the final report under a
//! deadline. Whatever happens - timeout, invocation failure, empty
//! output - the run ends with a non-empty `final_report` that names the
//! task and accounts for the data that was collected.

use larkspur_llm::{ModelRegistry, ModelRole};
use larkspur_prompts::TemplateVars;
use larkspur_state::{Message, StateDelta, WorkflowState};
use tracing::{info, instrument, warn};

use crate::config::WorkflowConfig;
use crate::nodes::NodeOutcome;
use crate::routing::NodeId;

/// The fixed report structure and citation convention.
const REPORT_INSTRUCTION: &str = "# Report Writing Guidance\n\n\
   ## Structure\n\
   1. **Executive summary** - brief overview of the key findings\n\
   2. **Introduction** - background and research objective\n\
   3. **Methodology** - how the research was carried out\n\
   4. **Findings** - detailed analysis and findings\n\
   5. **Discussion** - interpretation and implications\n\
   6. **Conclusion** - summary and future directions\n\n\
   ## Citations\n\
   - No inline citations in the body\n\
   - A reference section at the end using link format: - [Source Title](url)\n\
   - A blank line between reference entries\n\n\
   ## Visual elements\n\
   - Use markdown tables for data comparison\n\
   - Use bullet lists for key insights\n\
   - Organize content with clear headings";

#[instrument(name = "reporter", skip_all)]
pub async fn run(
  state: &WorkflowState,
  config: &WorkflowConfig,
  models: &ModelRegistry,
) -> NodeOutcome {
  let (title, thought) = match state.current_plan.as_ref().and_then(|draft| draft.as_plan()) {
    Some(plan) => (plan.title.clone(), plan.thought.clone()),
    None => (state.research_topic.clone(), String::new()),
  };

  let mut messages = match larkspur_prompts::render_system("reporter", state, TemplateVars::default())
  {
    Ok(system) => vec![system],
    Err(e) => {
      warn!(error = %e, "reporter template failed, using a minimal prompt");
      vec![Message::system(
        "You are the reporter of a deep research assistant.",
      )]
    }
  };
  messages.push(Message::user(format!(
    "# Research Requirements\n\n## Task\n\n{}\n\n## Description\n\n{}",
    title, thought
  )));
  messages.push(Message::user(format!(
    "{}\n\n## Available research data\n\
     You have {} research observations to support the analysis. Integrate \
     all of them and keep every reference they carry.",
    REPORT_INSTRUCTION,
    state.observations.len()
  )));
  for (i, observation) in state.observations.iter().enumerate() {
    if !observation.trim().is_empty() {
      messages.push(Message::user(format!(
        "**Research Data {}**: {}",
        i + 1,
        observation
      )));
    }
  }

  info!(
    observations = state.observations.len(),
    deadline_secs = config.report_timeout.as_secs(),
    "generating final report"
  );

  let report = match models.get(ModelRole::Reporter) {
    Err(e) => degraded_report(
      &title,
      &state.observations,
      &format!("the reporting model is unavailable: {}", e),
    ),
    Ok(model) => {
      match tokio::time::timeout(config.report_timeout, model.chat(&messages, &[])).await {
        Ok(Ok(response)) if !response.content.trim().is_empty() => response.content,
        Ok(Ok(_)) => degraded_report(
          &title,
          &state.observations,
          "the reporting model returned empty output",
        ),
        Ok(Err(e)) => degraded_report(
          &title,
          &state.observations,
          &format!("report generation failed: {}", e),
        ),
        Err(_) => degraded_report(
          &title,
          &state.observations,
          &format!(
            "report generation timed out after {} seconds",
            config.report_timeout.as_secs()
          ),
        ),
      }
    }
  };

  NodeOutcome {
    delta: StateDelta {
      messages: vec![Message::assistant(report.clone()).named("reporter")],
      final_report: Some(report),
      ..StateDelta::default()
    },
    goto: Some(NodeId::End),
  }
}

/// The fallback report: names the task, enumerates what was collected,
/// and states the failure condition.
fn degraded_report(title: &str, observations: &[String], failure: &str) -> String {
  warn!(failure = %failure, "producing degraded report");

  let mut report = format!(
    "# Research Report (degraded)\n\n\
     ## Task\n\n{}\n\n\
     ## What happened\n\n\
     The full report could not be generated: {}.\n\n\
     ## Collected findings\n\n",
    title, failure
  );

  if observations.is_empty() {
    report.push_str("No research observations were collected.\n");
  } else {
    for (i, observation) in observations.iter().enumerate() {
      let mut line: String = observation.chars().take(200).collect();
      if line.len() < observation.len() {
        line.push_str("...");
      }
      report.push_str(&format!("- Finding {}: {}\n", i + 1, line));
    }
  }

  report.push_str(
    "\nRe-running the task, simplifying the research question, or raising \
     the report deadline may allow a complete report.",
  );
  report
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn degraded_report_names_task_and_findings() {
    let observations = vec!["finding one".to_string(), "finding two".to_string()];
    let report = degraded_report("EV adoption", &observations, "report generation timed out");

    assert!(report.contains("EV adoption"));
    assert!(report.contains("timed out"));
    assert!(report.contains("Finding 1"));
    assert!(report.contains("Finding 2"));
  }

  #[test]
  fn degraded_report_handles_no_observations() {
    let report = degraded_report("T", &[], "model unavailable");
    assert!(report.contains("No research observations were collected"));
  }
}
