//! Step classification.
//!
//! One classifier drives both worker dispatch and deadline selection so
//! the two can never disagree about what a step is. Matching is
//! case-insensitive substring search over the step title and description,
//! against fixed bilingual keyword sets.

use crate::plan::StepType;

/// Summary and consolidation work. Routed to the researcher and granted
/// the extended deadline.
const SUMMARY_KEYWORDS: &[&str] = &[
  "总结",
  "汇总",
  "综合",
  "概述",
  "整理",
  "呈现",
  "summary",
  "summarize",
  "present",
  "conclude",
];

/// Arithmetic a language model can do inline, without a sandbox.
const SIMPLE_ARITHMETIC_KEYWORDS: &[&str] = &[
  "计算",
  "比例",
  "倍数",
  "百分比",
  "对比",
  "相比",
  "calculate",
  "ratio",
  "compare",
  "percentage",
];

/// Work that needs real code execution.
const COMPLEX_PROCESSING_KEYWORDS: &[&str] = &[
  "算法",
  "编程",
  "文件",
  "图表",
  "绘图",
  "数据分析",
  "统计",
  "algorithm",
  "programming",
  "file",
  "chart",
  "plot",
  "data analysis",
  "statistics",
];

/// The category of a step, in classification precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCategory {
  /// Summary/consolidation keywords matched.
  Summary,
  /// Simple arithmetic keywords matched without complex-processing ones.
  SimpleArithmetic,
  /// Declared research step.
  Research,
  /// Declared processing step with complex-processing keywords.
  ComplexProcessing,
  /// Declared processing step without complex-processing keywords.
  ProcessingDefault,
  /// No step type available.
  Unknown,
}

impl TaskCategory {
  /// Whether steps of this category get the extended execution deadline.
  pub fn extended_deadline(self) -> bool {
    self == TaskCategory::Summary
  }
}

/// Classify a step by its title, description, and declared type.
///
/// Precedence: summary, then simple arithmetic (unless complex keywords
/// are also present), then the declared research type, then complex
/// processing, then default processing. The bias favors the research
/// worker: only declared processing steps with complex-processing
/// keywords reach the code-execution worker.
pub fn classify(title: &str, description: &str, step_type: Option<StepType>) -> TaskCategory {
  let text = format!("{} {}", title.to_lowercase(), description.to_lowercase());
  let matches = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

  let is_summary = matches(SUMMARY_KEYWORDS);
  let is_simple_arithmetic = matches(SIMPLE_ARITHMETIC_KEYWORDS);
  let is_complex_processing = matches(COMPLEX_PROCESSING_KEYWORDS);

  if is_summary {
    TaskCategory::Summary
  } else if is_simple_arithmetic && !is_complex_processing {
    TaskCategory::SimpleArithmetic
  } else {
    match step_type {
      Some(StepType::Research) => TaskCategory::Research,
      Some(StepType::Processing) if is_complex_processing => TaskCategory::ComplexProcessing,
      Some(StepType::Processing) => TaskCategory::ProcessingDefault,
      None => TaskCategory::Unknown,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn summary_beats_processing_type() {
    let category = classify("总结研究发现", "", Some(StepType::Processing));
    assert_eq!(category, TaskCategory::Summary);
  }

  #[test]
  fn complex_coding_goes_to_complex_processing() {
    let category = classify("编写算法并绘图", "", Some(StepType::Processing));
    assert_eq!(category, TaskCategory::ComplexProcessing);
  }

  #[test]
  fn simple_arithmetic_without_complex_keywords() {
    let category = classify(
      "Calculate the growth ratio",
      "compare year over year numbers",
      Some(StepType::Processing),
    );
    assert_eq!(category, TaskCategory::SimpleArithmetic);
  }

  #[test]
  fn arithmetic_with_complex_keywords_is_not_simple() {
    let category = classify(
      "Calculate statistics",
      "run a data analysis over the file",
      Some(StepType::Processing),
    );
    assert_eq!(category, TaskCategory::ComplexProcessing);
  }

  #[test]
  fn research_type_without_keywords() {
    let category = classify("Find sources", "look things up", Some(StepType::Research));
    assert_eq!(category, TaskCategory::Research);
  }

  #[test]
  fn processing_without_keywords_defaults() {
    let category = classify("Tabulate", "", Some(StepType::Processing));
    assert_eq!(category, TaskCategory::ProcessingDefault);
  }

  #[test]
  fn missing_step_type_is_unknown() {
    assert_eq!(classify("Misc", "", None), TaskCategory::Unknown);
  }

  #[test]
  fn matching_is_case_insensitive() {
    let category = classify("SUMMARIZE findings", "", Some(StepType::Research));
    assert_eq!(category, TaskCategory::Summary);
  }

  #[test]
  fn only_summary_gets_extended_deadline() {
    assert!(TaskCategory::Summary.extended_deadline());
    assert!(!TaskCategory::ComplexProcessing.extended_deadline());
    assert!(!TaskCategory::Research.extended_deadline());
  }
}
