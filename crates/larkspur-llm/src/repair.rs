//! Best-effort JSON repair for model output.
//!
//! Models wrap JSON in prose and code fences, and sometimes truncate the
//! trailing braces. This pass extracts the outermost object and balances
//! its braces. It never guarantees valid JSON; callers must still guard
//! the parse.

/// Extract and repair the JSON object embedded in `text`.
///
/// Returns the input trimmed if no `{` is found at all.
pub fn repair_json(text: &str) -> String {
  let text = strip_code_fences(text.trim());

  let Some(start) = text.find('{') else {
    return text.to_string();
  };
  let candidate = &text[start..];

  // Walk the candidate counting brace depth outside string literals.
  let mut depth: i32 = 0;
  let mut in_string = false;
  let mut escaped = false;
  let mut end = None;

  for (i, c) in candidate.char_indices() {
    if escaped {
      escaped = false;
      continue;
    }
    match c {
      '\\' if in_string => escaped = true,
      '"' => in_string = !in_string,
      '{' if !in_string => depth += 1,
      '}' if !in_string => {
        depth -= 1;
        if depth == 0 {
          end = Some(i);
          break;
        }
      }
      _ => {}
    }
  }

  match end {
    Some(end) => candidate[..=end].to_string(),
    None => {
      // Truncated output: close what is open.
      let mut repaired = candidate.to_string();
      if in_string {
        repaired.push('"');
      }
      for _ in 0..depth.max(0) {
        repaired.push('}');
      }
      repaired
    }
  }
}

fn strip_code_fences(text: &str) -> &str {
  let text = text.trim();
  let Some(rest) = text.strip_prefix("```") else {
    return text;
  };
  // Drop the language tag line, then the closing fence.
  let rest = match rest.find('\n') {
    Some(newline) => &rest[newline + 1..],
    None => rest,
  };
  rest.rsplit_once("```").map(|(body, _)| body).unwrap_or(rest).trim()
}
