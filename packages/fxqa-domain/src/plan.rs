use std::fmt;

use serde::{Deserialize, Serialize};

/// Executed when the planner output cannot be used.
pub const DEFAULT_PLAN: [Step; 2] = [Step::Retrieve, Step::Answer];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
	Retrieve,
	Answer,
	Refuse,
}
impl Step {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Retrieve => "RETRIEVE",
			Self::Answer => "ANSWER",
			Self::Refuse => "REFUSE",
		}
	}
}
impl fmt::Display for Step {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
	#[error("Plan is not a JSON array of step names: {0}")]
	Json(#[from] serde_json::Error),
	#[error("Plan contains no steps.")]
	Empty,
}

pub fn default_plan() -> Vec<Step> {
	DEFAULT_PLAN.to_vec()
}

/// Strictly parses a planner response. The only leniency is one surrounding Markdown code fence.
pub fn parse_plan(raw: &str) -> Result<Vec<Step>, PlanError> {
	let steps: Vec<Step> = serde_json::from_str(strip_code_fence(raw))?;

	if steps.is_empty() {
		return Err(PlanError::Empty);
	}

	Ok(steps)
}

fn strip_code_fence(raw: &str) -> &str {
	let trimmed = raw.trim();
	let Some(body) = trimmed.strip_prefix("```").and_then(|rest| rest.strip_suffix("```")) else {
		return trimmed;
	};
	// Drop an info string such as `json` on the opening fence line.
	let body = match body.split_once('\n') {
		Some((info, rest)) if !info.trim_start().starts_with('[') => rest,
		_ => body,
	};

	body.trim()
}
