use fxqa_domain::plan::{self, Step};

use crate::{FxService, Result, Sampling};

pub fn plan_prompt(query: &str) -> String {
	format!(
		"\
You are an AI agent answering banking FX disclosure questions.

Decide the steps needed to answer the query.
Choose from:
- RETRIEVE (search documents)
- ANSWER (generate answer)
- REFUSE (out of scope)

Return steps as a JSON list.
Example:
[\"RETRIEVE\", \"ANSWER\"]

Query:
{query}"
	)
}

impl FxService {
	/// Lets the model choose the steps for `query`. An unusable response yields the default plan.
	pub async fn plan(&self, query: &str) -> Result<Vec<Step>> {
		let raw = self.generate(&plan_prompt(query), Sampling::Deterministic).await?;

		tracing::debug!(response = %raw.trim(), "Planner responded.");

		match plan::parse_plan(&raw) {
			Ok(steps) => {
				tracing::info!(plan = ?steps, "Planner chose steps.");

				Ok(steps)
			},
			Err(err) => {
				tracing::warn!(error = %err, "Planner response is unusable. Using the default plan.");

				Ok(plan::default_plan())
			},
		}
	}
}
