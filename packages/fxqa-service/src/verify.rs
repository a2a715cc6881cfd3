use fxqa_domain::judge;

use crate::{FxService, Result, Sampling};

pub fn grounded_prompt(answer: &str, context: &str) -> String {
	format!(
		"\
Is the following answer fully supported by the context?
Answer YES or NO.

Context:
{context}

Answer:
{answer}"
	)
}

impl FxService {
	/// Asks the judge model whether `answer` is fully supported by `context`.
	pub async fn is_grounded(&self, answer: &str, context: &str) -> Result<bool> {
		let prompt = grounded_prompt(answer, context);
		let raw = self.generate(&prompt, Sampling::Deterministic).await?;
		let grounded = judge::is_grounded_verdict(&raw);

		tracing::debug!(response = %raw.trim(), "Groundedness judge responded.");
		tracing::info!(grounded, "Groundedness verdict.");

		Ok(grounded)
	}
}
