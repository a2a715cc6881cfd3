use crate::{FxService, Result, Sampling};

/// The sentence the model is told to use when the context does not hold the answer.
pub const INSUFFICIENT_CONTEXT_ANSWER: &str =
	"I'm sorry I don't have an answer for this question, please try again.";

pub fn build_prompt(query: &str, contexts: &[String]) -> String {
	let context_block = contexts.join("\n\n");

	format!(
		"Use the following pieces of retrieved context to answer the question. Use three to five \
		 sentences maximum and keep the answer concise, while still giving depth. If the context \
		 does not contain the answer, say '{INSUFFICIENT_CONTEXT_ANSWER}'.\n\nContext:\n\
		 {context_block}\n\nQuestion: {query}"
	)
}

impl FxService {
	pub async fn build_answer(&self, query: &str, contexts: &[String]) -> Result<String> {
		let prompt = build_prompt(query, contexts);
		let raw = self.generate(&prompt, Sampling::Default).await?;

		Ok(raw.trim().to_string())
	}
}
