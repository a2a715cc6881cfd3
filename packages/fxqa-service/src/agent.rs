use serde::{Deserialize, Serialize};
use tracing::Instrument;

use fxqa_domain::{
	chunk::{ChunkMetadata, DocumentChunk},
	plan::{self, Step},
};

use crate::{Error, FxService, Result};

/// Replaces an answer the groundedness judge rejected.
pub const LOW_CONFIDENCE_ANSWER: &str =
	"I'm unable to answer confidently based on the provided disclosure.";
pub const OUT_OF_SCOPE_ANSWER: &str =
	"I'm sorry. This question is outside the scope of FX product disclosures.";

/// Scratch state for one query. Never shared between queries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Memory {
	pub documents: Vec<DocumentChunk>,
	pub answer: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AskRequest {
	#[serde(default)]
	pub message: Option<String>,
}
impl AskRequest {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: Some(message.into()) }
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct AskResponse {
	pub answer: Option<String>,
	pub plan: Vec<Step>,
	pub sources: Vec<ChunkMetadata>,
}

impl FxService {
	pub async fn ask(&self, req: AskRequest) -> Result<AskResponse> {
		let query = req.message.as_deref().unwrap_or_default();

		if query.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "message must be a non-empty string.".to_string(),
			});
		}

		let span = tracing::info_span!(
			"ask",
			planner_enabled = self.cfg.agent.planner_enabled,
			query_chars = query.chars().count()
		);

		async move {
			let plan = if self.cfg.agent.planner_enabled {
				self.plan(query).await?
			} else {
				plan::default_plan()
			};
			let memory = self.execute_plan(query, &plan).await?;

			Ok::<_, Error>(AskResponse {
				answer: memory.answer,
				plan,
				sources: memory.documents.into_iter().map(|doc| doc.metadata).collect(),
			})
		}
		.instrument(span)
		.await
	}

	/// Plans, then executes. Returns `None` when the plan had neither ANSWER nor REFUSE.
	pub async fn agentic_answer(&self, query: &str) -> Result<Option<String>> {
		let plan = self.plan(query).await?;

		Ok(self.execute_plan(query, &plan).await?.answer)
	}

	/// RETRIEVE then ANSWER, without consulting the planner.
	pub async fn direct_answer(&self, query: &str) -> Result<Option<String>> {
		Ok(self.execute_plan(query, &plan::DEFAULT_PLAN).await?.answer)
	}

	pub async fn execute_plan(&self, query: &str, plan: &[Step]) -> Result<Memory> {
		let mut memory = Memory::default();

		for (idx, step) in plan.iter().copied().enumerate() {
			tracing::info!(index = idx, %step, "Executing plan step.");

			self.execute_step(query, step, &mut memory).await?;
		}

		Ok(memory)
	}

	pub async fn execute_step(&self, query: &str, step: Step, memory: &mut Memory) -> Result<()> {
		match step {
			Step::Retrieve => {
				let candidates = self.retrieve(query, self.cfg.retrieval.candidate_k).await?;

				memory.documents = self.rerank(query, candidates, self.cfg.retrieval.top_k).await?;
			},
			Step::Answer => {
				let contexts: Vec<String> =
					memory.documents.iter().map(|doc| doc.content.clone()).collect();
				let answer = self.build_answer(query, &contexts).await?;
				let answer = if self.is_grounded(&answer, &contexts.join("\n")).await? {
					answer
				} else {
					LOW_CONFIDENCE_ANSWER.to_string()
				};

				memory.answer = Some(answer);
			},
			Step::Refuse => {
				memory.answer = Some(OUT_OF_SCOPE_ANSWER.to_string());
			},
		}

		Ok(())
	}
}
