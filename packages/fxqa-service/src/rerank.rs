use fxqa_domain::{
	chunk::{self, DocumentChunk, ScoredChunk},
	judge,
};

use crate::{FxService, Result, Sampling};

pub fn rerank_prompt(query: &str, passage: &str) -> String {
	format!(
		"\
You are a relevance judge for a retrieval system.
Read the query and passage carefully. Score relevance strictly.

10 = directly answers the query
7 - 9 = provides key supporting details
4 - 6 = related but not sufficient alone
0 - 3 = irrelevant

Query:
{query}

Passage:
{passage}

Score the relevance from 0 (irrelevant) to 10 (highly relevant).
Return ONLY the number."
	)
}

/// Highest scores first, ties in input order, at most `top_k` entries.
pub fn select_top(mut scored: Vec<ScoredChunk>, top_k: usize) -> Vec<ScoredChunk> {
	chunk::sort_by_score_desc(&mut scored);
	scored.truncate(top_k);

	scored
}

impl FxService {
	/// Asks the judge model for one relevance score per candidate, in candidate order.
	pub async fn score_candidates(
		&self,
		query: &str,
		candidates: Vec<DocumentChunk>,
	) -> Result<Vec<ScoredChunk>> {
		let mut scored = Vec::with_capacity(candidates.len());

		for (idx, chunk) in candidates.into_iter().enumerate() {
			let prompt = rerank_prompt(query, &chunk.content);
			let raw = self.generate(&prompt, Sampling::Deterministic).await?;
			let score = match judge::parse_relevance_score(&raw) {
				Some(score) => score,
				None => {
					tracing::warn!(
						candidate = idx + 1,
						response = %raw.trim(),
						"Relevance judge returned a non-numeric score. Using the fallback."
					);

					judge::FALLBACK_RELEVANCE_SCORE
				},
			};

			tracing::debug!(
				candidate = idx + 1,
				score,
				source = %chunk.metadata.source,
				chunk_id = chunk.metadata.chunk_id,
				preview = chunk.preview(120),
				"Scored candidate."
			);

			scored.push(ScoredChunk { score, chunk });
		}

		Ok(scored)
	}

	pub async fn rerank(
		&self,
		query: &str,
		candidates: Vec<DocumentChunk>,
		top_k: u32,
	) -> Result<Vec<DocumentChunk>> {
		let scored = self.score_candidates(query, candidates).await?;
		let ranked = select_top(scored, top_k as usize);

		for (rank, item) in ranked.iter().enumerate() {
			tracing::info!(
				rank = rank + 1,
				score = item.score,
				source = %item.chunk.metadata.source,
				chunk_id = item.chunk.metadata.chunk_id,
				"Reranked chunk."
			);
		}

		Ok(ranked.into_iter().map(|item| item.chunk).collect())
	}
}
