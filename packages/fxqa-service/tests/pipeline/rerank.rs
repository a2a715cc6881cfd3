use std::sync::Arc;

use fxqa_service::{Error, Sampling};

use super::{
	DIM, FailingLlm, MemoryStore, PromptKind, ScriptedLlm, StubEmbedding, build_service,
	default_service, fx_docs, passage, test_config,
};

fn chunk_ids(docs: &[fxqa_domain::chunk::DocumentChunk]) -> Vec<i64> {
	docs.iter().map(|doc| doc.metadata.chunk_id).collect()
}

#[tokio::test]
async fn keeps_top_k_by_score_with_stable_ties() {
	let llm = Arc::new(
		ScriptedLlm::new("[]", "", "")
			.with_score(&passage(0), "3")
			.with_score(&passage(1), "8")
			.with_score(&passage(2), "8")
			.with_score(&passage(3), "1")
			.with_score(&passage(4), "9"),
	);
	let service = default_service(Arc::new(MemoryStore::default()), llm.clone());
	let ranked = service.rerank("spread", fx_docs(5), 3).await.expect("rerank failed");

	assert_eq!(chunk_ids(&ranked), vec![4, 1, 2]);
	assert_eq!(llm.count(PromptKind::Relevance), 5);
	assert!(llm.samplings(PromptKind::Relevance).iter().all(|s| *s == Sampling::Deterministic));
}

#[tokio::test]
async fn non_numeric_scores_count_as_zero() {
	let llm = Arc::new(
		ScriptedLlm::new("[]", "", "")
			.with_score(&passage(0), "Highly relevant")
			.with_score(&passage(1), "7")
			.with_score(&passage(2), "NaN"),
	);
	let service = default_service(Arc::new(MemoryStore::default()), llm);
	let scored =
		service.score_candidates("spread", fx_docs(3)).await.expect("scoring failed");
	let scores: Vec<f32> = scored.iter().map(|item| item.score).collect();

	assert_eq!(scores, vec![0.0, 7.0, 0.0]);

	let ranked = service.rerank("spread", fx_docs(3), 3).await.expect("rerank failed");

	assert_eq!(chunk_ids(&ranked), vec![1, 0, 2]);
}

#[tokio::test]
async fn never_returns_more_than_the_candidates() {
	let llm = Arc::new(ScriptedLlm::new("[]", "", ""));
	let service = default_service(Arc::new(MemoryStore::default()), llm.clone());

	assert_eq!(service.rerank("spread", fx_docs(2), 3).await.expect("rerank failed").len(), 2);
	assert!(service.rerank("spread", Vec::new(), 3).await.expect("rerank failed").is_empty());
	assert_eq!(llm.count(PromptKind::Relevance), 2);
}

#[tokio::test]
async fn judge_transport_failure_propagates() {
	let service = build_service(
		test_config(),
		Arc::new(MemoryStore::default()),
		Arc::new(StubEmbedding::new(DIM as usize)),
		Arc::new(FailingLlm),
	);
	let err = service.rerank("spread", fx_docs(2), 1).await.expect_err("expected failure");

	assert!(matches!(err, Error::Provider { .. }), "{err}");
}

#[tokio::test]
async fn answer_generation_uses_default_sampling() {
	let llm = Arc::new(ScriptedLlm::new("[]", " Answer. ", "YES"));
	let service = default_service(Arc::new(MemoryStore::default()), llm.clone());
	let answer = service
		.build_answer("spread", &["Context.".to_string()])
		.await
		.expect("answer failed");

	assert_eq!(answer, "Answer.");
	assert_eq!(llm.samplings(PromptKind::Answer), vec![Sampling::Default]);
	assert!(service.is_grounded("Answer.", "Context.").await.expect("verify failed"));
	assert_eq!(llm.samplings(PromptKind::Grounded), vec![Sampling::Deterministic]);
}
