use std::sync::Arc;

use fxqa_domain::plan::Step;
use fxqa_service::{AskRequest, Error, LOW_CONFIDENCE_ANSWER, Memory, OUT_OF_SCOPE_ANSWER};

use super::{
	DIM, MemoryStore, PromptKind, ScriptedLlm, StubEmbedding, build_service, default_service,
	fx_docs, passage, test_config,
};

#[tokio::test]
async fn grounded_answer_flows_through_retrieve_rerank_and_verify() {
	let store = Arc::new(MemoryStore::with_docs(fx_docs(10)));
	let llm = Arc::new(
		ScriptedLlm::new(
			r#"["RETRIEVE", "ANSWER"]"#,
			"  The FX cost of service is the spread applied to each trade.  \n",
			"YES",
		)
		.with_score(&passage(7), "9")
		.with_score(&passage(2), "8")
		.with_score(&passage(5), "7.5")
		.with_score(&passage(0), "2"),
	);
	let service = default_service(store.clone(), llm.clone());
	let response = service
		.ask(AskRequest::new("What is the FX cost of service?"))
		.await
		.expect("ask failed");

	assert_eq!(
		response.answer.as_deref(),
		Some("The FX cost of service is the spread applied to each trade.")
	);
	assert_eq!(response.plan, vec![Step::Retrieve, Step::Answer]);

	let ids: Vec<i64> = response.sources.iter().map(|meta| meta.chunk_id).collect();

	assert_eq!(ids, vec![7, 2, 5]);
	assert_eq!(store.lookups(), vec![("hybrid", 10)]);
	assert_eq!(llm.count(PromptKind::Plan), 1);
	assert_eq!(llm.count(PromptKind::Relevance), 10);
	assert_eq!(llm.count(PromptKind::Answer), 1);
	assert_eq!(llm.count(PromptKind::Grounded), 1);

	let answer_prompt = &llm.prompts(PromptKind::Answer)[0];
	let expected_block = format!("{}\n\n{}\n\n{}", passage(7), passage(2), passage(5));

	assert!(answer_prompt.contains(&expected_block), "{answer_prompt}");

	let grounded_prompt = &llm.prompts(PromptKind::Grounded)[0];
	let expected_context = format!("{}\n{}\n{}", passage(7), passage(2), passage(5));

	assert!(grounded_prompt.contains(&expected_context), "{grounded_prompt}");
	assert!(grounded_prompt.contains("The FX cost of service is the spread applied"));
}

#[tokio::test]
async fn ungrounded_answer_is_replaced_with_low_confidence_message() {
	let store = Arc::new(MemoryStore::with_docs(fx_docs(4)));
	let llm = Arc::new(ScriptedLlm::new(
		r#"["RETRIEVE", "ANSWER"]"#,
		"The markup is always zero.",
		"NO",
	));
	let service = default_service(store, llm);
	let response =
		service.ask(AskRequest::new("What is the markup?")).await.expect("ask failed");

	assert_eq!(response.answer.as_deref(), Some(LOW_CONFIDENCE_ANSWER));
}

#[tokio::test]
async fn any_yes_in_the_verdict_counts_as_grounded() {
	let store = Arc::new(MemoryStore::with_docs(fx_docs(2)));
	let llm = Arc::new(ScriptedLlm::new(
		r#"["RETRIEVE", "ANSWER"]"#,
		"Spreads vary by currency pair.",
		"Yes, mostly.",
	));
	let service = default_service(store, llm);
	let answer = service.direct_answer("Do spreads vary?").await.expect("direct answer failed");

	assert_eq!(answer.as_deref(), Some("Spreads vary by currency pair."));
}

#[tokio::test]
async fn refuse_overrides_retrieved_documents() {
	let store = Arc::new(MemoryStore::with_docs(fx_docs(5)));
	let llm = Arc::new(ScriptedLlm::new(r#"["RETRIEVE", "REFUSE"]"#, "unused", "YES"));
	let service = default_service(store.clone(), llm.clone());
	let response =
		service.ask(AskRequest::new("What is the weather today?")).await.expect("ask failed");

	assert_eq!(response.answer.as_deref(), Some(OUT_OF_SCOPE_ANSWER));
	assert_eq!(store.lookups().len(), 1);
	assert_eq!(llm.count(PromptKind::Answer), 0);
	assert_eq!(llm.count(PromptKind::Grounded), 0);
}

#[tokio::test]
async fn malformed_plan_falls_back_to_retrieve_then_answer() {
	for raw in [
		"I would retrieve first, then answer.",
		"[]",
		r#"["RETRIEVE", "SUMMARIZE"]"#,
		r#"["RETRIEVE", 3]"#,
		r#"{"steps": ["REFUSE"]}"#,
	] {
		let store = Arc::new(MemoryStore::with_docs(fx_docs(3)));
		let llm = Arc::new(ScriptedLlm::new(raw, "An answer.", "YES"));
		let service = default_service(store, llm);
		let plan = service.plan("What is the spread?").await.expect("plan failed");

		assert_eq!(plan, vec![Step::Retrieve, Step::Answer], "{raw}");
	}
}

#[tokio::test]
async fn fenced_plan_is_accepted() {
	let store = Arc::new(MemoryStore::with_docs(fx_docs(3)));
	let llm = Arc::new(ScriptedLlm::new("```json\n[\"REFUSE\"]\n```", "unused", "YES"));
	let service = default_service(store.clone(), llm);
	let response = service.ask(AskRequest::new("Tell me a joke.")).await.expect("ask failed");

	assert_eq!(response.plan, vec![Step::Refuse]);
	assert_eq!(response.answer.as_deref(), Some(OUT_OF_SCOPE_ANSWER));
	assert!(store.lookups().is_empty());
}

#[tokio::test]
async fn plan_without_answer_or_refuse_yields_no_answer() {
	let store = Arc::new(MemoryStore::with_docs(fx_docs(5)));
	let llm = Arc::new(ScriptedLlm::new(r#"["RETRIEVE"]"#, "unused", "YES"));
	let service = default_service(store, llm.clone());
	let response = service.ask(AskRequest::new("What is the spread?")).await.expect("ask failed");

	assert!(response.answer.is_none());
	assert_eq!(response.sources.len(), 3);
	assert_eq!(llm.count(PromptKind::Answer), 0);

	let answer = service.agentic_answer("What is the spread?").await.expect("agentic failed");

	assert!(answer.is_none());
}

#[tokio::test]
async fn answer_without_retrieval_uses_empty_context() {
	let store = Arc::new(MemoryStore::with_docs(fx_docs(5)));
	let llm = Arc::new(ScriptedLlm::new(
		r#"["ANSWER"]"#,
		"I'm sorry I don't have an answer for this question, please try again.",
		"NO",
	));
	let service = default_service(store.clone(), llm.clone());
	let response = service.ask(AskRequest::new("What is the spread?")).await.expect("ask failed");

	assert_eq!(response.answer.as_deref(), Some(LOW_CONFIDENCE_ANSWER));
	assert!(response.sources.is_empty());
	assert!(store.lookups().is_empty());
	assert!(
		llm.prompts(PromptKind::Answer)[0].contains("Context:\n\n\nQuestion: What is the spread?")
	);
}

#[tokio::test]
async fn repeated_answer_step_reuses_documents_without_retrieving() {
	let store = Arc::new(MemoryStore::with_docs(fx_docs(5)));
	let llm = Arc::new(ScriptedLlm::new(r#"["ANSWER"]"#, "Spread applies.", "YES"));
	let service = default_service(store.clone(), llm.clone());
	let mut memory = Memory { documents: fx_docs(2), answer: None };

	service.execute_step("What applies?", Step::Answer, &mut memory).await.expect("step failed");
	service.execute_step("What applies?", Step::Answer, &mut memory).await.expect("step failed");

	assert_eq!(memory.documents, fx_docs(2));
	assert_eq!(memory.answer.as_deref(), Some("Spread applies."));
	assert_eq!(llm.count(PromptKind::Answer), 2);
	assert!(store.lookups().is_empty());
}

#[tokio::test]
async fn blank_message_is_rejected_before_any_model_call() {
	let store = Arc::new(MemoryStore::with_docs(fx_docs(3)));
	let llm = Arc::new(ScriptedLlm::new(r#"["RETRIEVE", "ANSWER"]"#, "unused", "YES"));
	let service = default_service(store, llm.clone());

	for req in [AskRequest::new("   \n"), AskRequest::default()] {
		let err = service.ask(req).await.expect_err("expected invalid request");

		assert!(matches!(err, Error::InvalidRequest { .. }), "{err}");
	}

	assert!(llm.calls.lock().expect("lock poisoned").is_empty());
}

#[tokio::test]
async fn message_reaches_the_prompts_verbatim() {
	let store = Arc::new(MemoryStore::with_docs(fx_docs(2)));
	let llm = Arc::new(ScriptedLlm::new(r#"["RETRIEVE", "ANSWER"]"#, "The spread.", "YES"));
	let service = default_service(store, llm.clone());
	let message = "  What is the spread?\n";

	service.ask(AskRequest::new(message)).await.expect("ask failed");

	let plan_prompts = llm.prompts(PromptKind::Plan);

	assert_eq!(plan_prompts.len(), 1);
	assert!(plan_prompts[0].ends_with(&format!("Query:\n{message}")));
	assert!(llm.prompts(PromptKind::Answer)[0].ends_with(&format!("Question: {message}")));
}

#[tokio::test]
async fn disabled_planner_runs_the_direct_path() {
	let mut cfg = test_config();

	cfg.agent.planner_enabled = false;

	let store = Arc::new(MemoryStore::with_docs(fx_docs(4)));
	let llm = Arc::new(ScriptedLlm::new(r#"["REFUSE"]"#, "Direct answer.", "YES"));
	let service =
		build_service(cfg, store, Arc::new(StubEmbedding::new(DIM as usize)), llm.clone());
	let response = service.ask(AskRequest::new("What is the spread?")).await.expect("ask failed");

	assert_eq!(response.plan, vec![Step::Retrieve, Step::Answer]);
	assert_eq!(response.answer.as_deref(), Some("Direct answer."));
	assert_eq!(llm.count(PromptKind::Plan), 0);
}
