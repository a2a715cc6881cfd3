use std::sync::Arc;

use fxqa_domain::chunk::DocumentChunk;
use fxqa_service::Error;

use super::{
	DIM, FailingEmbedding, MemoryStore, ScriptedLlm, StubEmbedding, build_service, test_config,
};

const DISCLOSURE: &str = "FX trades carry a spread. The spread is shown before you confirm. \
	Markups vary by currency pair. Settlement occurs in two business days. \
	Statements list every fee. Contact support with questions.";

fn ingest_service(
	store: Arc<MemoryStore>,
	embedding: Arc<StubEmbedding>,
	batch_size: u32,
) -> fxqa_service::FxService {
	let mut cfg = test_config();

	cfg.chunking.max_chars = 70;
	cfg.chunking.overlap_chars = 0;
	cfg.providers.embedding.batch_size = batch_size;

	build_service(cfg, store, embedding, Arc::new(ScriptedLlm::new("[]", "", "")))
}

#[tokio::test]
async fn stores_sequential_chunks_in_batches() {
	let store = Arc::new(MemoryStore::default());
	let embedding = Arc::new(StubEmbedding::new(DIM as usize));
	let service = ingest_service(store.clone(), embedding.clone(), 2);
	let report = service.ingest_text(DISCLOSURE, "fx.pdf", false).await.expect("ingest failed");

	assert!(report.chunks > 2, "expected several chunks, got {}", report.chunks);
	assert_eq!(report.source, "fx.pdf");
	assert_eq!(report.replaced, 0);

	let inserted = store.inserted.lock().expect("lock poisoned");
	let ids: Vec<i64> = inserted.iter().map(|(doc, _)| doc.metadata.chunk_id).collect();

	assert_eq!(ids, (0..report.chunks as i64).collect::<Vec<_>>());
	assert!(inserted.iter().all(|(doc, dim)| doc.metadata.source == "fx.pdf" && *dim == 3));
	assert!(inserted.iter().all(|(doc, _)| doc.content.chars().count() <= 70));
	assert_eq!(embedding.calls(), report.chunks.div_ceil(2));
	assert!(embedding.batch_sizes.lock().expect("lock poisoned").iter().all(|size| *size <= 2));
}

#[tokio::test]
async fn replace_removes_only_the_same_source() {
	let store = Arc::new(MemoryStore::with_docs(vec![
		DocumentChunk::new("Old fx text.", "fx.pdf", 0),
		DocumentChunk::new("Old fx text, part two.", "fx.pdf", 1),
		DocumentChunk::new("Other product.", "other.pdf", 0),
	]));
	let embedding = Arc::new(StubEmbedding::new(DIM as usize));
	let service = ingest_service(store.clone(), embedding, 16);
	let report = service.ingest_text(DISCLOSURE, "fx.pdf", true).await.expect("ingest failed");

	assert_eq!(report.replaced, 2);

	let docs = store.docs.lock().expect("lock poisoned");

	assert!(docs.iter().all(|doc| !doc.content.starts_with("Old fx")));
	assert_eq!(docs.iter().filter(|doc| doc.metadata.source == "other.pdf").count(), 1);
	assert_eq!(docs.iter().filter(|doc| doc.metadata.source == "fx.pdf").count(), report.chunks);
}

#[tokio::test]
async fn blank_text_is_rejected_without_embedding() {
	let store = Arc::new(MemoryStore::default());
	let embedding = Arc::new(StubEmbedding::new(DIM as usize));
	let service = ingest_service(store.clone(), embedding.clone(), 16);
	let err = service.ingest_text(" \n\t", "fx.pdf", true).await.expect_err("expected error");

	assert!(matches!(err, Error::InvalidRequest { .. }), "{err}");
	assert_eq!(embedding.calls(), 0);
	assert!(store.inserted.lock().expect("lock poisoned").is_empty());
}

#[tokio::test]
async fn failed_embedding_keeps_existing_rows_on_replace() {
	let store = Arc::new(MemoryStore::with_docs(vec![
		DocumentChunk::new("Old fx text.", "fx.pdf", 0),
		DocumentChunk::new("Old fx text, part two.", "fx.pdf", 1),
	]));
	let service = build_service(
		test_config(),
		store.clone(),
		Arc::new(FailingEmbedding),
		Arc::new(ScriptedLlm::new("[]", "", "")),
	);
	let err = service.ingest_text(DISCLOSURE, "fx.pdf", true).await.expect_err("expected error");

	assert!(matches!(err, Error::Provider { .. }), "{err}");

	let docs = store.docs.lock().expect("lock poisoned");

	assert_eq!(docs.iter().filter(|doc| doc.metadata.source == "fx.pdf").count(), 2);
	assert!(store.inserted.lock().expect("lock poisoned").is_empty());
}

#[tokio::test]
async fn wrong_dimension_keeps_existing_rows_on_replace() {
	let store =
		Arc::new(MemoryStore::with_docs(vec![DocumentChunk::new("Old fx text.", "fx.pdf", 0)]));
	let embedding = Arc::new(StubEmbedding::new(DIM as usize + 1));
	let service = ingest_service(store.clone(), embedding, 16);
	let err = service.ingest_text(DISCLOSURE, "fx.pdf", true).await.expect_err("expected error");

	assert!(matches!(err, Error::Provider { .. }), "{err}");
	assert_eq!(store.docs.lock().expect("lock poisoned").len(), 1);
	assert!(store.inserted.lock().expect("lock poisoned").is_empty());
}
