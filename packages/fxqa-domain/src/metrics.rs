use std::collections::HashSet;

use crate::chunk::{ChunkMetadata, DocumentChunk};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrecisionRecall {
	pub precision: f64,
	pub recall: f64,
}

/// Precision and recall of the first `k` ranked chunks against the relevant `(source, chunk_id)`
/// set.
///
/// Precision divides by `min(k, ranked.len())` so a short list is not penalized for slots it never
/// had.
pub fn precision_recall_at_k(
	ranked: &[DocumentChunk],
	relevant: &[ChunkMetadata],
	k: usize,
) -> PrecisionRecall {
	let retrieved: HashSet<&ChunkMetadata> =
		ranked.iter().take(k).map(|chunk| &chunk.metadata).collect();
	let expected: HashSet<&ChunkMetadata> = relevant.iter().collect();
	let hits = retrieved.intersection(&expected).count();
	let denom = k.min(ranked.len());
	let precision = if denom == 0 { 0.0 } else { hits as f64 / denom as f64 };
	let recall = if expected.is_empty() { 0.0 } else { hits as f64 / expected.len() as f64 };

	PrecisionRecall { precision, recall }
}

pub fn mean(values: &[f64]) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	values.iter().sum::<f64>() / values.len() as f64
}
