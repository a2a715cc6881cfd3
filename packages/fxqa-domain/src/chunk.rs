use serde::{Deserialize, Serialize};

/// A retrieved slice of a disclosure document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
	pub content: String,
	#[serde(default)]
	pub metadata: ChunkMetadata,
}
impl DocumentChunk {
	pub fn new(content: impl Into<String>, source: impl Into<String>, chunk_id: i64) -> Self {
		Self { content: content.into(), metadata: ChunkMetadata { source: source.into(), chunk_id } }
	}

	/// Leading characters of the content, for logs.
	pub fn preview(&self, max_chars: usize) -> &str {
		match self.content.char_indices().nth(max_chars) {
			Some((idx, _)) => &self.content[..idx],
			None => &self.content,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkMetadata {
	#[serde(default)]
	pub source: String,
	#[serde(default)]
	pub chunk_id: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredChunk {
	pub score: f32,
	pub chunk: DocumentChunk,
}

/// Orders by score, highest first. The sort is stable, so equal scores keep retrieval order.
pub fn sort_by_score_desc(scored: &mut [ScoredChunk]) {
	scored.sort_by(|a, b| b.score.total_cmp(&a.score));
}
