use unicode_segmentation::UnicodeSegmentation;

#[derive(Clone, Debug)]
pub struct ChunkingConfig {
	pub max_chars: u32,
	pub overlap_chars: u32,
}

#[derive(Clone, Debug)]
pub struct Chunk {
	pub chunk_id: i64,
	pub start_offset: usize,
	pub end_offset: usize,
	pub text: String,
}

/// Packs whole sentences into chunks of at most `max_chars` characters. Each chunk after the first
/// starts with up to `overlap_chars` characters carried over from the end of the previous one.
/// Sentences longer than the budget are cut on character boundaries.
pub fn split_text(text: &str, cfg: &ChunkingConfig) -> Vec<Chunk> {
	let max_chars = cfg.max_chars.max(1) as usize;
	let overlap_chars = cfg.overlap_chars as usize;
	let mut chunks = Vec::new();
	let mut start = 0_usize;
	let mut end = 0_usize;
	let mut current_chars = 0_usize;

	for (idx, piece) in pieces(text, max_chars) {
		let piece_chars = piece.chars().count();

		if current_chars > 0 && current_chars + piece_chars > max_chars {
			push_chunk(&mut chunks, text, start, end);

			let keep = overlap_chars.min(max_chars - piece_chars);

			start += tail_start(&text[start..end], keep);
			current_chars = text[start..end].chars().count();
		}
		if current_chars == 0 {
			start = idx;
		}

		end = idx + piece.len();
		current_chars += piece_chars;
	}

	if current_chars > 0 {
		push_chunk(&mut chunks, text, start, end);
	}

	chunks
}

fn pieces(text: &str, max_chars: usize) -> Vec<(usize, &str)> {
	let mut out = Vec::new();

	for (idx, sentence) in text.split_sentence_bound_indices() {
		if sentence.chars().count() <= max_chars {
			out.push((idx, sentence));

			continue;
		}

		let mut piece_start = 0_usize;

		for (count, (offset, _)) in sentence.char_indices().enumerate() {
			if count > 0 && count % max_chars == 0 {
				out.push((idx + piece_start, &sentence[piece_start..offset]));

				piece_start = offset;
			}
		}

		out.push((idx + piece_start, &sentence[piece_start..]));
	}

	out
}

/// Byte offset in `text` where its last `keep` characters begin.
fn tail_start(text: &str, keep: usize) -> usize {
	if keep == 0 {
		return text.len();
	}

	text.char_indices().rev().nth(keep - 1).map(|(idx, _)| idx).unwrap_or(0)
}

fn push_chunk(chunks: &mut Vec<Chunk>, text: &str, start: usize, end: usize) {
	let slice = &text[start..end];

	if slice.trim().is_empty() {
		return;
	}

	chunks.push(Chunk {
		chunk_id: chunks.len() as i64,
		start_offset: start,
		end_offset: end,
		text: slice.to_string(),
	});
}
