/// Score assigned when the relevance judge answers with anything other than a number.
pub const FALLBACK_RELEVANCE_SCORE: f32 = 0.0;

/// Reads a relevance judge response that should be a single number.
pub fn parse_relevance_score(raw: &str) -> Option<f32> {
	let score: f32 = raw.trim().parse().ok()?;

	score.is_finite().then_some(score)
}

/// True when the groundedness judge response contains "YES" in any casing, anywhere.
///
/// Negated phrasing such as "NOT YES" also passes.
pub fn is_grounded_verdict(raw: &str) -> bool {
	raw.to_uppercase().contains("YES")
}
