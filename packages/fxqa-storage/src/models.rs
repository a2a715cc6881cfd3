use serde_json::Value;

/// A row returned by any of the document store lookups.
#[derive(Debug, sqlx::FromRow)]
pub struct DocumentRow {
	pub content: String,
	pub metadata: Value,
}

#[derive(Debug)]
pub struct NewDocument<'a> {
	pub content: &'a str,
	pub metadata: &'a Value,
	pub embedding: &'a [f32],
}
