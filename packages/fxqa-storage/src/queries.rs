use sqlx::{PgExecutor, types::Json};

use crate::{
	Error, Result,
	models::{DocumentRow, NewDocument},
	vector_to_pg,
};

/// Pure dense similarity through the `match_documents` function.
pub async fn match_documents<'e, E>(
	executor: E,
	query_embedding: &[f32],
	match_count: u32,
) -> Result<Vec<DocumentRow>>
where
	E: PgExecutor<'e>,
{
	let vec_text = checked_vector(query_embedding)?;
	let rows = sqlx::query_as::<_, DocumentRow>(
		"SELECT content, metadata FROM match_documents($1::text::vector, $2)",
	)
	.bind(vec_text)
	.bind(count_arg(match_count)?)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Dense and full-text ranks fused by the `hybrid_match_documents` function.
pub async fn hybrid_match_documents<'e, E>(
	executor: E,
	query_embedding: &[f32],
	query_text: &str,
	match_count: u32,
) -> Result<Vec<DocumentRow>>
where
	E: PgExecutor<'e>,
{
	let vec_text = checked_vector(query_embedding)?;
	let rows = sqlx::query_as::<_, DocumentRow>(
		"SELECT content, metadata FROM hybrid_match_documents($1::text::vector, $2, $3)",
	)
	.bind(vec_text)
	.bind(query_text)
	.bind(count_arg(match_count)?)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn text_search_documents<'e, E>(
	executor: E,
	query_text: &str,
	limit: u32,
) -> Result<Vec<DocumentRow>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, DocumentRow>(
		"\
SELECT content, metadata
FROM documents
WHERE fts @@ websearch_to_tsquery('english', $1)
ORDER BY ts_rank_cd(fts, websearch_to_tsquery('english', $1)) DESC, id
LIMIT $2",
	)
	.bind(query_text)
	.bind(i64::from(limit))
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn insert_document<'e, E>(executor: E, doc: &NewDocument<'_>) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let vec_text = checked_vector(doc.embedding)?;
	let id: i64 = sqlx::query_scalar(
		"\
INSERT INTO documents (content, metadata, embedding)
VALUES ($1, $2, $3::text::vector)
RETURNING id",
	)
	.bind(doc.content)
	.bind(Json(doc.metadata))
	.bind(vec_text)
	.fetch_one(executor)
	.await?;

	Ok(id)
}

pub async fn delete_documents_by_source<'e, E>(executor: E, source: &str) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM documents WHERE metadata->>'source' = $1")
		.bind(source)
		.execute(executor)
		.await?;

	Ok(result.rows_affected())
}

pub async fn count_documents_by_source<'e, E>(executor: E, source: &str) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let count: i64 =
		sqlx::query_scalar("SELECT count(*) FROM documents WHERE metadata->>'source' = $1")
			.bind(source)
			.fetch_one(executor)
			.await?;

	Ok(count)
}

fn checked_vector(vec: &[f32]) -> Result<String> {
	if vec.is_empty() {
		return Err(Error::InvalidArgument("Embedding vector must be non-empty.".to_string()));
	}
	if vec.iter().any(|value| !value.is_finite()) {
		return Err(Error::InvalidArgument("Embedding vector must be finite.".to_string()));
	}

	Ok(vector_to_pg(vec))
}

fn count_arg(count: u32) -> Result<i32> {
	i32::try_from(count)
		.map_err(|_| Error::InvalidArgument(format!("Match count {count} is out of range.")))
}
