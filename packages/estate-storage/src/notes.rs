use serde_json::Value;
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, db::Db, models::PropertyNote, outbox};

const NOTE_COLUMNS: &str = "\
note_id,
	property_id,
	author_id,
	note_text,
	ai_output,
	created_at,
	updated_at,
	deleted_at";

/// Inserts a note and queues its analysis in one transaction.
///
/// Fails with [`Error::NotFound`] when the property is missing or soft-deleted.
pub async fn insert_note_with_analysis_job(
	db: &Db,
	property_id: Uuid,
	author_id: Uuid,
	note_text: &str,
) -> Result<PropertyNote> {
	let now = OffsetDateTime::now_utc();
	let mut tx = db.pool.begin().await?;
	let exists: Option<Uuid> = sqlx::query_scalar(
		"\
SELECT property_id
FROM properties
WHERE property_id = $1 AND deleted_at IS NULL
FOR SHARE",
	)
	.bind(property_id)
	.fetch_optional(&mut *tx)
	.await?;

	if exists.is_none() {
		return Err(Error::NotFound(format!("property {property_id}")));
	}

	let note = insert_note_tx(&mut tx, property_id, author_id, note_text, now).await?;

	outbox::enqueue_note_analysis_tx(&mut tx, note.note_id, property_id, now).await?;

	tx.commit().await?;

	Ok(note)
}

async fn insert_note_tx(
	conn: &mut PgConnection,
	property_id: Uuid,
	author_id: Uuid,
	note_text: &str,
	now: OffsetDateTime,
) -> Result<PropertyNote> {
	let sql = format!(
		"\
INSERT INTO property_notes (
	note_id,
	property_id,
	author_id,
	note_text,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $5)
RETURNING
	{NOTE_COLUMNS}"
	);
	let note = sqlx::query_as::<_, PropertyNote>(&sql)
		.bind(Uuid::new_v4())
		.bind(property_id)
		.bind(author_id)
		.bind(note_text)
		.bind(now)
		.fetch_one(conn)
		.await?;

	Ok(note)
}

pub async fn get_note(db: &Db, note_id: Uuid) -> Result<Option<PropertyNote>> {
	let sql = format!(
		"\
SELECT
	{NOTE_COLUMNS}
FROM property_notes
WHERE note_id = $1 AND deleted_at IS NULL"
	);
	let note = sqlx::query_as::<_, PropertyNote>(&sql).bind(note_id).fetch_optional(&db.pool).await?;

	Ok(note)
}

/// Active notes of a property, newest first.
pub async fn list_notes_for_property(db: &Db, property_id: Uuid) -> Result<Vec<PropertyNote>> {
	let sql = format!(
		"\
SELECT
	{NOTE_COLUMNS}
FROM property_notes
WHERE property_id = $1 AND deleted_at IS NULL
ORDER BY created_at DESC, note_id DESC"
	);
	let notes = sqlx::query_as::<_, PropertyNote>(&sql).bind(property_id).fetch_all(&db.pool).await?;

	Ok(notes)
}

/// Stored analysis outputs of a property's active notes, oldest first.
pub async fn list_analysis_outputs(db: &Db, property_id: Uuid) -> Result<Vec<Value>> {
	let outputs: Vec<Value> = sqlx::query_scalar(
		"\
SELECT ai_output
FROM property_notes
WHERE property_id = $1 AND deleted_at IS NULL AND ai_output IS NOT NULL
ORDER BY created_at ASC, note_id ASC",
	)
	.bind(property_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(outputs)
}

pub async fn set_analysis_output(db: &Db, note_id: Uuid, output: &Value) -> Result<()> {
	let updated = sqlx::query(
		"\
UPDATE property_notes
SET ai_output = $2, updated_at = $3
WHERE note_id = $1 AND deleted_at IS NULL",
	)
	.bind(note_id)
	.bind(output)
	.bind(OffsetDateTime::now_utc())
	.execute(&db.pool)
	.await?
	.rows_affected();

	if updated == 0 {
		return Err(Error::NotFound(format!("note {note_id}")));
	}

	Ok(())
}

pub async fn soft_delete_note(db: &Db, note_id: Uuid) -> Result<bool> {
	let now = OffsetDateTime::now_utc();
	let deleted = sqlx::query(
		"\
UPDATE property_notes
SET deleted_at = $2, updated_at = $2
WHERE note_id = $1 AND deleted_at IS NULL",
	)
	.bind(note_id)
	.bind(now)
	.execute(&db.pool)
	.await?
	.rows_affected();

	Ok(deleted > 0)
}
