//! Queue of notes awaiting analysis.
//!
//! Jobs are claimed with `FOR UPDATE SKIP LOCKED` and leased by pushing `available_at` forward, so
//! a worker that dies mid-job releases it once the lease runs out.

use sqlx::PgConnection;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Result, db::Db, models::NoteAnalysisOutboxEntry};

pub async fn enqueue_note_analysis_tx(
	conn: &mut PgConnection,
	note_id: Uuid,
	property_id: Uuid,
	now: OffsetDateTime,
) -> Result<Uuid> {
	let outbox_id = Uuid::new_v4();

	sqlx::query(
		"\
INSERT INTO note_analysis_outbox (
	outbox_id,
	note_id,
	property_id,
	status,
	available_at,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, 'PENDING', $4, $4, $4)",
	)
	.bind(outbox_id)
	.bind(note_id)
	.bind(property_id)
	.bind(now)
	.execute(conn)
	.await?;

	Ok(outbox_id)
}

/// Claims the oldest due job that still has attempts left and leases it for `lease`.
pub async fn claim_next(
	db: &Db,
	now: OffsetDateTime,
	lease: Duration,
	max_attempts: i32,
) -> Result<Option<NoteAnalysisOutboxEntry>> {
	let mut tx = db.pool.begin().await?;
	let row = sqlx::query_as::<_, NoteAnalysisOutboxEntry>(
		"\
SELECT
	outbox_id,
	note_id,
	property_id,
	status,
	attempts,
	last_error,
	available_at,
	created_at,
	updated_at
FROM note_analysis_outbox
WHERE status IN ('PENDING', 'FAILED') AND available_at <= $1 AND attempts < $2
ORDER BY available_at ASC
LIMIT 1
FOR UPDATE SKIP LOCKED",
	)
	.bind(now)
	.bind(max_attempts)
	.fetch_optional(&mut *tx)
	.await?;
	let job = if let Some(mut job) = row {
		let lease_until = now + lease;

		sqlx::query(
			"UPDATE note_analysis_outbox SET available_at = $1, updated_at = $2 WHERE outbox_id = $3",
		)
		.bind(lease_until)
		.bind(now)
		.bind(job.outbox_id)
		.execute(&mut *tx)
		.await?;

		job.available_at = lease_until;
		job.updated_at = now;

		Some(job)
	} else {
		None
	};

	tx.commit().await?;

	Ok(job)
}

pub async fn mark_done(db: &Db, outbox_id: Uuid) -> Result<()> {
	sqlx::query("UPDATE note_analysis_outbox SET status = 'DONE', updated_at = $1 WHERE outbox_id = $2")
		.bind(OffsetDateTime::now_utc())
		.bind(outbox_id)
		.execute(&db.pool)
		.await?;

	Ok(())
}

/// Records a failed attempt and makes the job due again at `available_at`.
pub async fn mark_failed(
	db: &Db,
	outbox_id: Uuid,
	attempts: i32,
	error_text: &str,
	available_at: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
UPDATE note_analysis_outbox
SET status = 'FAILED',
	attempts = $1,
	last_error = $2,
	available_at = $3,
	updated_at = $4
WHERE outbox_id = $5",
	)
	.bind(attempts)
	.bind(error_text)
	.bind(available_at)
	.bind(OffsetDateTime::now_utc())
	.bind(outbox_id)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn get_job(db: &Db, outbox_id: Uuid) -> Result<Option<NoteAnalysisOutboxEntry>> {
	let row = sqlx::query_as::<_, NoteAnalysisOutboxEntry>(
		"\
SELECT
	outbox_id,
	note_id,
	property_id,
	status,
	attempts,
	last_error,
	available_at,
	created_at,
	updated_at
FROM note_analysis_outbox
WHERE outbox_id = $1",
	)
	.bind(outbox_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}
