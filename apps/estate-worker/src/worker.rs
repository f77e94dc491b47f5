use std::time::Duration as StdDuration;

use time::{Duration, OffsetDateTime};

use crate::Result;
use estate_service::EstateService;
use estate_storage::outbox;

const BASE_BACKOFF_MS: i64 = 500;
const MAX_BACKOFF_MS: i64 = 30_000;
const MAX_OUTBOX_ERROR_CHARS: usize = 1_024;

pub struct WorkerState {
	pub service: EstateService,
	pub poll_interval: Duration,
	pub lease: Duration,
	pub max_attempts: i32,
}
impl WorkerState {
	pub fn new(service: EstateService) -> Self {
		let worker = &service.cfg.worker;
		let poll_interval =
			Duration::milliseconds(i64::try_from(worker.poll_interval_ms).unwrap_or(i64::MAX));
		let lease = Duration::seconds(worker.claim_lease_seconds);
		let max_attempts = worker.max_attempts;

		Self { service, poll_interval, lease, max_attempts }
	}
}

/// Outcome of a single claim attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobOutcome {
	Idle,
	Done,
	Failed { attempts: i32 },
}

pub async fn run_worker(state: WorkerState) -> color_eyre::Result<()> {
	loop {
		match process_once(&state, OffsetDateTime::now_utc()).await {
			Ok(JobOutcome::Idle) => {
				tokio::time::sleep(to_std_duration(state.poll_interval)).await;
			},
			Ok(_) => {},
			Err(err) => {
				tracing::error!(error = %err, "Note analysis outbox processing failed.");
				tokio::time::sleep(to_std_duration(state.poll_interval)).await;
			},
		}
	}
}

/// Claims at most one due job and runs it to completion.
pub async fn process_once(state: &WorkerState, now: OffsetDateTime) -> Result<JobOutcome> {
	let db = &state.service.db;
	let Some(job) = outbox::claim_next(db, now, state.lease, state.max_attempts).await? else {
		return Ok(JobOutcome::Idle);
	};

	match state.service.process_note_job(&job).await {
		Ok(_) => {
			outbox::mark_done(db, job.outbox_id).await?;

			tracing::info!(outbox_id = %job.outbox_id, note_id = %job.note_id, "Note analyzed.");

			Ok(JobOutcome::Done)
		},
		Err(err) => {
			let attempts = job.attempts.saturating_add(1);
			let available_at = OffsetDateTime::now_utc() + backoff_for_attempt(attempts);
			let error_text = sanitize_outbox_error(&err.to_string());

			outbox::mark_failed(db, job.outbox_id, attempts, &error_text, available_at).await?;

			if attempts >= state.max_attempts {
				tracing::warn!(
					outbox_id = %job.outbox_id,
					note_id = %job.note_id,
					attempts,
					"Note analysis job exhausted its attempts."
				);
			} else {
				tracing::error!(
					error = %error_text,
					outbox_id = %job.outbox_id,
					attempts,
					"Note analysis job failed."
				);
			}

			Ok(JobOutcome::Failed { attempts })
		},
	}
}

fn backoff_for_attempt(attempt: i32) -> Duration {
	let exp = attempt.max(1).saturating_sub(1).min(6) as u32;
	let delay = BASE_BACKOFF_MS.saturating_mul(1 << exp).min(MAX_BACKOFF_MS);

	Duration::milliseconds(delay)
}

fn to_std_duration(duration: Duration) -> StdDuration {
	u64::try_from(duration.whole_milliseconds()).map(StdDuration::from_millis).unwrap_or_default()
}

/// Redacts credentials that provider errors may echo back and caps the stored length.
fn sanitize_outbox_error(text: &str) -> String {
	let mut redact_next = false;
	let words = text
		.split_whitespace()
		.map(|raw| {
			if std::mem::take(&mut redact_next) {
				return "[REDACTED]".to_string();
			}
			if raw.eq_ignore_ascii_case("bearer") {
				redact_next = true;

				return raw.to_string();
			}

			redact_assignment(raw).unwrap_or_else(|| raw.to_string())
		})
		.collect::<Vec<_>>();
	let joined = words.join(" ");

	if joined.chars().count() <= MAX_OUTBOX_ERROR_CHARS {
		return joined;
	}

	let mut out = joined.chars().take(MAX_OUTBOX_ERROR_CHARS).collect::<String>();

	out.push_str("...");

	out
}

fn redact_assignment(word: &str) -> Option<String> {
	let lowered = word.to_ascii_lowercase();
	let sensitive = ["api_key", "apikey", "password", "secret", "token"]
		.iter()
		.any(|key| lowered.contains(key));

	if !sensitive {
		return None;
	}

	let sep = word.find(['=', ':'])?;

	Some(format!("{}[REDACTED]", &word[..=sep]))
}
