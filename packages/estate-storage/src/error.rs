#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Conflict: {0}")]
	Conflict(String),
}
impl Error {
	pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
		matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
	}
}
