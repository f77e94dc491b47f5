pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Malformed response: {message}")]
	MalformedResponse { message: String },
	#[error("Completion returned no content.")]
	EmptyCompletion,
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<estate_storage::Error> for Error {
	fn from(err: estate_storage::Error) -> Self {
		match err {
			estate_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			estate_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			estate_storage::Error::NotFound(message) => Self::NotFound { message },
			estate_storage::Error::Conflict(message) => Self::Conflict { message },
		}
	}
}

impl From<estate_providers::Error> for Error {
	fn from(err: estate_providers::Error) -> Self {
		match err {
			estate_providers::Error::EmptyCompletion => Self::EmptyCompletion,
			other => Self::Provider { message: other.to_string() },
		}
	}
}

impl From<estate_domain::Error> for Error {
	fn from(err: estate_domain::Error) -> Self {
		match err {
			estate_domain::Error::MalformedResponse { message } => Self::MalformedResponse { message },
			estate_domain::Error::UnknownPropertyType { value } =>
				Self::InvalidRequest { message: format!("Unknown property type {value:?}.") },
		}
	}
}
