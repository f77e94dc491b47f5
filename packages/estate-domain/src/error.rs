pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Malformed response: {message}")]
	MalformedResponse { message: String },
	#[error("Unknown property type {value:?}.")]
	UnknownPropertyType { value: String },
}
