use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read config file at {path:?}: {source}")]
	ReadConfig { path: PathBuf, source: std::io::Error },
	/// `path` is `None` when the document was parsed from memory.
	#[error("Config is not valid TOML: {source}")]
	ParseConfig { path: Option<PathBuf>, source: toml::de::Error },
	#[error("Invalid config: {message}")]
	Validation { message: String },
}
