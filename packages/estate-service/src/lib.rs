//! Property, note and feature operations over Postgres and a text-completion provider.

pub mod analysis;
pub mod features;
pub mod filters;
pub mod notes;
pub mod properties;
pub mod rank;
pub mod rfc3339;

mod error;

pub use error::{Error, Result};
pub use features::{CreateFeatureRequest, FeatureResponse};
pub use notes::{CreateNoteRequest, NoteResponse};
pub use properties::{
	CreatePropertyRequest, PropertyListRequest, PropertyResponse, UpdatePropertyRequest,
};
pub use rank::{RankRequest, ScoredProperty};

use std::{future::Future, pin::Pin, sync::Arc};

use estate_config::{Config, LlmProviderConfig};
use estate_providers::completion;
use estate_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Text completion collaborator. Returns the raw message content of one completion.
pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system_prompt: &'a str,
		user_text: &'a str,
		max_tokens: u32,
	) -> BoxFuture<'a, estate_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub completion: Arc<dyn CompletionProvider>,
}
impl Providers {
	pub fn new(completion: Arc<dyn CompletionProvider>) -> Self {
		Self { completion }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { completion: Arc::new(DefaultProviders) }
	}
}

pub struct EstateService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}
impl EstateService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}

	pub(crate) async fn complete(
		&self,
		system_prompt: &str,
		user_text: &str,
		max_tokens: u32,
	) -> Result<String> {
		let content = self
			.providers
			.completion
			.complete(&self.cfg.providers.llm, system_prompt, user_text, max_tokens)
			.await?;

		Ok(content)
	}
}

struct DefaultProviders;
impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system_prompt: &'a str,
		user_text: &'a str,
		max_tokens: u32,
	) -> BoxFuture<'a, estate_providers::Result<String>> {
		Box::pin(completion::complete(cfg, system_prompt, user_text, max_tokens))
	}
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<String> {
	let trimmed = value.trim();

	if trimmed.is_empty() {
		return Err(Error::InvalidRequest { message: format!("{field} must be non-empty.") });
	}

	Ok(trimmed.to_string())
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> Result<f64> {
	if !value.is_finite() || value < 0.0 {
		return Err(Error::InvalidRequest {
			message: format!("{field} must be a finite number greater than or equal to zero."),
		});
	}

	Ok(value)
}
