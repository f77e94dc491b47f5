use serde_json::Value;

use estate_providers::prompts;

use crate::{Error, EstateService, Result};

impl EstateService {
	/// Asks the completion provider for search criteria and returns its raw JSON text.
	pub async fn extract_filters(&self, text: &str) -> Result<String> {
		let text = crate::require_text("text", text)?;

		tracing::debug!(text_len = text.len(), "Extracting property filters.");

		let raw = self
			.complete(
				prompts::filter_extraction_system_prompt(),
				&text,
				self.cfg.extraction.filter_max_tokens,
			)
			.await?;

		tracing::info!(filters = %raw, "Property filters extracted.");

		Ok(raw)
	}

	/// The extracted criteria as untyped JSON, for display.
	pub async fn preview_filters(&self, text: &str) -> Result<Value> {
		let raw = self.extract_filters(text).await?;

		serde_json::from_str(&raw).map_err(|err| Error::MalformedResponse {
			message: format!("Completion is not valid JSON: {err}."),
		})
	}
}
