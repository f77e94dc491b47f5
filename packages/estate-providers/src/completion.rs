use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Sends one chat completion in JSON mode and returns the first choice's message content.
///
/// The call is made once. Transport and status errors propagate as-is; a response without
/// non-empty content is [`Error::EmptyCompletion`].
pub async fn complete(
	cfg: &estate_config::LlmProviderConfig,
	system_prompt: &str,
	user_text: &str,
	max_tokens: u32,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = request_body(cfg, system_prompt, user_text, max_tokens);
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let content = parse_completion_content(&json)?;

	tracing::debug!(
		provider_id = %cfg.provider_id,
		model = %cfg.model,
		content_len = content.len(),
		"Completion received."
	);

	Ok(content)
}

fn request_body(
	cfg: &estate_config::LlmProviderConfig,
	system_prompt: &str,
	user_text: &str,
	max_tokens: u32,
) -> Value {
	serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": max_tokens,
		"response_format": { "type": "json_object" },
		"messages": [
			{ "role": "system", "content": system_prompt },
			{ "role": "user", "content": crate::prompts::build_user_prompt(user_text) },
		],
	})
}

fn parse_completion_content(json: &Value) -> Result<String> {
	json.get("choices")
		.and_then(Value::as_array)
		.and_then(|choices| choices.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(Value::as_str)
		.filter(|content| !content.is_empty())
		.map(str::to_string)
		.ok_or(Error::EmptyCompletion)
}

#[cfg(test)]
mod tests {
	use serde_json::{Map, json};

	use super::*;

	fn llm_config() -> estate_config::LlmProviderConfig {
		estate_config::LlmProviderConfig {
			provider_id: "groq".to_string(),
			api_base: "http://localhost".to_string(),
			api_key: "key".to_string(),
			path: "/openai/v1/chat/completions".to_string(),
			model: "m".to_string(),
			temperature: 0.0,
			timeout_ms: 1_000,
			default_headers: Map::new(),
		}
	}

	#[test]
	fn parses_first_choice_content() {
		let json = json!({
			"choices": [
				{ "message": { "content": "{\"nearSubway\": true}" } },
				{ "message": { "content": "{}" } }
			]
		});

		assert_eq!(
			parse_completion_content(&json).expect("Parse failed."),
			"{\"nearSubway\": true}"
		);
	}

	#[test]
	fn missing_or_blank_content_is_empty_completion() {
		for json in [
			json!({ "choices": [] }),
			json!({ "choices": [{ "message": { "content": "" } }] }),
			json!({ "choices": [{ "message": { "content": null } }] }),
			json!({}),
		] {
			assert!(matches!(parse_completion_content(&json), Err(Error::EmptyCompletion)));
		}
	}

	#[test]
	fn request_uses_json_mode_and_wraps_user_text() {
		let body = request_body(&llm_config(), "system", "Near the metro.", 150);

		assert_eq!(body["max_tokens"], 150);
		assert_eq!(body["response_format"]["type"], "json_object");
		assert_eq!(body["messages"][0]["role"], "system");
		assert_eq!(body["messages"][1]["content"], "<<<\nNear the metro.\n>>>");
	}
}
