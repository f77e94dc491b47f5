use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use estate_config::Error;

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let mut table = root.as_table_mut().expect("Template config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn sample_toml_without(section: &str) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");

	root.as_table_mut().expect("Template config must be a table.").remove(section);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: &str) -> PathBuf {
	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("Clock error.").as_nanos();
	let seq = COUNTER.fetch_add(1, Ordering::SeqCst);
	let path = env::temp_dir().join(format!("estate_config_test_{nanos}_{seq}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn expect_validation_message(payload: &str, expected: &str) {
	let err = estate_config::parse(payload).expect_err("Expected validation error.");

	match err {
		Error::Validation { message } => assert_eq!(message, expected),
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[test]
fn sample_config_loads_from_disk() {
	let path = write_temp_config(SAMPLE_CONFIG_TEMPLATE_TOML);
	let cfg = estate_config::load(&path).expect("Failed to load sample config.");

	fs::remove_file(&path).expect("Failed to remove test config.");

	assert_eq!(cfg.service.http_bind, "127.0.0.1:8080");
	assert_eq!(cfg.storage.postgres.pool_max_conns, 8);
	assert_eq!(cfg.extraction.filter_max_tokens, 300);
	assert!(cfg.security.bind_localhost_only);
}

#[test]
fn api_base_trailing_slash_is_trimmed() {
	let cfg = estate_config::parse(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse config.");

	assert_eq!(cfg.providers.llm.api_base, "https://api.groq.com/openai/v1");
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("estate_config_test_missing.toml");
	let err = estate_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { path: ref p, .. } if *p == path));
}

#[test]
fn parse_errors_carry_the_file_path() {
	let path = write_temp_config("[service\nhttp_bind = ");
	let err = estate_config::load(&path).expect_err("Expected parse error.");

	fs::remove_file(&path).expect("Failed to remove test config.");

	assert!(matches!(err, Error::ParseConfig { path: Some(ref p), .. } if *p == path));
}

#[test]
fn worker_and_extraction_sections_default_when_omitted() {
	let payload = sample_toml_without("worker");
	let cfg = estate_config::parse(&payload).expect("Failed to parse config.");

	assert_eq!(cfg.worker.poll_interval_ms, 500);
	assert_eq!(cfg.worker.claim_lease_seconds, 30);
	assert_eq!(cfg.worker.max_attempts, 5);

	let payload = sample_toml_without("extraction");
	let cfg = estate_config::parse(&payload).expect("Failed to parse config.");

	assert_eq!(cfg.extraction.note_max_tokens, 150);
	assert_eq!(cfg.extraction.filter_max_tokens, 300);
}

#[test]
fn blank_api_key_is_rejected() {
	let payload = sample_toml_with("providers.llm", "api_key", Value::String("  ".to_string()));

	expect_validation_message(&payload, "providers.llm.api_key must be non-empty.");
}

#[test]
fn zero_pool_size_is_rejected() {
	let payload = sample_toml_with("storage.postgres", "pool_max_conns", Value::Integer(0));

	expect_validation_message(
		&payload,
		"storage.postgres.pool_max_conns must be greater than zero.",
	);
}

#[test]
fn out_of_range_temperature_is_rejected() {
	let payload = sample_toml_with("providers.llm", "temperature", Value::Float(2.5));

	expect_validation_message(&payload, "providers.llm.temperature must be in the range 0.0-2.0.");
}

#[test]
fn zero_token_budget_is_rejected() {
	let payload = sample_toml_with("extraction", "filter_max_tokens", Value::Integer(0));

	expect_validation_message(&payload, "extraction.filter_max_tokens must be greater than zero.");
}

#[test]
fn zero_max_attempts_is_rejected() {
	let payload = sample_toml_with("worker", "max_attempts", Value::Integer(0));

	expect_validation_message(&payload, "worker.max_attempts must be greater than zero.");
}
