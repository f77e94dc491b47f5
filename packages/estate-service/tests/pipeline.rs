use std::sync::Arc;

use serde_json::Map;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use estate_config::{
	Config, Extraction, LlmProviderConfig, Postgres, Providers as ProviderSettings, Security,
	Service, Storage, Worker,
};
use estate_domain::{PropertyFeature, PropertyType};
use estate_service::{
	BoxFuture, CompletionProvider, CreateFeatureRequest, CreateNoteRequest, CreatePropertyRequest,
	Error, EstateService, Providers,
};
use estate_storage::{db::Db, outbox};
use estate_testkit::TestDatabase;

/// Answers note analyses by keyword and filter extractions with a fixed document.
struct KeywordCompletion {
	filters: String,
}
impl CompletionProvider for KeywordCompletion {
	fn complete<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		system_prompt: &'a str,
		user_text: &'a str,
		_max_tokens: u32,
	) -> BoxFuture<'a, estate_providers::Result<String>> {
		let reply = if system_prompt == estate_providers::prompts::filter_extraction_system_prompt()
		{
			self.filters.clone()
		} else if user_text.contains("metro") {
			r#"{"nearSubway": true, "needsRenovation": false, "estimatedCapacityPeople": 20, "recommendedUse": "Office"}"#
				.to_string()
		} else if user_text.contains("garbage") {
			"not json".to_string()
		} else {
			r#"{"nearSubway": false, "needsRenovation": true, "estimatedCapacityPeople": 10, "recommendedUse": null}"#
				.to_string()
		};

		Box::pin(async move { Ok(reply) })
	}
}

fn test_config(dsn: &str) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:8080".to_string(), log_level: "info".to_string() },
		storage: Storage { postgres: Postgres { dsn: dsn.to_string(), pool_max_conns: 2 } },
		providers: ProviderSettings {
			llm: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:9".to_string(),
				api_key: "key".to_string(),
				path: "/chat/completions".to_string(),
				model: "m".to_string(),
				temperature: 0.0,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		extraction: Extraction::default(),
		worker: Worker::default(),
		security: Security { bind_localhost_only: true },
	}
}

async fn service_for(test_db: &TestDatabase, filters: &str) -> EstateService {
	let cfg = test_config(test_db.dsn());
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	EstateService::with_providers(
		cfg,
		db,
		Providers::new(Arc::new(KeywordCompletion { filters: filters.to_string() })),
	)
}

fn listing(title: &str, city: &str, price: f64) -> CreatePropertyRequest {
	CreatePropertyRequest {
		title: title.to_string(),
		city: city.to_string(),
		neighborhood: "Midtown".to_string(),
		price,
		area_m2: 120.0,
		property_type: PropertyType::Office,
	}
}

async fn drain_outbox(service: &EstateService) -> usize {
	let mut processed = 0;
	let later = OffsetDateTime::now_utc() + Duration::seconds(5);

	while let Some(job) = outbox::claim_next(&service.db, later, Duration::seconds(30), 5)
		.await
		.expect("Claim failed.")
	{
		match service.process_note_job(&job).await {
			Ok(_) => outbox::mark_done(&service.db, job.outbox_id).await.expect("Mark failed."),
			Err(err) => outbox::mark_failed(&service.db, job.outbox_id, 5, &err.to_string(), later)
				.await
				.expect("Mark failed."),
		}

		processed += 1;
	}

	processed
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set ESTATE_PG_DSN to run."]
async fn analyzed_notes_aggregate_into_a_feature() {
	let Some(base_dsn) = estate_testkit::env_dsn() else {
		eprintln!("Skipping analyzed_notes_aggregate_into_a_feature; set ESTATE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service_for(&test_db, "{}").await;
	let property = service.create_property(listing("Loft", "New York", 1.0)).await.expect("Create failed.");
	let author = Uuid::new_v4();

	for text in ["Right by the metro.", "Walls need work.", "Close to the metro line."] {
		service
			.create_note(author, CreateNoteRequest { property_id: property.property_id, note_text: text.to_string() })
			.await
			.expect("Note creation failed.");
	}

	assert!(service.get_feature_by_property(property.property_id).await.is_err());
	assert_eq!(drain_outbox(&service).await, 3);

	let feature = service.get_feature_by_property(property.property_id).await.expect("Missing feature.");

	assert_eq!(
		feature.feature,
		PropertyFeature {
			near_subway: true,
			needs_renovation: false,
			estimated_capacity_people: 17,
			recommended_use: PropertyType::Office,
		}
	);

	let notes = service.list_notes(property.property_id).await.expect("List failed.");

	assert_eq!(notes.len(), 3);
	assert_eq!(notes[0].note_text, "Close to the metro line.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set ESTATE_PG_DSN to run."]
async fn malformed_analysis_leaves_the_feature_untouched() {
	let Some(base_dsn) = estate_testkit::env_dsn() else {
		eprintln!("Skipping malformed_analysis_leaves_the_feature_untouched; set ESTATE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = service_for(&test_db, "{}").await;
	let property = service.create_property(listing("Loft", "New York", 1.0)).await.expect("Create failed.");
	let note = service
		.create_note(
			Uuid::new_v4(),
			CreateNoteRequest { property_id: property.property_id, note_text: "garbage".to_string() },
		)
		.await
		.expect("Note creation failed.");
	let err = service.analyze_note(note.note_id).await.expect_err("Expected analysis to fail.");

	assert!(matches!(err, Error::MalformedResponse { .. }));
	assert_eq!(service.recompute_feature(property.property_id).await.expect("Recompute failed."), None);
	assert!(matches!(
		service.get_feature_by_property(property.property_id).await,
		Err(Error::NotFound { .. })
	));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set ESTATE_PG_DSN to run."]
async fn rank_scores_candidates_against_their_features() {
	let Some(base_dsn) = estate_testkit::env_dsn() else {
		eprintln!("Skipping rank_scores_candidates_against_their_features; set ESTATE_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let filters = r#"{
		"city": "New York",
		"neighborhood": null,
		"propertyType": null,
		"minPrice": null,
		"maxPrice": 500000,
		"minArea": null,
		"maxArea": null,
		"nearSubway": true,
		"needsRenovation": false,
		"recommendedUse": "office",
		"estimatedCapacityPeople": 20
	}"#;
	let service = service_for(&test_db, filters).await;
	let partial = service.create_property(listing("Partial", "New York", 300_000.0)).await.expect("Create failed.");
	let bare = service.create_property(listing("Bare", "new york", 200_000.0)).await.expect("Create failed.");
	let best = service.create_property(listing("Best", "New York", 400_000.0)).await.expect("Create failed.");
	let _expensive = service.create_property(listing("Pricey", "New York", 900_000.0)).await.expect("Create failed.");
	let _elsewhere = service.create_property(listing("Far", "Boston", 100_000.0)).await.expect("Create failed.");

	service
		.create_feature(CreateFeatureRequest {
			property_id: best.property_id,
			near_subway: true,
			needs_renovation: false,
			estimated_capacity_people: Some(20),
			recommended_use: Some(PropertyType::Office),
		})
		.await
		.expect("Feature creation failed.");
	service
		.create_feature(CreateFeatureRequest {
			property_id: partial.property_id,
			near_subway: false,
			needs_renovation: true,
			estimated_capacity_people: Some(20),
			recommended_use: None,
		})
		.await
		.expect("Feature creation failed.");

	let ranked = service.rank("Offices near the subway in New York up to 500k").await.expect("Rank failed.");
	let order = ranked.iter().map(|scored| (scored.property.property_id, scored.score)).collect::<Vec<_>>();

	assert_eq!(
		order,
		vec![(best.property_id, 10), (partial.property_id, 7), (bare.property_id, 3)]
	);
	assert!(ranked[2].feature.is_none());

	let err = service
		.create_feature(CreateFeatureRequest {
			property_id: best.property_id,
			near_subway: false,
			needs_renovation: false,
			estimated_capacity_people: None,
			recommended_use: None,
		})
		.await
		.expect_err("Expected a second feature to conflict.");

	assert!(matches!(err, Error::Conflict { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
