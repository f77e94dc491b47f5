use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use estate_storage::{db::Db, models::NewProperty, notes, outbox, properties};

#[tokio::test]
#[ignore = "Requires external Postgres. Set ESTATE_PG_DSN to run."]
async fn note_creation_queues_a_claimable_job() {
	let Some(base_dsn) = estate_testkit::env_dsn() else {
		eprintln!("Skipping note_creation_queues_a_claimable_job; set ESTATE_PG_DSN to run this test.");

		return;
	};
	let test_db =
		estate_testkit::TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = estate_config::Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let property = properties::insert_property(
		&db,
		&NewProperty {
			title: "Loft".to_string(),
			city: "New York".to_string(),
			neighborhood: "Soho".to_string(),
			price: 1.0,
			area_m2: 1.0,
			property_type: "office".to_string(),
		},
	)
	.await
	.expect("Insert failed.");
	let note =
		notes::insert_note_with_analysis_job(&db, property.property_id, Uuid::new_v4(), "Near metro.")
			.await
			.expect("Insert failed.");
	let now = OffsetDateTime::now_utc() + Duration::seconds(1);
	let job = outbox::claim_next(&db, now, Duration::seconds(30), 3)
		.await
		.expect("Claim failed.")
		.expect("Expected a pending job.");

	assert_eq!(job.note_id, note.note_id);
	assert_eq!(job.property_id, property.property_id);
	assert_eq!(job.status, "PENDING");
	assert_eq!(job.available_at, now + Duration::seconds(30));

	// The lease hides the job from other claimers.
	assert!(outbox::claim_next(&db, now, Duration::seconds(30), 3).await.expect("Claim failed.").is_none());

	outbox::mark_failed(&db, job.outbox_id, 3, "boom", now)
		.await
		.expect("Mark failed.");

	// Attempts are exhausted.
	assert!(outbox::claim_next(&db, now, Duration::seconds(30), 3).await.expect("Claim failed.").is_none());

	outbox::mark_done(&db, job.outbox_id).await.expect("Mark done failed.");

	let stored = outbox::get_job(&db, job.outbox_id).await.expect("Get failed.").expect("Missing job.");

	assert_eq!(stored.status, "DONE");
	assert_eq!(stored.attempts, 3);
	assert_eq!(stored.last_error.as_deref(), Some("boom"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
