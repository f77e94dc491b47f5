use time::OffsetDateTime;
use uuid::Uuid;

use estate_domain::PropertyFeature;

use crate::{Error, Result, db::Db, models::PropertyFeatureRow};

const FEATURE_COLUMNS: &str = "\
feature_id,
	property_id,
	near_subway,
	needs_renovation,
	estimated_capacity_people,
	recommended_use,
	created_at,
	updated_at,
	deleted_at";

/// Fails with [`Error::Conflict`] when the property already has a feature record.
pub async fn insert_feature(
	db: &Db,
	property_id: Uuid,
	feature: &PropertyFeature,
) -> Result<PropertyFeatureRow> {
	let now = OffsetDateTime::now_utc();
	let sql = format!(
		"\
INSERT INTO property_features (
	feature_id,
	property_id,
	near_subway,
	needs_renovation,
	estimated_capacity_people,
	recommended_use,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
RETURNING
	{FEATURE_COLUMNS}"
	);

	sqlx::query_as::<_, PropertyFeatureRow>(&sql)
		.bind(Uuid::new_v4())
		.bind(property_id)
		.bind(feature.near_subway)
		.bind(feature.needs_renovation)
		.bind(feature.estimated_capacity_people)
		.bind(feature.recommended_use.as_str())
		.bind(now)
		.fetch_one(&db.pool)
		.await
		.map_err(|err| {
			if Error::is_unique_violation(&err) {
				Error::Conflict(format!("feature for property {property_id}"))
			} else {
				Error::Sqlx(err)
			}
		})
}

/// Replaces the property's feature record, creating it when absent.
pub async fn upsert_feature(
	db: &Db,
	property_id: Uuid,
	feature: &PropertyFeature,
) -> Result<PropertyFeatureRow> {
	let now = OffsetDateTime::now_utc();
	let sql = format!(
		"\
INSERT INTO property_features (
	feature_id,
	property_id,
	near_subway,
	needs_renovation,
	estimated_capacity_people,
	recommended_use,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
ON CONFLICT (property_id) DO UPDATE
SET
	near_subway = EXCLUDED.near_subway,
	needs_renovation = EXCLUDED.needs_renovation,
	estimated_capacity_people = EXCLUDED.estimated_capacity_people,
	recommended_use = EXCLUDED.recommended_use,
	updated_at = EXCLUDED.updated_at,
	deleted_at = NULL
RETURNING
	{FEATURE_COLUMNS}"
	);
	let row = sqlx::query_as::<_, PropertyFeatureRow>(&sql)
		.bind(Uuid::new_v4())
		.bind(property_id)
		.bind(feature.near_subway)
		.bind(feature.needs_renovation)
		.bind(feature.estimated_capacity_people)
		.bind(feature.recommended_use.as_str())
		.bind(now)
		.fetch_one(&db.pool)
		.await?;

	Ok(row)
}

pub async fn get_feature(db: &Db, feature_id: Uuid) -> Result<Option<PropertyFeatureRow>> {
	let sql = format!(
		"\
SELECT
	{FEATURE_COLUMNS}
FROM property_features
WHERE feature_id = $1 AND deleted_at IS NULL"
	);
	let row = sqlx::query_as::<_, PropertyFeatureRow>(&sql)
		.bind(feature_id)
		.fetch_optional(&db.pool)
		.await?;

	Ok(row)
}

pub async fn get_feature_by_property(
	db: &Db,
	property_id: Uuid,
) -> Result<Option<PropertyFeatureRow>> {
	let sql = format!(
		"\
SELECT
	{FEATURE_COLUMNS}
FROM property_features
WHERE property_id = $1 AND deleted_at IS NULL"
	);
	let row = sqlx::query_as::<_, PropertyFeatureRow>(&sql)
		.bind(property_id)
		.fetch_optional(&db.pool)
		.await?;

	Ok(row)
}
