use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Result,
	db::Db,
	models::{NewProperty, Property, PropertyFeatureRow, PropertyPatch, PropertyQuery},
};

const PROPERTY_COLUMNS: &str = "\
property_id,
	title,
	city,
	neighborhood,
	price,
	area_m2,
	property_type,
	created_at,
	updated_at,
	deleted_at";

pub async fn insert_property(db: &Db, property: &NewProperty) -> Result<Property> {
	let now = OffsetDateTime::now_utc();
	let sql = format!(
		"\
INSERT INTO properties (
	property_id,
	title,
	city,
	neighborhood,
	price,
	area_m2,
	property_type,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
RETURNING
	{PROPERTY_COLUMNS}"
	);
	let row = sqlx::query_as::<_, Property>(&sql)
		.bind(Uuid::new_v4())
		.bind(property.title.as_str())
		.bind(property.city.as_str())
		.bind(property.neighborhood.as_str())
		.bind(property.price)
		.bind(property.area_m2)
		.bind(property.property_type.as_str())
		.bind(now)
		.fetch_one(&db.pool)
		.await?;

	Ok(row)
}

pub async fn get_property(db: &Db, property_id: Uuid) -> Result<Option<Property>> {
	let sql = format!(
		"\
SELECT
	{PROPERTY_COLUMNS}
FROM properties
WHERE property_id = $1 AND deleted_at IS NULL"
	);
	let row = sqlx::query_as::<_, Property>(&sql).bind(property_id).fetch_optional(&db.pool).await?;

	Ok(row)
}

pub async fn update_property(
	db: &Db,
	property_id: Uuid,
	patch: &PropertyPatch,
) -> Result<Option<Property>> {
	let sql = format!(
		"\
UPDATE properties
SET
	title = COALESCE($2, title),
	city = COALESCE($3, city),
	neighborhood = COALESCE($4, neighborhood),
	price = COALESCE($5, price),
	area_m2 = COALESCE($6, area_m2),
	property_type = COALESCE($7, property_type),
	updated_at = $8
WHERE property_id = $1 AND deleted_at IS NULL
RETURNING
	{PROPERTY_COLUMNS}"
	);
	let row = sqlx::query_as::<_, Property>(&sql)
		.bind(property_id)
		.bind(patch.title.as_deref())
		.bind(patch.city.as_deref())
		.bind(patch.neighborhood.as_deref())
		.bind(patch.price)
		.bind(patch.area_m2)
		.bind(patch.property_type.as_deref())
		.bind(OffsetDateTime::now_utc())
		.fetch_optional(&db.pool)
		.await?;

	Ok(row)
}

/// Soft-deletes the property together with its notes and feature. Returns `false` when no
/// active property has the id.
pub async fn soft_delete_property(db: &Db, property_id: Uuid) -> Result<bool> {
	let now = OffsetDateTime::now_utc();
	let mut tx = db.pool.begin().await?;
	let deleted = sqlx::query(
		"\
UPDATE properties
SET deleted_at = $2, updated_at = $2
WHERE property_id = $1 AND deleted_at IS NULL",
	)
	.bind(property_id)
	.bind(now)
	.execute(&mut *tx)
	.await?
	.rows_affected();

	if deleted == 0 {
		tx.rollback().await?;

		return Ok(false);
	}

	sqlx::query(
		"\
UPDATE property_notes
SET deleted_at = $2, updated_at = $2
WHERE property_id = $1 AND deleted_at IS NULL",
	)
	.bind(property_id)
	.bind(now)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"\
UPDATE property_features
SET deleted_at = $2, updated_at = $2
WHERE property_id = $1 AND deleted_at IS NULL",
	)
	.bind(property_id)
	.bind(now)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(true)
}

/// Active properties matching `query`, oldest first.
pub async fn list_properties(db: &Db, query: &PropertyQuery) -> Result<Vec<Property>> {
	let mut builder = QueryBuilder::<Postgres>::new("SELECT ");

	builder.push(qualified_columns("p"));
	builder.push(" FROM properties p");

	if query.has_feature_predicates() {
		builder.push(
			" JOIN property_features f ON f.property_id = p.property_id AND f.deleted_at IS NULL",
		);
	}

	builder.push(" WHERE p.deleted_at IS NULL");

	if let Some(city) = query.city.as_deref() {
		builder.push(" AND p.city ILIKE ").push_bind(contains_pattern(city));
	}
	if let Some(neighborhood) = query.neighborhood.as_deref() {
		builder.push(" AND p.neighborhood ILIKE ").push_bind(contains_pattern(neighborhood));
	}
	if let Some(property_type) = query.property_type.as_deref() {
		builder.push(" AND p.property_type = ").push_bind(property_type.to_lowercase());
	}
	if let Some(min_price) = query.min_price {
		builder.push(" AND p.price >= ").push_bind(min_price);
	}
	if let Some(max_price) = query.max_price {
		builder.push(" AND p.price <= ").push_bind(max_price);
	}
	if let Some(min_area) = query.min_area {
		builder.push(" AND p.area_m2 >= ").push_bind(min_area);
	}
	if let Some(max_area) = query.max_area {
		builder.push(" AND p.area_m2 <= ").push_bind(max_area);
	}
	if let Some(near_subway) = query.near_subway {
		builder.push(" AND f.near_subway = ").push_bind(near_subway);
	}
	if let Some(needs_renovation) = query.needs_renovation {
		builder.push(" AND f.needs_renovation = ").push_bind(needs_renovation);
	}
	if let Some(recommended_use) = query.recommended_use.as_deref() {
		builder.push(" AND f.recommended_use = ").push_bind(recommended_use.to_lowercase());
	}

	builder.push(" ORDER BY p.created_at ASC, p.property_id ASC");

	let rows = builder.build_query_as::<Property>().fetch_all(&db.pool).await?;

	Ok(rows)
}

/// Active feature records for the given properties, in no particular order.
pub async fn features_for_properties(
	db: &Db,
	property_ids: &[Uuid],
) -> Result<Vec<PropertyFeatureRow>> {
	if property_ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, PropertyFeatureRow>(
		"\
SELECT
	feature_id,
	property_id,
	near_subway,
	needs_renovation,
	estimated_capacity_people,
	recommended_use,
	created_at,
	updated_at,
	deleted_at
FROM property_features
WHERE property_id = ANY($1) AND deleted_at IS NULL",
	)
	.bind(property_ids)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

fn qualified_columns(alias: &str) -> String {
	PROPERTY_COLUMNS
		.split(',')
		.map(|column| format!("{alias}.{}", column.trim()))
		.collect::<Vec<_>>()
		.join(", ")
}

/// `LIKE` pattern matching `needle` anywhere, with its own wildcards escaped.
fn contains_pattern(needle: &str) -> String {
	let mut pattern = String::with_capacity(needle.len() + 2);

	pattern.push('%');

	for ch in needle.chars() {
		if matches!(ch, '\\' | '%' | '_') {
			pattern.push('\\');
		}

		pattern.push(ch);
	}

	pattern.push('%');

	pattern
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn escapes_like_wildcards() {
		assert_eq!(contains_pattern("New York"), "%New York%");
		assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
	}

	#[test]
	fn qualifies_every_column() {
		let columns = qualified_columns("p");

		assert!(columns.starts_with("p.property_id, p.title"));
		assert!(columns.ends_with("p.deleted_at"));
		assert_eq!(columns.matches("p.").count(), 10);
	}
}
