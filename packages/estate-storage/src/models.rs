use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Property {
	pub property_id: Uuid,
	pub title: String,
	pub city: String,
	pub neighborhood: String,
	pub price: f64,
	pub area_m2: f64,
	pub property_type: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct PropertyNote {
	pub note_id: Uuid,
	pub property_id: Uuid,
	pub author_id: Uuid,
	pub note_text: String,
	pub ai_output: Option<Value>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct PropertyFeatureRow {
	pub feature_id: Uuid,
	pub property_id: Uuid,
	pub near_subway: bool,
	pub needs_renovation: bool,
	pub estimated_capacity_people: i32,
	pub recommended_use: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct NoteAnalysisOutboxEntry {
	pub outbox_id: Uuid,
	pub note_id: Uuid,
	pub property_id: Uuid,
	pub status: String,
	pub attempts: i32,
	pub last_error: Option<String>,
	pub available_at: OffsetDateTime,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct NewProperty {
	pub title: String,
	pub city: String,
	pub neighborhood: String,
	pub price: f64,
	pub area_m2: f64,
	pub property_type: String,
}

/// Fields left as `None` keep their stored value.
#[derive(Clone, Debug, Default)]
pub struct PropertyPatch {
	pub title: Option<String>,
	pub city: Option<String>,
	pub neighborhood: Option<String>,
	pub price: Option<f64>,
	pub area_m2: Option<f64>,
	pub property_type: Option<String>,
}

/// Predicates for selecting active properties.
///
/// `city` and `neighborhood` match case-insensitive substrings, `property_type` matches exactly
/// and every bound is inclusive. The feature predicates only match properties that have a
/// feature record.
#[derive(Clone, Debug, Default)]
pub struct PropertyQuery {
	pub city: Option<String>,
	pub neighborhood: Option<String>,
	pub property_type: Option<String>,
	pub min_price: Option<f64>,
	pub max_price: Option<f64>,
	pub min_area: Option<f64>,
	pub max_area: Option<f64>,
	pub near_subway: Option<bool>,
	pub needs_renovation: Option<bool>,
	pub recommended_use: Option<String>,
}
impl PropertyQuery {
	pub fn has_feature_predicates(&self) -> bool {
		self.near_subway.is_some()
			|| self.needs_renovation.is_some()
			|| self.recommended_use.is_some()
	}
}
