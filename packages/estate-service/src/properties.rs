use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use estate_domain::PropertyType;
use estate_storage::{
	models::{NewProperty, Property, PropertyPatch, PropertyQuery},
	properties,
};

use crate::{Error, EstateService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatePropertyRequest {
	pub title: String,
	pub city: String,
	pub neighborhood: String,
	pub price: f64,
	pub area_m2: f64,
	#[serde(default)]
	pub property_type: PropertyType,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdatePropertyRequest {
	pub title: Option<String>,
	pub city: Option<String>,
	pub neighborhood: Option<String>,
	pub price: Option<f64>,
	pub area_m2: Option<f64>,
	pub property_type: Option<PropertyType>,
}

/// Listing filter. Text fields match case-insensitive substrings; bounds are inclusive; feature
/// fields only match properties that already have a feature record.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PropertyListRequest {
	pub city: Option<String>,
	pub neighborhood: Option<String>,
	pub property_type: Option<PropertyType>,
	pub min_price: Option<f64>,
	pub max_price: Option<f64>,
	pub min_area: Option<f64>,
	pub max_area: Option<f64>,
	pub near_subway: Option<bool>,
	pub needs_renovation: Option<bool>,
	pub recommended_use: Option<PropertyType>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropertyResponse {
	pub property_id: Uuid,
	pub title: String,
	pub city: String,
	pub neighborhood: String,
	pub price: f64,
	pub area_m2: f64,
	pub property_type: PropertyType,
	#[serde(with = "crate::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl TryFrom<Property> for PropertyResponse {
	type Error = Error;

	fn try_from(row: Property) -> Result<Self> {
		let property_type = PropertyType::parse(&row.property_type).ok_or_else(|| {
			Error::Storage {
				message: format!(
					"Property {} has unknown property_type {:?}.",
					row.property_id, row.property_type
				),
			}
		})?;

		Ok(Self {
			property_id: row.property_id,
			title: row.title,
			city: row.city,
			neighborhood: row.neighborhood,
			price: row.price,
			area_m2: row.area_m2,
			property_type,
			created_at: row.created_at,
			updated_at: row.updated_at,
		})
	}
}

impl EstateService {
	pub async fn create_property(&self, req: CreatePropertyRequest) -> Result<PropertyResponse> {
		let property = NewProperty {
			title: crate::require_text("title", &req.title)?,
			city: crate::require_text("city", &req.city)?,
			neighborhood: crate::require_text("neighborhood", &req.neighborhood)?,
			price: crate::require_non_negative("price", req.price)?,
			area_m2: crate::require_non_negative("area_m2", req.area_m2)?,
			property_type: req.property_type.as_str().to_string(),
		};
		let row = properties::insert_property(&self.db, &property).await?;

		tracing::info!(property_id = %row.property_id, "Property created.");

		row.try_into()
	}

	pub async fn list_properties(&self, req: PropertyListRequest) -> Result<Vec<PropertyResponse>> {
		validate_bounds("price", req.min_price, req.max_price)?;
		validate_bounds("area", req.min_area, req.max_area)?;

		let query = PropertyQuery {
			city: non_blank(req.city),
			neighborhood: non_blank(req.neighborhood),
			property_type: req.property_type.map(|kind| kind.as_str().to_string()),
			min_price: req.min_price,
			max_price: req.max_price,
			min_area: req.min_area,
			max_area: req.max_area,
			near_subway: req.near_subway,
			needs_renovation: req.needs_renovation,
			recommended_use: req.recommended_use.map(|kind| kind.as_str().to_string()),
		};
		let rows = properties::list_properties(&self.db, &query).await?;

		tracing::debug!(count = rows.len(), "Properties listed.");

		rows.into_iter().map(PropertyResponse::try_from).collect()
	}

	pub async fn get_property(&self, property_id: Uuid) -> Result<PropertyResponse> {
		properties::get_property(&self.db, property_id)
			.await?
			.ok_or_else(|| property_not_found(property_id))?
			.try_into()
	}

	pub async fn update_property(
		&self,
		property_id: Uuid,
		req: UpdatePropertyRequest,
	) -> Result<PropertyResponse> {
		let patch = PropertyPatch {
			title: req.title.as_deref().map(|value| crate::require_text("title", value)).transpose()?,
			city: req.city.as_deref().map(|value| crate::require_text("city", value)).transpose()?,
			neighborhood: req
				.neighborhood
				.as_deref()
				.map(|value| crate::require_text("neighborhood", value))
				.transpose()?,
			price: req.price.map(|value| crate::require_non_negative("price", value)).transpose()?,
			area_m2: req
				.area_m2
				.map(|value| crate::require_non_negative("area_m2", value))
				.transpose()?,
			property_type: req.property_type.map(|kind| kind.as_str().to_string()),
		};
		let row = properties::update_property(&self.db, property_id, &patch)
			.await?
			.ok_or_else(|| property_not_found(property_id))?;

		tracing::info!(property_id = %property_id, "Property updated.");

		row.try_into()
	}

	/// Soft-deletes the property along with its notes and feature.
	pub async fn delete_property(&self, property_id: Uuid) -> Result<()> {
		if !properties::soft_delete_property(&self.db, property_id).await? {
			return Err(property_not_found(property_id));
		}

		tracing::info!(property_id = %property_id, "Property deleted.");

		Ok(())
	}

	pub(crate) async fn require_property(&self, property_id: Uuid) -> Result<Property> {
		properties::get_property(&self.db, property_id)
			.await?
			.ok_or_else(|| property_not_found(property_id))
	}
}

pub(crate) fn property_not_found(property_id: Uuid) -> Error {
	tracing::warn!(property_id = %property_id, "Property not found.");

	Error::NotFound { message: format!("Property {property_id} not found.") }
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn validate_bounds(field: &str, min: Option<f64>, max: Option<f64>) -> Result<()> {
	for value in [min, max].into_iter().flatten() {
		if !value.is_finite() {
			return Err(Error::InvalidRequest {
				message: format!("{field} bounds must be finite numbers."),
			});
		}
	}

	if let (Some(min), Some(max)) = (min, max)
		&& min > max
	{
		return Err(Error::InvalidRequest {
			message: format!("min_{field} must not exceed max_{field}."),
		});
	}

	Ok(())
}
