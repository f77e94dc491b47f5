use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use estate_domain::{PropertyFeature, PropertyType};
use estate_storage::{features, models::PropertyFeatureRow};

use crate::{Error, EstateService, Result};

/// Missing capacity defaults to `0` and a missing use to `office`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateFeatureRequest {
	pub property_id: Uuid,
	#[serde(default)]
	pub near_subway: bool,
	#[serde(default)]
	pub needs_renovation: bool,
	pub estimated_capacity_people: Option<i32>,
	pub recommended_use: Option<PropertyType>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeatureResponse {
	pub feature_id: Uuid,
	pub property_id: Uuid,
	#[serde(flatten)]
	pub feature: PropertyFeature,
	#[serde(with = "crate::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl TryFrom<PropertyFeatureRow> for FeatureResponse {
	type Error = Error;

	fn try_from(row: PropertyFeatureRow) -> Result<Self> {
		let recommended_use = PropertyType::parse(&row.recommended_use).ok_or_else(|| {
			Error::Storage {
				message: format!(
					"Feature {} has unknown recommended_use {:?}.",
					row.feature_id, row.recommended_use
				),
			}
		})?;

		Ok(Self {
			feature_id: row.feature_id,
			property_id: row.property_id,
			feature: PropertyFeature {
				near_subway: row.near_subway,
				needs_renovation: row.needs_renovation,
				estimated_capacity_people: row.estimated_capacity_people,
				recommended_use,
			},
			created_at: row.created_at,
			updated_at: row.updated_at,
		})
	}
}

impl EstateService {
	/// Fails with [`Error::Conflict`] when the property already has a feature record.
	pub async fn create_feature(&self, req: CreateFeatureRequest) -> Result<FeatureResponse> {
		let capacity = req.estimated_capacity_people.unwrap_or(0);

		if capacity < 0 {
			return Err(Error::InvalidRequest {
				message: "estimated_capacity_people must be greater than or equal to zero."
					.to_string(),
			});
		}

		self.require_property(req.property_id).await?;

		let feature = PropertyFeature {
			near_subway: req.near_subway,
			needs_renovation: req.needs_renovation,
			estimated_capacity_people: capacity,
			recommended_use: req.recommended_use.unwrap_or_default(),
		};
		let row = features::insert_feature(&self.db, req.property_id, &feature).await.map_err(
			|err| {
				if matches!(err, estate_storage::Error::Conflict(_)) {
					tracing::warn!(property_id = %req.property_id, "Property feature already exists.");
				}

				Error::from(err)
			},
		)?;

		tracing::info!(
			feature_id = %row.feature_id,
			property_id = %row.property_id,
			"Property feature created."
		);

		row.try_into()
	}

	pub async fn get_feature(&self, feature_id: Uuid) -> Result<FeatureResponse> {
		features::get_feature(&self.db, feature_id)
			.await?
			.ok_or_else(|| {
				tracing::warn!(feature_id = %feature_id, "Property feature not found.");

				Error::NotFound { message: format!("Feature {feature_id} not found.") }
			})?
			.try_into()
	}

	pub async fn get_feature_by_property(&self, property_id: Uuid) -> Result<FeatureResponse> {
		features::get_feature_by_property(&self.db, property_id)
			.await?
			.ok_or_else(|| {
				tracing::warn!(property_id = %property_id, "Property feature not found.");

				Error::NotFound { message: format!("Feature for property {property_id} not found.") }
			})?
			.try_into()
	}

	/// Replaces the property's feature record wholesale, creating it when absent.
	pub async fn upsert_feature(
		&self,
		property_id: Uuid,
		feature: &PropertyFeature,
	) -> Result<FeatureResponse> {
		let row = features::upsert_feature(&self.db, property_id, feature).await?;

		tracing::info!(property_id = %property_id, feature_id = %row.feature_id, "Property feature upserted.");

		row.try_into()
	}
}
