use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use estate_domain::{QueryFilters, ScoringPlan, scoring};
use estate_storage::{models::PropertyQuery, properties};

use crate::{EstateService, FeatureResponse, PropertyResponse, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankRequest {
	pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoredProperty {
	pub property: PropertyResponse,
	pub feature: Option<FeatureResponse>,
	pub score: u8,
}

impl EstateService {
	/// Ranks active properties against a free-text request, best score first.
	///
	/// Hard criteria select the candidates; soft feature expectations only affect the score.
	/// Candidates with equal scores keep their storage order.
	pub async fn rank(&self, text: &str) -> Result<Vec<ScoredProperty>> {
		let raw = self.extract_filters(text).await?;
		let filters = QueryFilters::parse(&raw)?;
		let plan = ScoringPlan::from_filters(&filters);
		let rows = properties::list_properties(&self.db, &candidate_query(&filters)).await?;
		let ids = rows.iter().map(|row| row.property_id).collect::<Vec<_>>();
		let mut features = properties::features_for_properties(&self.db, &ids)
			.await?
			.into_iter()
			.map(|row| Ok((row.property_id, FeatureResponse::try_from(row)?)))
			.collect::<Result<HashMap<Uuid, FeatureResponse>>>()?;
		let candidates = rows
			.into_iter()
			.map(|row| {
				let feature = features.remove(&row.property_id);

				Ok((PropertyResponse::try_from(row)?, feature))
			})
			.collect::<Result<Vec<_>>>()?;
		let ranked = scoring::rank(&plan, candidates, |(_, feature)| {
			feature.as_ref().map(|feature| &feature.feature)
		});

		tracing::info!(
			candidates = ranked.len(),
			hard_filters = plan.hard_filter_count,
			soft_fields = plan.soft_fields.len(),
			"Properties ranked."
		);

		Ok(ranked
			.into_iter()
			.map(|scored| {
				let (property, feature) = scored.item;

				ScoredProperty { property, feature, score: scored.score }
			})
			.collect())
	}
}

/// Store predicates for the hard criteria. A range whose bounds are both unusable still counts
/// toward the score but adds no predicate.
fn candidate_query(filters: &QueryFilters) -> PropertyQuery {
	PropertyQuery {
		city: filters.city.clone(),
		neighborhood: filters.neighborhood.clone(),
		property_type: filters.property_type.clone(),
		min_price: filters.price.and_then(|range| range.min),
		max_price: filters.price.and_then(|range| range.max),
		min_area: filters.area.and_then(|range| range.min),
		max_area: filters.area.and_then(|range| range.max),
		..Default::default()
	}
}
