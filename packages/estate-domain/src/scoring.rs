//! Scoring candidates against query filters.
//!
//! Hard filters have already narrowed the candidates before they reach this module, so each one
//! is credited unconditionally. Soft fields are compared against the candidate's feature record.

use crate::{NoteExtraction, PropertyFeature, PropertyType, QueryFilters};

pub const MAX_SCORE: u8 = 10;

/// A feature expectation that contributes to the score without excluding anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoftField {
	NearSubway(bool),
	NeedsRenovation(bool),
	RecommendedUse(PropertyType),
	EstimatedCapacityPeople(i32),
}
impl SoftField {
	pub fn matches(&self, feature: &PropertyFeature) -> bool {
		match *self {
			Self::NearSubway(expected) => feature.near_subway == expected,
			Self::NeedsRenovation(expected) => feature.needs_renovation == expected,
			Self::RecommendedUse(expected) => feature.recommended_use == expected,
			Self::EstimatedCapacityPeople(expected) =>
				feature.estimated_capacity_people == expected,
		}
	}
}

/// Expected values that count toward the score. Capacity only counts when it is positive.
pub fn relevant_soft_fields(expected: &NoteExtraction) -> Vec<SoftField> {
	let mut fields = Vec::with_capacity(4);

	if let Some(value) = expected.near_subway {
		fields.push(SoftField::NearSubway(value));
	}
	if let Some(value) = expected.needs_renovation {
		fields.push(SoftField::NeedsRenovation(value));
	}
	if let Some(value) = expected.recommended_use {
		fields.push(SoftField::RecommendedUse(value));
	}
	if expected.estimated_capacity_people > 0 {
		fields.push(SoftField::EstimatedCapacityPeople(expected.estimated_capacity_people));
	}

	fields
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scored<T> {
	pub item: T,
	pub score: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoringPlan {
	pub hard_filter_count: usize,
	pub soft_fields: Vec<SoftField>,
}
impl ScoringPlan {
	pub fn from_filters(filters: &QueryFilters) -> Self {
		Self {
			hard_filter_count: filters.hard_filter_count(),
			soft_fields: relevant_soft_fields(&filters.expected),
		}
	}

	pub fn total_fields(&self) -> usize {
		self.hard_filter_count + self.soft_fields.len()
	}

	/// A candidate without a feature record earns only the hard-filter credit.
	pub fn match_count(&self, feature: Option<&PropertyFeature>) -> usize {
		let soft = feature.map_or(0, |feature| {
			self.soft_fields.iter().filter(|field| field.matches(feature)).count()
		});

		self.hard_filter_count + soft
	}

	/// Score in `0..=MAX_SCORE`. A plan with no fields scores every candidate `0`.
	pub fn score(&self, feature: Option<&PropertyFeature>) -> u8 {
		let total = self.total_fields();

		if total == 0 {
			return 0;
		}

		let ratio = self.match_count(feature) as f64 / total as f64;

		crate::round_half_up(ratio * f64::from(MAX_SCORE)).clamp(0.0, f64::from(MAX_SCORE)) as u8
	}
}

/// Scores every candidate and orders them by descending score. Candidates with equal scores keep
/// their input order.
pub fn rank<T, F>(plan: &ScoringPlan, candidates: Vec<T>, feature_of: F) -> Vec<Scored<T>>
where
	F: Fn(&T) -> Option<&PropertyFeature>,
{
	let mut scored: Vec<Scored<T>> = candidates
		.into_iter()
		.map(|item| {
			let score = plan.score(feature_of(&item));

			Scored { item, score }
		})
		.collect();

	scored.sort_by(|a, b| b.score.cmp(&a.score));

	scored
}
