//! Folding per-note extractions into one feature record.
//!
//! Inputs are ordered oldest first and the last element is treated as the latest note; nothing
//! here re-sorts. The fold is a pure function of its input, so recomputing from the same note set
//! always yields the same record.

use std::cmp::Ordering;

use crate::{NoteExtraction, PropertyFeature, PropertyType};

/// Returns whichever of `true`/`false` has strictly more votes, or `tiebreaker` on a tie
/// (including the empty case).
pub fn majority_vote_bool(values: &[bool], tiebreaker: bool) -> bool {
	let trues = values.iter().filter(|value| **value).count();
	let falses = values.len() - trues;

	match trues.cmp(&falses) {
		Ordering::Greater => true,
		Ordering::Less => false,
		Ordering::Equal => tiebreaker,
	}
}

/// Plurality vote over categorical values.
///
/// When several values share the top count, `tiebreaker` wins if it is one of them; otherwise the
/// leader that appeared first in `values` wins. An empty input returns `tiebreaker`.
pub fn majority_vote<T>(values: &[T], tiebreaker: T) -> T
where
	T: Copy + PartialEq,
{
	// First-seen order is kept so the fallback pick is stable for a given input order.
	let mut counts: Vec<(T, usize)> = Vec::new();

	for value in values {
		match counts.iter_mut().find(|(seen, _)| seen == value) {
			Some((_, count)) => *count += 1,
			None => counts.push((*value, 1)),
		}
	}

	let Some(top) = counts.iter().map(|(_, count)| *count).max() else {
		return tiebreaker;
	};
	let mut leaders = counts.iter().filter(|(_, count)| *count == top).map(|(value, _)| *value);

	if leaders.clone().any(|value| value == tiebreaker) {
		return tiebreaker;
	}

	leaders.next().unwrap_or(tiebreaker)
}

/// Arithmetic mean rounded half up. An empty input averages to `0`.
pub fn average_rounded(values: &[i32]) -> i32 {
	if values.is_empty() {
		return 0;
	}

	let sum: i64 = values.iter().map(|value| i64::from(*value)).sum();
	let mean = sum as f64 / values.len() as f64;

	crate::round_half_up(mean) as i32
}

/// Combines every note's extraction into the property's canonical feature.
///
/// Flags are majority-voted with the latest note breaking ties; an unset flag votes `false`.
/// Capacity is the rounded mean over all notes. Recommended use is a plurality vote over the
/// notes that name one; the latest note's use breaks ties, or the most recent named use when the
/// latest note has none. With no named use at all the record falls back to `office`.
///
/// An empty input yields [`PropertyFeature::default`].
pub fn aggregate(outputs: &[NoteExtraction]) -> PropertyFeature {
	let Some(latest) = outputs.last() else {
		return PropertyFeature::default();
	};
	let near_subway: Vec<bool> =
		outputs.iter().map(|output| output.near_subway.unwrap_or(false)).collect();
	let needs_renovation: Vec<bool> =
		outputs.iter().map(|output| output.needs_renovation.unwrap_or(false)).collect();
	let capacities: Vec<i32> =
		outputs.iter().map(|output| output.estimated_capacity_people).collect();
	let uses: Vec<PropertyType> =
		outputs.iter().filter_map(|output| output.recommended_use).collect();
	let recommended_use = match latest.recommended_use.or_else(|| uses.last().copied()) {
		Some(tiebreaker) => majority_vote(&uses, tiebreaker),
		None => PropertyType::default(),
	};

	PropertyFeature {
		near_subway: majority_vote_bool(&near_subway, latest.near_subway.unwrap_or(false)),
		needs_renovation: majority_vote_bool(
			&needs_renovation,
			latest.needs_renovation.unwrap_or(false),
		),
		estimated_capacity_people: average_rounded(&capacities),
		recommended_use,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn extraction(
		near_subway: Option<bool>,
		needs_renovation: Option<bool>,
		capacity: i32,
		recommended_use: Option<PropertyType>,
	) -> NoteExtraction {
		NoteExtraction {
			near_subway,
			needs_renovation,
			estimated_capacity_people: capacity,
			recommended_use,
		}
	}

	#[test]
	fn unset_flags_vote_false() {
		let outputs = [
			extraction(Some(true), None, 0, None),
			extraction(None, None, 0, None),
			extraction(None, Some(true), 0, None),
		];
		let feature = aggregate(&outputs);

		assert!(!feature.near_subway);
		assert!(!feature.needs_renovation);
	}

	#[test]
	fn unset_latest_use_defers_to_most_recent_named_use() {
		let outputs = [
			extraction(None, None, 0, Some(PropertyType::Retail)),
			extraction(None, None, 0, Some(PropertyType::Warehouse)),
			extraction(None, None, 0, None),
		];

		assert_eq!(aggregate(&outputs).recommended_use, PropertyType::Warehouse);
	}

	#[test]
	fn no_named_use_falls_back_to_office() {
		let outputs = [extraction(Some(true), Some(true), 10, None)];

		assert_eq!(aggregate(&outputs).recommended_use, PropertyType::Office);
	}

	#[test]
	fn unset_uses_do_not_outvote_named_ones() {
		let outputs = [
			extraction(None, None, 0, None),
			extraction(None, None, 0, None),
			extraction(None, None, 0, Some(PropertyType::Retail)),
		];

		assert_eq!(aggregate(&outputs).recommended_use, PropertyType::Retail);
	}

	#[test]
	fn large_capacities_do_not_overflow() {
		assert_eq!(average_rounded(&[i32::MAX, i32::MAX]), i32::MAX);
	}
}
