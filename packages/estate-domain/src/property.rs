use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
	#[default]
	Office,
	Warehouse,
	Retail,
}
impl PropertyType {
	pub const ALL: [Self; 3] = [Self::Office, Self::Warehouse, Self::Retail];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Office => "office",
			Self::Warehouse => "warehouse",
			Self::Retail => "retail",
		}
	}

	/// Case-insensitive lookup. Anything outside the enum yields `None`.
	pub fn parse(raw: &str) -> Option<Self> {
		let lowered = raw.to_lowercase();

		Self::ALL.into_iter().find(|kind| kind.as_str() == lowered)
	}
}
impl fmt::Display for PropertyType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for PropertyType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s).ok_or_else(|| Error::UnknownPropertyType { value: s.to_string() })
	}
}

/// One completion's reading of a single note.
///
/// Serialized with the completion's own camelCase keys; this is the shape stored as a note's AI
/// output. Unset values serialize as `null`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteExtraction {
	#[serde(default)]
	pub near_subway: Option<bool>,
	#[serde(default)]
	pub needs_renovation: Option<bool>,
	#[serde(default)]
	pub estimated_capacity_people: i32,
	#[serde(default)]
	pub recommended_use: Option<PropertyType>,
}

/// The canonical feature record of a property. Every field is always populated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFeature {
	pub near_subway: bool,
	pub needs_renovation: bool,
	pub estimated_capacity_people: i32,
	pub recommended_use: PropertyType,
}
impl Default for PropertyFeature {
	fn default() -> Self {
		Self {
			near_subway: false,
			needs_renovation: false,
			estimated_capacity_people: 0,
			recommended_use: PropertyType::Office,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_property_types_case_insensitively() {
		assert_eq!(PropertyType::parse("OFFICE"), Some(PropertyType::Office));
		assert_eq!(PropertyType::parse("Warehouse"), Some(PropertyType::Warehouse));
		assert_eq!(PropertyType::parse("retail"), Some(PropertyType::Retail));
		assert_eq!(PropertyType::parse("invalid_type"), None);
		assert_eq!(PropertyType::parse(" office"), None);
	}

	#[test]
	fn from_str_reports_unknown_values() {
		let err = "loft".parse::<PropertyType>().expect_err("Expected unknown type.");

		assert!(matches!(err, Error::UnknownPropertyType { value } if value == "loft"));
	}

	#[test]
	fn extraction_serializes_unset_fields_as_null() {
		let json = serde_json::to_value(NoteExtraction::default()).expect("Serialize failed.");

		assert_eq!(
			json,
			serde_json::json!({
				"nearSubway": null,
				"needsRenovation": null,
				"estimatedCapacityPeople": 0,
				"recommendedUse": null,
			})
		);
	}
}
