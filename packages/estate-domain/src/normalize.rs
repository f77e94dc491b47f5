use serde_json::{Map, Value};

use crate::{Error, NoteExtraction, PropertyType, Result, loose};

/// Turns a raw completion string into a typed extraction.
///
/// Fails only when the text is not a JSON object. Field-level oddities never fail: an explicit
/// `null` flag stays unset, a missing flag reads as `false`, any other flag value is judged by
/// truthiness (so the string `"false"` reads as `true`), a capacity that is not a positive number
/// becomes `0`, and an unknown use is left unset.
pub fn normalize(raw: &str) -> Result<NoteExtraction> {
	let value = parse_json(raw)?;

	normalize_value(&value)
}

pub fn normalize_value(value: &Value) -> Result<NoteExtraction> {
	let object = expect_object(value)?;

	Ok(NoteExtraction {
		near_subway: coerce_flag(object.get("nearSubway")),
		needs_renovation: coerce_flag(object.get("needsRenovation")),
		estimated_capacity_people: coerce_count(object.get("estimatedCapacityPeople")),
		recommended_use: object
			.get("recommendedUse")
			.and_then(Value::as_str)
			.and_then(PropertyType::parse),
	})
}

pub(crate) fn parse_json(raw: &str) -> Result<Value> {
	serde_json::from_str(raw).map_err(|err| Error::MalformedResponse {
		message: format!("Completion is not valid JSON: {err}."),
	})
}

pub(crate) fn expect_object(value: &Value) -> Result<&Map<String, Value>> {
	value.as_object().ok_or_else(|| Error::MalformedResponse {
		message: "Completion JSON must be an object.".to_string(),
	})
}

fn coerce_flag(value: Option<&Value>) -> Option<bool> {
	match value {
		Some(Value::Null) => None,
		Some(value) => Some(loose::is_truthy(value)),
		None => Some(false),
	}
}

fn coerce_count(value: Option<&Value>) -> i32 {
	let Some(number) = value.and_then(loose::to_number) else {
		return 0;
	};

	if number <= 0.0 {
		return 0;
	}

	crate::round_half_up(number).min(f64::from(i32::MAX)) as i32
}
