//! Coercions for loosely typed completion JSON.
//!
//! Completion output is only nominally typed: booleans arrive as strings, numbers as text, and
//! fields go missing. These helpers read such values the way a dynamically typed caller would,
//! so that a value's meaning does not depend on which JSON type the model happened to emit.

use serde_json::Value;

/// Truthiness: `null`, `false`, `0`, and `""` are falsy; everything else, including the string
/// `"false"`, is truthy.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(flag) => *flag,
		Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
		Value::String(text) => !text.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

/// Numeric reading of a value. `None` stands for "not a number".
///
/// `null`, `false`, and blank strings read as `0`; `true` reads as `1`; strings are trimmed and
/// parsed. Arrays, objects, and non-finite results are not numbers.
pub fn to_number(value: &Value) -> Option<f64> {
	let number = match value {
		Value::Null => 0.0,
		Value::Bool(flag) => f64::from(u8::from(*flag)),
		Value::Number(number) => number.as_f64()?,
		Value::String(text) => {
			let trimmed = text.trim();

			if trimmed.is_empty() { 0.0 } else { trimmed.parse::<f64>().ok()? }
		},
		Value::Array(_) | Value::Object(_) => return None,
	};

	number.is_finite().then_some(number)
}

/// Text reading of a value. Strings pass through; scalars use their JSON spelling.
pub fn to_text(value: &Value) -> String {
	match value {
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn truthiness_follows_dynamic_rules() {
		assert!(is_truthy(&json!("false")));
		assert!(is_truthy(&json!("0")));
		assert!(is_truthy(&json!(1)));
		assert!(is_truthy(&json!([])));
		assert!(!is_truthy(&json!("")));
		assert!(!is_truthy(&json!(0)));
		assert!(!is_truthy(&json!(0.0)));
		assert!(!is_truthy(&json!(null)));
		assert!(!is_truthy(&json!(false)));
	}

	#[test]
	fn numbers_are_read_from_text_and_scalars() {
		assert_eq!(to_number(&json!(" 42 ")), Some(42.0));
		assert_eq!(to_number(&json!("")), Some(0.0));
		assert_eq!(to_number(&json!(null)), Some(0.0));
		assert_eq!(to_number(&json!(true)), Some(1.0));
		assert_eq!(to_number(&json!(12.5)), Some(12.5));
		assert_eq!(to_number(&json!("twelve")), None);
		assert_eq!(to_number(&json!("NaN")), None);
		assert_eq!(to_number(&json!({ "n": 1 })), None);
	}

	#[test]
	fn text_keeps_strings_verbatim() {
		assert_eq!(to_text(&json!("New York")), "New York");
		assert_eq!(to_text(&json!(500000)), "500000");
		assert_eq!(to_text(&json!(true)), "true");
	}
}
