use serde_json::{Map, Value};

use crate::{NoteExtraction, Result, loose, normalize};

/// An inclusive numeric interval where either side may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NumericRange {
	pub min: Option<f64>,
	pub max: Option<f64>,
}
impl NumericRange {
	pub fn contains(&self, value: f64) -> bool {
		self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
	}
}

/// Search criteria read from one filter-extraction completion.
///
/// Hard filters (`city` through `area`) narrow the candidate set. `expected` holds the soft
/// feature expectations, read with the same rules as note extractions, and is only used to score.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryFilters {
	pub city: Option<String>,
	pub neighborhood: Option<String>,
	pub property_type: Option<String>,
	pub price: Option<NumericRange>,
	pub area: Option<NumericRange>,
	pub expected: NoteExtraction,
}
impl QueryFilters {
	pub fn parse(raw: &str) -> Result<Self> {
		let value = normalize::parse_json(raw)?;

		Self::from_value(&value)
	}

	/// Text filters apply when their value is truthy. A range applies when either bound is
	/// truthy; its bounds are then read numerically, and a bound that is `null` or not a number
	/// stays open.
	pub fn from_value(value: &Value) -> Result<Self> {
		let object = normalize::expect_object(value)?;

		Ok(Self {
			city: text_filter(object, "city"),
			neighborhood: text_filter(object, "neighborhood"),
			property_type: text_filter(object, "propertyType"),
			price: range_filter(object, "minPrice", "maxPrice"),
			area: range_filter(object, "minArea", "maxArea"),
			expected: normalize::normalize_value(value)?,
		})
	}

	/// Number of hard criteria. A price or area range counts once however many bounds it has.
	pub fn hard_filter_count(&self) -> usize {
		[
			self.city.is_some(),
			self.neighborhood.is_some(),
			self.property_type.is_some(),
			self.price.is_some(),
			self.area.is_some(),
		]
		.into_iter()
		.filter(|present| *present)
		.count()
	}
}

fn text_filter(object: &Map<String, Value>, key: &str) -> Option<String> {
	object.get(key).filter(|value| loose::is_truthy(value)).map(loose::to_text)
}

fn range_filter(object: &Map<String, Value>, min_key: &str, max_key: &str) -> Option<NumericRange> {
	let min = object.get(min_key);
	let max = object.get(max_key);
	let present = [min, max].into_iter().flatten().any(loose::is_truthy);

	present.then(|| NumericRange { min: bound(min), max: bound(max) })
}

fn bound(value: Option<&Value>) -> Option<f64> {
	value.filter(|value| !value.is_null()).and_then(loose::to_number)
}
