//! Pure feature and ranking logic for property listings.
//!
//! Nothing in this crate performs I/O. Completion output arrives as raw JSON text and leaves as
//! strictly typed records; storage and transport live in sibling crates.

pub mod aggregation;
pub mod filters;
pub mod loose;
pub mod normalize;
pub mod property;
pub mod scoring;

mod error;

pub use error::{Error, Result};
pub use filters::{NumericRange, QueryFilters};
pub use property::{NoteExtraction, PropertyFeature, PropertyType};
pub use scoring::{MAX_SCORE, Scored, ScoringPlan, SoftField};

/// Rounds to the nearest integer with halves going toward positive infinity, so `10.5` becomes
/// `11` and `-0.5` becomes `0`.
pub fn round_half_up(value: f64) -> f64 {
	(value + 0.5).floor()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rounds_halves_up() {
		assert_eq!(round_half_up(10.5), 11.0);
		assert_eq!(round_half_up(10.49), 10.0);
		assert_eq!(round_half_up(-0.5), 0.0);
		assert_eq!(round_half_up(6.666), 7.0);
	}
}
