//! Note analysis and feature recomputation.
//!
//! A note is analyzed once, its extraction stored on the note, and the property's feature record
//! rebuilt from every analyzed note. The worker drives this from the outbox.

use uuid::Uuid;

use estate_domain::{NoteExtraction, PropertyFeature, aggregation, normalize};
use estate_providers::prompts;
use estate_storage::{models::NoteAnalysisOutboxEntry, notes};

use crate::{EstateService, Result};

impl EstateService {
	/// Runs the note through the completion provider and stores the normalized extraction on it.
	pub async fn analyze_note(&self, note_id: Uuid) -> Result<NoteExtraction> {
		let note = self.require_note(note_id).await?;

		tracing::debug!(note_id = %note_id, text_len = note.note_text.len(), "Analyzing property note.");

		let raw = self
			.complete(
				prompts::note_analysis_system_prompt(),
				&note.note_text,
				self.cfg.extraction.note_max_tokens,
			)
			.await?;
		let extraction = normalize::normalize(&raw)?;
		let output = serde_json::to_value(extraction).map_err(|err| crate::Error::Storage {
			message: format!("Failed to encode note analysis: {err}."),
		})?;

		notes::set_analysis_output(&self.db, note_id, &output).await?;

		tracing::info!(note_id = %note_id, output = %output, "Property note analyzed.");

		Ok(extraction)
	}

	/// Rebuilds the property's feature record from all analyzed notes, oldest first.
	///
	/// Returns `None` and writes nothing when no note has been analyzed yet.
	pub async fn recompute_feature(&self, property_id: Uuid) -> Result<Option<PropertyFeature>> {
		let outputs = notes::list_analysis_outputs(&self.db, property_id).await?;

		if outputs.is_empty() {
			tracing::warn!(property_id = %property_id, "No analyzed notes to aggregate.");

			return Ok(None);
		}

		let extractions = outputs
			.iter()
			.map(normalize::normalize_value)
			.collect::<estate_domain::Result<Vec<_>>>()?;
		let feature = aggregation::aggregate(&extractions);

		self.upsert_feature(property_id, &feature).await?;

		tracing::info!(
			property_id = %property_id,
			note_count = extractions.len(),
			"Property feature recomputed."
		);

		Ok(Some(feature))
	}

	/// Handles one queued note.
	///
	/// An analysis failure is returned so the job can be retried. A recomputation failure is
	/// logged and swallowed; the note's extraction is already stored and the next analyzed note
	/// recomputes the feature again.
	pub async fn process_note_job(&self, job: &NoteAnalysisOutboxEntry) -> Result<NoteExtraction> {
		let extraction = self.analyze_note(job.note_id).await.inspect_err(|err| {
			tracing::error!(
				error = %err,
				note_id = %job.note_id,
				property_id = %job.property_id,
				"Property note analysis failed."
			);
		})?;

		if let Err(err) = self.recompute_feature(job.property_id).await {
			tracing::error!(
				error = %err,
				property_id = %job.property_id,
				"Property feature recomputation failed."
			);
		}

		Ok(extraction)
	}
}
