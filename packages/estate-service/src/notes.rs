use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use estate_storage::{models::PropertyNote, notes};

use crate::{Error, EstateService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateNoteRequest {
	pub property_id: Uuid,
	pub note_text: String,
}

/// A note as shown to callers. The stored analysis output is not exposed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoteResponse {
	pub note_id: Uuid,
	pub property_id: Uuid,
	pub author_id: Uuid,
	pub note_text: String,
	#[serde(with = "crate::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "crate::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl From<PropertyNote> for NoteResponse {
	fn from(note: PropertyNote) -> Self {
		Self {
			note_id: note.note_id,
			property_id: note.property_id,
			author_id: note.author_id,
			note_text: note.note_text,
			created_at: note.created_at,
			updated_at: note.updated_at,
		}
	}
}

impl EstateService {
	/// Stores the note and queues it for analysis. The analysis itself runs in the worker.
	pub async fn create_note(
		&self,
		author_id: Uuid,
		req: CreateNoteRequest,
	) -> Result<NoteResponse> {
		let note_text = crate::require_text("note_text", &req.note_text)?;
		let note = notes::insert_note_with_analysis_job(
			&self.db,
			req.property_id,
			author_id,
			note_text.as_str(),
		)
		.await
		.map_err(|err| match err {
			estate_storage::Error::NotFound(_) => crate::properties::property_not_found(req.property_id),
			other => other.into(),
		})?;

		tracing::info!(
			note_id = %note.note_id,
			property_id = %note.property_id,
			"Property note created."
		);

		Ok(note.into())
	}

	/// Newest first.
	pub async fn list_notes(&self, property_id: Uuid) -> Result<Vec<NoteResponse>> {
		self.require_property(property_id).await?;

		let notes = notes::list_notes_for_property(&self.db, property_id).await?;

		Ok(notes.into_iter().map(NoteResponse::from).collect())
	}

	pub async fn get_note(&self, note_id: Uuid) -> Result<NoteResponse> {
		Ok(self.require_note(note_id).await?.into())
	}

	pub async fn delete_note(&self, note_id: Uuid) -> Result<()> {
		if !notes::soft_delete_note(&self.db, note_id).await? {
			return Err(note_not_found(note_id));
		}

		tracing::info!(note_id = %note_id, "Property note deleted.");

		Ok(())
	}

	pub(crate) async fn require_note(&self, note_id: Uuid) -> Result<PropertyNote> {
		notes::get_note(&self.db, note_id).await?.ok_or_else(|| note_not_found(note_id))
	}
}

fn note_not_found(note_id: Uuid) -> Error {
	tracing::warn!(note_id = %note_id, "Property note not found.");

	Error::NotFound { message: format!("Note {note_id} not found.") }
}
