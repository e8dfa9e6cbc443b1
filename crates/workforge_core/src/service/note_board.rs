//! Note board use-case service.
//!
//! # Invariants
//! - New notes take the lowest free palette color of their job.
//! - Editing text never changes color or creation date.

use crate::clock::Clock;
use crate::model::job::Job;
use crate::model::note::{check_color_index, next_color_index, Note, NoteId};
use crate::model::validation::{require_text, ValidationError};
use crate::repo::note_repo::NoteRepository;
use crate::service::error::{found, persisted, ServiceError};
use log::info;

/// Note board facade.
pub struct NoteBoard<R: NoteRepository, C: Clock> {
    repo: R,
    clock: C,
}

impl<R: NoteRepository, C: Clock> NoteBoard<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    pub fn get(&self, id: NoteId) -> Result<Note, ServiceError> {
        let note = persisted("note_get", self.repo.get_note(id))?;
        found("note", id, note)
    }

    /// Notes of a job, oldest first.
    pub fn list(&self, job: &Job) -> Result<Vec<Note>, ServiceError> {
        persisted("note_list", self.repo.list_notes(job.id))
    }

    /// Palette index the next note in `job` would receive.
    pub fn next_color_index(&self, job: &Job) -> Result<u8, ServiceError> {
        let used: Vec<u8> = self.list(job)?.iter().map(|note| note.color_index).collect();
        Ok(next_color_index(&used))
    }

    pub fn create(
        &self,
        job: &Job,
        content: impl Into<String>,
        summary: impl Into<String>,
    ) -> Result<Note, ServiceError> {
        let (content, summary) = validate_text(content.into(), summary.into())?;
        let color_index = self.next_color_index(job)?;
        let note = Note::new(job.id, content, summary, color_index, self.clock.now_ms());
        persisted("note_create", self.repo.insert_note(&note))?;
        info!(
            "event=note_create module=service status=ok job_id={} note_id={} color_index={}",
            job.id, note.id, note.color_index
        );
        Ok(note)
    }

    pub fn update(
        &self,
        note: &mut Note,
        content: impl Into<String>,
        summary: impl Into<String>,
    ) -> Result<(), ServiceError> {
        let (content, summary) = validate_text(content.into(), summary.into())?;
        note.content = content;
        note.summary = summary;
        persisted("note_update", self.repo.update_note(note))
    }

    /// Sets the palette index; must be inside the palette.
    pub fn set_color(&self, note: &mut Note, index: i64) -> Result<(), ServiceError> {
        note.color_index = check_color_index(index)?;
        persisted("note_set_color", self.repo.update_note(note))
    }

    pub fn remove(&self, note: Note) -> Result<(), ServiceError> {
        persisted("note_remove", self.repo.delete_note(note.id))
    }
}

/// Body is kept verbatim; the summary label is trimmed.
fn validate_text(content: String, summary: String) -> Result<(String, String), ValidationError> {
    require_text("note", "content", &content)?;
    require_text("note", "summary", &summary)?;
    Ok((content, summary.trim().to_string()))
}
