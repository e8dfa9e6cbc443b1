//! Note model and color palette assignment.
//!
//! # Invariants
//! - `color_index < NOTE_PALETTE.len()` for every stored note.
//! - `next_color_index` never leaves the palette range.

use crate::model::job::JobId;
use crate::model::validation::{require_id, require_text, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable note identifier.
pub type NoteId = Uuid;

/// Note card colors, indexed by `Note::color_index`.
pub const NOTE_PALETTE: [&str; 8] = [
    "red", "blue", "green", "orange", "yellow", "purple", "pink", "teal",
];

pub const NOTE_PALETTE_SIZE: u8 = NOTE_PALETTE.len() as u8;

/// Freeform note card owned by one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub job_id: JobId,
    /// Body text.
    pub content: String,
    /// Short card label.
    pub summary: String,
    pub color_index: u8,
    pub creation_date: i64,
}

impl Note {
    pub fn new(
        job_id: JobId,
        content: impl Into<String>,
        summary: impl Into<String>,
        color_index: u8,
        creation_date: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            content: content.into(),
            summary: summary.into(),
            color_index,
            creation_date,
        }
    }

    pub fn color_name(&self) -> &'static str {
        NOTE_PALETTE[usize::from(self.color_index) % NOTE_PALETTE.len()]
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("note", self.id)?;
        require_id("job", self.job_id)?;
        require_text("note", "content", &self.content)?;
        require_text("note", "summary", &self.summary)?;
        check_color_index(i64::from(self.color_index)).map(|_| ())
    }
}

/// Validates a palette index coming from callers or storage.
pub fn check_color_index(index: i64) -> Result<u8, ValidationError> {
    u8::try_from(index)
        .ok()
        .filter(|value| *value < NOTE_PALETTE_SIZE)
        .ok_or(ValidationError::ColorIndexOutOfRange {
            index,
            palette_size: NOTE_PALETTE_SIZE,
        })
}

/// Picks the color for a new note in a job.
///
/// Lowest palette index not used by `existing`; once every color is taken,
/// `existing.len() % palette size` so colors start repeating.
pub fn next_color_index(existing: &[u8]) -> u8 {
    (0..NOTE_PALETTE_SIZE)
        .find(|index| !existing.contains(index))
        .unwrap_or_else(|| (existing.len() % NOTE_PALETTE.len()) as u8)
}
