//! Note repository contract and SQLite implementation.

use crate::model::job::JobId;
use crate::model::note::{check_color_index, Note, NoteId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sqlite_store::{job_exists, parse_uuid, SqliteWorkStore};
use rusqlite::{params, Row};

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    job_uuid,
    content,
    summary,
    color_index,
    creation_date
FROM notes";

/// Repository interface for notes.
pub trait NoteRepository {
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Writes content, summary and color. `creation_date` is never updated.
    fn update_note(&self, note: &Note) -> RepoResult<()>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists one job's notes by `creation_date ASC` then insertion order.
    fn list_notes(&self, job_id: JobId) -> RepoResult<Vec<Note>>;
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
}

impl<T: NoteRepository + ?Sized> NoteRepository for &T {
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
        (**self).insert_note(note)
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        (**self).update_note(note)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        (**self).get_note(id)
    }

    fn list_notes(&self, job_id: JobId) -> RepoResult<Vec<Note>> {
        (**self).list_notes(job_id)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        (**self).delete_note(id)
    }
}

impl NoteRepository for SqliteWorkStore<'_> {
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;
        if !job_exists(self.conn, note.job_id)? {
            return Err(RepoError::not_found("job", note.job_id));
        }

        self.conn.execute(
            "INSERT INTO notes (
                uuid,
                job_uuid,
                content,
                summary,
                color_index,
                creation_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                note.id.to_string(),
                note.job_id.to_string(),
                note.content.as_str(),
                note.summary.as_str(),
                note.color_index,
                note.creation_date,
            ],
        )?;

        Ok(note.id)
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        let changed = self.conn.execute(
            "UPDATE notes
             SET
                content = ?1,
                summary = ?2,
                color_index = ?3
             WHERE uuid = ?4
               AND job_uuid = ?5;",
            params![
                note.content.as_str(),
                note.summary.as_str(),
                note.color_index,
                note.id.to_string(),
                note.job_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("note", note.id));
        }
        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn list_notes(&self, job_id: JobId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE job_uuid = ?1
             ORDER BY creation_date ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([job_id.to_string()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("note", id));
        }
        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let job_text: String = row.get("job_uuid")?;
    let raw_color: i64 = row.get("color_index")?;
    let color_index = check_color_index(raw_color).map_err(|err| {
        RepoError::InvalidData(format!("{err} in notes.color_index"))
    })?;

    let note = Note {
        id: parse_uuid("notes.uuid", &uuid_text)?,
        job_id: parse_uuid("notes.job_uuid", &job_text)?,
        content: row.get("content")?,
        summary: row.get("summary")?,
        color_index,
        creation_date: row.get("creation_date")?,
    };
    note.validate()?;
    Ok(note)
}
