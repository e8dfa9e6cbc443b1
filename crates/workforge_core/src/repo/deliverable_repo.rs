//! Deliverable repository contract and SQLite implementation.

use crate::model::deliverable::{Deliverable, DeliverableColor, DeliverableId, ReminderOffsets};
use crate::model::job::JobId;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::query::CompletionFilter;
use crate::repo::sqlite_store::{
    bool_to_int, job_exists, parse_completion, parse_uuid, SqliteWorkStore,
};
use rusqlite::{params, Row};

const DELIVERABLE_SELECT_SQL: &str = "SELECT
    uuid,
    job_uuid,
    task_description,
    due_date,
    is_completed,
    completion_date,
    color_code,
    reminder_offsets
FROM deliverables";

/// Repository interface for deliverables.
pub trait DeliverableRepository {
    /// Inserts under `deliverable.job_id`; the job must exist.
    fn insert_deliverable(&self, deliverable: &Deliverable) -> RepoResult<DeliverableId>;
    fn update_deliverable(&self, deliverable: &Deliverable) -> RepoResult<()>;
    fn get_deliverable(&self, id: DeliverableId) -> RepoResult<Option<Deliverable>>;
    /// Lists one job's deliverables in insertion order.
    fn list_deliverables(
        &self,
        job_id: JobId,
        filter: CompletionFilter,
    ) -> RepoResult<Vec<Deliverable>>;
    fn delete_deliverable(&self, id: DeliverableId) -> RepoResult<()>;
}

impl<T: DeliverableRepository + ?Sized> DeliverableRepository for &T {
    fn insert_deliverable(&self, deliverable: &Deliverable) -> RepoResult<DeliverableId> {
        (**self).insert_deliverable(deliverable)
    }

    fn update_deliverable(&self, deliverable: &Deliverable) -> RepoResult<()> {
        (**self).update_deliverable(deliverable)
    }

    fn get_deliverable(&self, id: DeliverableId) -> RepoResult<Option<Deliverable>> {
        (**self).get_deliverable(id)
    }

    fn list_deliverables(
        &self,
        job_id: JobId,
        filter: CompletionFilter,
    ) -> RepoResult<Vec<Deliverable>> {
        (**self).list_deliverables(job_id, filter)
    }

    fn delete_deliverable(&self, id: DeliverableId) -> RepoResult<()> {
        (**self).delete_deliverable(id)
    }
}

impl DeliverableRepository for SqliteWorkStore<'_> {
    fn insert_deliverable(&self, deliverable: &Deliverable) -> RepoResult<DeliverableId> {
        deliverable.validate()?;
        if !job_exists(self.conn, deliverable.job_id)? {
            return Err(RepoError::not_found("job", deliverable.job_id));
        }

        self.conn.execute(
            "INSERT INTO deliverables (
                uuid,
                job_uuid,
                task_description,
                due_date,
                is_completed,
                completion_date,
                color_code,
                reminder_offsets
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                deliverable.id.to_string(),
                deliverable.job_id.to_string(),
                deliverable.task_description.as_str(),
                deliverable.due_date,
                bool_to_int(deliverable.is_completed()),
                deliverable.completion_date,
                deliverable.color.as_str(),
                deliverable.reminder_offsets.to_storage(),
            ],
        )?;

        Ok(deliverable.id)
    }

    fn update_deliverable(&self, deliverable: &Deliverable) -> RepoResult<()> {
        deliverable.validate()?;

        let changed = self.conn.execute(
            "UPDATE deliverables
             SET
                task_description = ?1,
                due_date = ?2,
                is_completed = ?3,
                completion_date = ?4,
                color_code = ?5,
                reminder_offsets = ?6
             WHERE uuid = ?7
               AND job_uuid = ?8;",
            params![
                deliverable.task_description.as_str(),
                deliverable.due_date,
                bool_to_int(deliverable.is_completed()),
                deliverable.completion_date,
                deliverable.color.as_str(),
                deliverable.reminder_offsets.to_storage(),
                deliverable.id.to_string(),
                deliverable.job_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("deliverable", deliverable.id));
        }
        Ok(())
    }

    fn get_deliverable(&self, id: DeliverableId) -> RepoResult<Option<Deliverable>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DELIVERABLE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_deliverable_row(row)?));
        }
        Ok(None)
    }

    fn list_deliverables(
        &self,
        job_id: JobId,
        filter: CompletionFilter,
    ) -> RepoResult<Vec<Deliverable>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DELIVERABLE_SELECT_SQL}
             WHERE job_uuid = ?1
               AND (?2 IS NULL OR is_completed = ?2)
             ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query(params![job_id.to_string(), filter.completed_flag()])?;
        let mut deliverables = Vec::new();
        while let Some(row) = rows.next()? {
            deliverables.push(parse_deliverable_row(row)?);
        }
        Ok(deliverables)
    }

    fn delete_deliverable(&self, id: DeliverableId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM deliverables WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("deliverable", id));
        }
        Ok(())
    }
}

fn parse_deliverable_row(row: &Row<'_>) -> RepoResult<Deliverable> {
    let uuid_text: String = row.get("uuid")?;
    let job_text: String = row.get("job_uuid")?;

    let color_text: String = row.get("color_code")?;
    let color = DeliverableColor::parse(&color_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid color `{color_text}` in deliverables.color_code"
        ))
    })?;

    let offsets_text: String = row.get("reminder_offsets")?;
    let reminder_offsets = ReminderOffsets::from_storage(&offsets_text).map_err(|err| {
        RepoError::InvalidData(format!("{err} in deliverables.reminder_offsets"))
    })?;

    let deliverable = Deliverable {
        id: parse_uuid("deliverables.uuid", &uuid_text)?,
        job_id: parse_uuid("deliverables.job_uuid", &job_text)?,
        task_description: row.get("task_description")?,
        due_date: row.get("due_date")?,
        completion_date: parse_completion(
            "deliverables",
            row.get("is_completed")?,
            row.get("completion_date")?,
        )?,
        color,
        reminder_offsets,
    };
    deliverable.validate()?;
    Ok(deliverable)
}
