//! Checklist repository contract and SQLite implementation.
//!
//! `priority` round-trips verbatim; display fallback happens in the model.

use crate::model::checklist::{ChecklistItem, ChecklistItemId};
use crate::model::job::JobId;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::query::CompletionFilter;
use crate::repo::sqlite_store::{
    bool_to_int, job_exists, parse_completion, parse_uuid, SqliteWorkStore,
};
use rusqlite::{params, Row};

const CHECKLIST_SELECT_SQL: &str = "SELECT
    uuid,
    job_uuid,
    title,
    is_completed,
    completion_date,
    priority
FROM checklist_items";

/// Repository interface for checklist items.
pub trait ChecklistRepository {
    fn insert_checklist_item(&self, item: &ChecklistItem) -> RepoResult<ChecklistItemId>;
    fn update_checklist_item(&self, item: &ChecklistItem) -> RepoResult<()>;
    fn get_checklist_item(&self, id: ChecklistItemId) -> RepoResult<Option<ChecklistItem>>;
    /// Lists one job's items in insertion order.
    fn list_checklist_items(
        &self,
        job_id: JobId,
        filter: CompletionFilter,
    ) -> RepoResult<Vec<ChecklistItem>>;
    fn delete_checklist_item(&self, id: ChecklistItemId) -> RepoResult<()>;
}

impl<T: ChecklistRepository + ?Sized> ChecklistRepository for &T {
    fn insert_checklist_item(&self, item: &ChecklistItem) -> RepoResult<ChecklistItemId> {
        (**self).insert_checklist_item(item)
    }

    fn update_checklist_item(&self, item: &ChecklistItem) -> RepoResult<()> {
        (**self).update_checklist_item(item)
    }

    fn get_checklist_item(&self, id: ChecklistItemId) -> RepoResult<Option<ChecklistItem>> {
        (**self).get_checklist_item(id)
    }

    fn list_checklist_items(
        &self,
        job_id: JobId,
        filter: CompletionFilter,
    ) -> RepoResult<Vec<ChecklistItem>> {
        (**self).list_checklist_items(job_id, filter)
    }

    fn delete_checklist_item(&self, id: ChecklistItemId) -> RepoResult<()> {
        (**self).delete_checklist_item(id)
    }
}

impl ChecklistRepository for SqliteWorkStore<'_> {
    fn insert_checklist_item(&self, item: &ChecklistItem) -> RepoResult<ChecklistItemId> {
        item.validate()?;
        if !job_exists(self.conn, item.job_id)? {
            return Err(RepoError::not_found("job", item.job_id));
        }

        self.conn.execute(
            "INSERT INTO checklist_items (
                uuid,
                job_uuid,
                title,
                is_completed,
                completion_date,
                priority
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                item.id.to_string(),
                item.job_id.to_string(),
                item.title.as_str(),
                bool_to_int(item.is_completed()),
                item.completion_date,
                item.priority.as_str(),
            ],
        )?;

        Ok(item.id)
    }

    fn update_checklist_item(&self, item: &ChecklistItem) -> RepoResult<()> {
        item.validate()?;

        let changed = self.conn.execute(
            "UPDATE checklist_items
             SET
                title = ?1,
                is_completed = ?2,
                completion_date = ?3,
                priority = ?4
             WHERE uuid = ?5
               AND job_uuid = ?6;",
            params![
                item.title.as_str(),
                bool_to_int(item.is_completed()),
                item.completion_date,
                item.priority.as_str(),
                item.id.to_string(),
                item.job_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("checklist item", item.id));
        }
        Ok(())
    }

    fn get_checklist_item(&self, id: ChecklistItemId) -> RepoResult<Option<ChecklistItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHECKLIST_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_checklist_row(row)?));
        }
        Ok(None)
    }

    fn list_checklist_items(
        &self,
        job_id: JobId,
        filter: CompletionFilter,
    ) -> RepoResult<Vec<ChecklistItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CHECKLIST_SELECT_SQL}
             WHERE job_uuid = ?1
               AND (?2 IS NULL OR is_completed = ?2)
             ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query(params![job_id.to_string(), filter.completed_flag()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_checklist_row(row)?);
        }
        Ok(items)
    }

    fn delete_checklist_item(&self, id: ChecklistItemId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM checklist_items WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("checklist item", id));
        }
        Ok(())
    }
}

fn parse_checklist_row(row: &Row<'_>) -> RepoResult<ChecklistItem> {
    let uuid_text: String = row.get("uuid")?;
    let job_text: String = row.get("job_uuid")?;

    let item = ChecklistItem {
        id: parse_uuid("checklist_items.uuid", &uuid_text)?,
        job_id: parse_uuid("checklist_items.job_uuid", &job_text)?,
        title: row.get("title")?,
        completion_date: parse_completion(
            "checklist_items",
            row.get("is_completed")?,
            row.get("completion_date")?,
        )?,
        priority: row.get("priority")?,
    };
    item.validate()?;
    Ok(item)
}
