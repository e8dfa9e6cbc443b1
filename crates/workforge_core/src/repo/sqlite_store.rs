//! SQLite-backed job store handle and shared row helpers.
//!
//! # Invariants
//! - A store is only constructed over a connection migrated to
//!   `latest_version()` with every required table and column present.
//! - Cascade delete relies on `PRAGMA foreign_keys = ON`, which `open_db`
//!   guarantees.

use crate::db::migrations::{current_version, latest_version};
use crate::model::job::JobId;
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::Connection;
use uuid::Uuid;

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "jobs",
        &[
            "uuid",
            "title",
            "creation_date",
            "is_deleted",
            "deletion_date",
            "pay_rate",
            "pay_type",
            "job_type",
            "contract_end_date",
        ],
    ),
    (
        "deliverables",
        &[
            "uuid",
            "job_uuid",
            "task_description",
            "due_date",
            "is_completed",
            "completion_date",
            "color_code",
            "reminder_offsets",
        ],
    ),
    (
        "checklist_items",
        &[
            "uuid",
            "job_uuid",
            "title",
            "is_completed",
            "completion_date",
            "priority",
        ],
    ),
    (
        "notes",
        &[
            "uuid",
            "job_uuid",
            "content",
            "summary",
            "color_index",
            "creation_date",
        ],
    ),
];

/// Persistence gateway over one migrated SQLite connection.
///
/// Every write is a single autocommit statement except `purge_job`, which
/// runs in one immediate transaction.
#[derive(Debug, Clone, Copy)]
pub struct SqliteWorkStore<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteWorkStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_store_ready(conn)?;
        Ok(Self { conn })
    }
}

fn ensure_store_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn job_exists(conn: &Connection, job_id: JobId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM jobs WHERE uuid = ?1);",
        [job_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn parse_uuid(column: &'static str, value: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_flag(column: &'static str, value: i64) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

/// Collapses the `is_completed` + `completion_date` pair into one option.
pub(crate) fn parse_completion(
    table: &'static str,
    is_completed: i64,
    completion_date: Option<i64>,
) -> RepoResult<Option<i64>> {
    match (parse_flag("is_completed", is_completed)?, completion_date) {
        (true, Some(at)) => Ok(Some(at)),
        (false, None) => Ok(None),
        (flag, date) => Err(RepoError::InvalidData(format!(
            "{table}.is_completed={flag} disagrees with completion_date={date:?}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_completion, SqliteWorkStore};
    use crate::db::open_db_in_memory;
    use crate::repo::error::RepoError;
    use rusqlite::Connection;

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteWorkStore::try_new(&conn).unwrap_err();
        assert!(matches!(
            err,
            RepoError::UninitializedConnection {
                actual_version: 0,
                ..
            }
        ));
    }

    #[test]
    fn try_new_accepts_migrated_connection() {
        let conn = open_db_in_memory().unwrap();
        assert!(SqliteWorkStore::try_new(&conn).is_ok());
    }

    #[test]
    fn parse_completion_rejects_mismatched_pair() {
        assert_eq!(parse_completion("deliverables", 1, Some(5)).unwrap(), Some(5));
        assert_eq!(parse_completion("deliverables", 0, None).unwrap(), None);
        assert!(parse_completion("deliverables", 1, None).is_err());
        assert!(parse_completion("deliverables", 0, Some(5)).is_err());
        assert!(parse_completion("deliverables", 2, None).is_err());
    }
}
