//! Job repository contract and SQLite implementation.
//!
//! # Invariants
//! - Job lists are returned in insertion order.
//! - `purge_job` removes the job and, by cascade, every owned row in one
//!   transaction, and reports which deliverables went with it.

use crate::model::deliverable::DeliverableId;
use crate::model::job::{Job, JobId, JobLifecycle, JobProfile, JobType, PayType};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::query::JobFilter;
use crate::repo::sqlite_store::{bool_to_int, parse_flag, parse_uuid, SqliteWorkStore};
use rusqlite::{params, Row, Transaction, TransactionBehavior};

const JOB_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    creation_date,
    is_deleted,
    deletion_date,
    email,
    pay_rate,
    pay_type,
    manager_name,
    role_title,
    equipment_list,
    job_type,
    contract_end_date
FROM jobs";

/// What a hard delete took with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub job_id: JobId,
    /// Deliverables removed by cascade; their reminders must be cancelled.
    pub deliverable_ids: Vec<DeliverableId>,
    pub checklist_items_removed: usize,
    pub notes_removed: usize,
}

/// Repository interface for job records.
pub trait JobRepository {
    fn insert_job(&self, job: &Job) -> RepoResult<JobId>;
    /// Writes title, lifecycle and profile. `creation_date` is never updated.
    fn update_job(&self, job: &Job) -> RepoResult<()>;
    fn get_job(&self, id: JobId) -> RepoResult<Option<Job>>;
    fn list_jobs(&self, filter: JobFilter) -> RepoResult<Vec<Job>>;
    /// Hard-deletes the job and all owned records.
    fn purge_job(&self, id: JobId) -> RepoResult<PurgeReport>;
}

impl<T: JobRepository + ?Sized> JobRepository for &T {
    fn insert_job(&self, job: &Job) -> RepoResult<JobId> {
        (**self).insert_job(job)
    }

    fn update_job(&self, job: &Job) -> RepoResult<()> {
        (**self).update_job(job)
    }

    fn get_job(&self, id: JobId) -> RepoResult<Option<Job>> {
        (**self).get_job(id)
    }

    fn list_jobs(&self, filter: JobFilter) -> RepoResult<Vec<Job>> {
        (**self).list_jobs(filter)
    }

    fn purge_job(&self, id: JobId) -> RepoResult<PurgeReport> {
        (**self).purge_job(id)
    }
}

impl JobRepository for SqliteWorkStore<'_> {
    fn insert_job(&self, job: &Job) -> RepoResult<JobId> {
        job.validate()?;

        self.conn.execute(
            "INSERT INTO jobs (
                uuid,
                title,
                creation_date,
                is_deleted,
                deletion_date,
                email,
                pay_rate,
                pay_type,
                manager_name,
                role_title,
                equipment_list,
                job_type,
                contract_end_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                job.id.to_string(),
                job.title.as_str(),
                job.creation_date,
                bool_to_int(job.is_deleted()),
                job.deletion_date(),
                job.profile.email.as_deref(),
                job.profile.pay_rate,
                job.profile.pay_type.as_str(),
                job.profile.manager_name.as_deref(),
                job.profile.role_title.as_deref(),
                job.profile.equipment_list.as_deref(),
                job.profile.job_type.as_str(),
                job.profile.contract_end_date,
            ],
        )?;

        Ok(job.id)
    }

    fn update_job(&self, job: &Job) -> RepoResult<()> {
        job.validate()?;

        let changed = self.conn.execute(
            "UPDATE jobs
             SET
                title = ?1,
                is_deleted = ?2,
                deletion_date = ?3,
                email = ?4,
                pay_rate = ?5,
                pay_type = ?6,
                manager_name = ?7,
                role_title = ?8,
                equipment_list = ?9,
                job_type = ?10,
                contract_end_date = ?11
             WHERE uuid = ?12;",
            params![
                job.title.as_str(),
                bool_to_int(job.is_deleted()),
                job.deletion_date(),
                job.profile.email.as_deref(),
                job.profile.pay_rate,
                job.profile.pay_type.as_str(),
                job.profile.manager_name.as_deref(),
                job.profile.role_title.as_deref(),
                job.profile.equipment_list.as_deref(),
                job.profile.job_type.as_str(),
                job.profile.contract_end_date,
                job.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("job", job.id));
        }
        Ok(())
    }

    fn get_job(&self, id: JobId) -> RepoResult<Option<Job>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{JOB_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_job_row(row)?));
        }
        Ok(None)
    }

    fn list_jobs(&self, filter: JobFilter) -> RepoResult<Vec<Job>> {
        let mut stmt = self.conn.prepare(&format!(
            "{JOB_SELECT_SQL}
             WHERE (?1 IS NULL OR is_deleted = ?1)
             ORDER BY creation_date ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([filter.deleted_flag()])?;
        let mut jobs = Vec::new();
        while let Some(row) = rows.next()? {
            jobs.push(parse_job_row(row)?);
        }
        Ok(jobs)
    }

    fn purge_job(&self, id: JobId) -> RepoResult<PurgeReport> {
        let job_uuid = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let deliverable_ids = {
            let mut stmt =
                tx.prepare("SELECT uuid FROM deliverables WHERE job_uuid = ?1 ORDER BY rowid;")?;
            let mut rows = stmt.query([job_uuid.as_str()])?;
            let mut ids = Vec::new();
            while let Some(row) = rows.next()? {
                let text: String = row.get(0)?;
                ids.push(parse_uuid("deliverables.uuid", &text)?);
            }
            ids
        };
        let checklist_items_removed = count_children(&tx, "checklist_items", &job_uuid)?;
        let notes_removed = count_children(&tx, "notes", &job_uuid)?;

        let changed = tx.execute("DELETE FROM jobs WHERE uuid = ?1;", [job_uuid.as_str()])?;
        if changed == 0 {
            return Err(RepoError::not_found("job", id));
        }
        tx.commit()?;

        Ok(PurgeReport {
            job_id: id,
            deliverable_ids,
            checklist_items_removed,
            notes_removed,
        })
    }
}

fn count_children(tx: &Transaction<'_>, table: &str, job_uuid: &str) -> RepoResult<usize> {
    let count: i64 = tx.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE job_uuid = ?1;"),
        [job_uuid],
        |row| row.get(0),
    )?;
    usize::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative row count in {table}")))
}

fn parse_job_row(row: &Row<'_>) -> RepoResult<Job> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid("jobs.uuid", &uuid_text)?;

    let is_deleted = parse_flag("jobs.is_deleted", row.get("is_deleted")?)?;
    let deletion_date: Option<i64> = row.get("deletion_date")?;
    let lifecycle = JobLifecycle::from_columns(is_deleted, deletion_date).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "jobs.is_deleted={is_deleted} disagrees with deletion_date={deletion_date:?}"
        ))
    })?;

    let pay_type_text: String = row.get("pay_type")?;
    let pay_type = PayType::parse(&pay_type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid pay type `{pay_type_text}` in jobs.pay_type"))
    })?;
    let job_type_text: String = row.get("job_type")?;
    let job_type = JobType::parse(&job_type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid job type `{job_type_text}` in jobs.job_type"))
    })?;

    let job = Job {
        id,
        title: row.get("title")?,
        creation_date: row.get("creation_date")?,
        lifecycle,
        profile: JobProfile {
            email: row.get("email")?,
            pay_rate: row.get("pay_rate")?,
            pay_type,
            manager_name: row.get("manager_name")?,
            role_title: row.get("role_title")?,
            equipment_list: row.get("equipment_list")?,
            job_type,
            contract_end_date: row.get("contract_end_date")?,
        },
    };
    job.validate()?;
    Ok(job)
}
