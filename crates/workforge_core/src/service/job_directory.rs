//! Job directory use-case service.
//!
//! # Responsibility
//! - List active and soft-deleted jobs.
//! - Create, rename, edit, soft-delete, restore and purge jobs.
//!
//! # Invariants
//! - Soft delete never touches owned records.
//! - Purge removes the job with every owned record and cancels the
//!   reminders of each deliverable it took.

use crate::clock::Clock;
use crate::model::job::{Job, JobId, JobProfile};
use crate::model::validation::{normalize_optional, normalize_required};
use crate::reminder::notifier::NotificationService;
use crate::reminder::scheduler::ReminderScheduler;
use crate::repo::job_repo::{JobRepository, PurgeReport};
use crate::repo::query::JobFilter;
use crate::service::error::{found, persisted, ServiceError};
use log::info;

/// Job directory facade.
pub struct JobDirectory<R: JobRepository, N: NotificationService, C: Clock> {
    repo: R,
    scheduler: ReminderScheduler<N>,
    clock: C,
}

impl<R: JobRepository, N: NotificationService, C: Clock> JobDirectory<R, N, C> {
    pub fn new(repo: R, scheduler: ReminderScheduler<N>, clock: C) -> Self {
        Self {
            repo,
            scheduler,
            clock,
        }
    }

    /// Jobs shown on the home screen, in insertion order.
    pub fn list_active(&self) -> Result<Vec<Job>, ServiceError> {
        persisted("job_list", self.repo.list_jobs(JobFilter::Active))
    }

    /// Jobs in the "recently deleted" section, in insertion order.
    pub fn list_deleted(&self) -> Result<Vec<Job>, ServiceError> {
        persisted("job_list", self.repo.list_jobs(JobFilter::Deleted))
    }

    /// Loads one job regardless of lifecycle.
    pub fn get(&self, id: JobId) -> Result<Job, ServiceError> {
        let job = persisted("job_get", self.repo.get_job(id))?;
        found("job", id, job)
    }

    /// Placeholder title for the quick-add button: `Job {active + 1}`.
    pub fn next_default_title(&self) -> Result<String, ServiceError> {
        let active = self.list_active()?.len();
        Ok(format!("Job {}", active + 1))
    }

    /// Creates an active job with default profile fields.
    pub fn create(&self, title: impl Into<String>) -> Result<Job, ServiceError> {
        let title = normalize_required("job", "title", title.into())?;
        let job = Job::new(title, self.clock.now_ms());
        persisted("job_create", self.repo.insert_job(&job))?;
        info!("event=job_create module=service status=ok job_id={}", job.id);
        Ok(job)
    }

    pub fn rename(&self, job: &mut Job, new_title: impl Into<String>) -> Result<(), ServiceError> {
        job.title = normalize_required("job", "title", new_title.into())?;
        persisted("job_rename", self.repo.update_job(job))
    }

    /// Replaces the editable profile fields in one write.
    ///
    /// Blank optional strings are stored as absent.
    pub fn update_profile(&self, job: &mut Job, profile: JobProfile) -> Result<(), ServiceError> {
        profile.validate()?;
        job.profile = JobProfile {
            email: normalize_optional(profile.email),
            manager_name: normalize_optional(profile.manager_name),
            role_title: normalize_optional(profile.role_title),
            equipment_list: normalize_optional(profile.equipment_list),
            ..profile
        };
        persisted("job_update_profile", self.repo.update_job(job))
    }

    /// Moves a job to the deleted list, stamping the deletion date.
    pub fn soft_delete(&self, job: &mut Job) -> Result<(), ServiceError> {
        job.soft_delete(self.clock.now_ms());
        persisted("job_soft_delete", self.repo.update_job(job))?;
        info!("event=job_soft_delete module=service status=ok job_id={}", job.id);
        Ok(())
    }

    /// Moves a soft-deleted job back to the active list.
    pub fn restore(&self, job: &mut Job) -> Result<(), ServiceError> {
        job.restore();
        persisted("job_restore", self.repo.update_job(job))?;
        info!("event=job_restore module=service status=ok job_id={}", job.id);
        Ok(())
    }

    /// Irreversibly deletes a job and everything it owns.
    ///
    /// Reminders are cancelled only after the delete committed; a failed
    /// purge leaves both storage and reminders untouched.
    pub fn purge(&self, job: Job) -> Result<PurgeReport, ServiceError> {
        let report = persisted("job_purge", self.repo.purge_job(job.id))?;
        for deliverable_id in &report.deliverable_ids {
            self.scheduler.cancel_all(*deliverable_id);
        }
        info!(
            "event=job_purge module=service status=ok job_id={} deliverables={} checklist_items={} notes={}",
            report.job_id,
            report.deliverable_ids.len(),
            report.checklist_items_removed,
            report.notes_removed
        );
        Ok(report)
    }
}
