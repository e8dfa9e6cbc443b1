//! Deliverable tracker use-case service.
//!
//! # Responsibility
//! - Create, edit, complete and remove deliverables of a job.
//! - Keep pending reminders consistent with each deliverable's due date,
//!   offsets and completion.
//!
//! # Invariants
//! - Any change to due date, description or offsets of an open deliverable
//!   re-derives its reminders (cancel all, then schedule future triggers).
//! - Completing or removing cancels every reminder key.
//! - Uncompleting does not bring reminders back; the next due-date or
//!   offset edit does, and so does a resync.
//! - Reminder effects follow the in-memory record even when the write fails.

use crate::clock::Clock;
use crate::model::deliverable::{
    Deliverable, DeliverableColor, DeliverableId, ReminderOffset, ReminderOffsets,
};
use crate::model::job::Job;
use crate::model::validation::normalize_required;
use crate::reminder::notifier::NotificationService;
use crate::reminder::scheduler::ReminderScheduler;
use crate::repo::deliverable_repo::DeliverableRepository;
use crate::repo::query::CompletionFilter;
use crate::service::error::{found, persisted, ServiceError};
use log::{debug, info};
use std::cmp::Reverse;

/// Deliverable tracker facade.
pub struct DeliverableTracker<R: DeliverableRepository, N: NotificationService, C: Clock> {
    repo: R,
    scheduler: ReminderScheduler<N>,
    clock: C,
}

impl<R: DeliverableRepository, N: NotificationService, C: Clock> DeliverableTracker<R, N, C> {
    pub fn new(repo: R, scheduler: ReminderScheduler<N>, clock: C) -> Self {
        Self {
            repo,
            scheduler,
            clock,
        }
    }

    pub fn scheduler(&self) -> &ReminderScheduler<N> {
        &self.scheduler
    }

    pub fn get(&self, id: DeliverableId) -> Result<Deliverable, ServiceError> {
        let deliverable = persisted("deliverable_get", self.repo.get_deliverable(id))?;
        found("deliverable", id, deliverable)
    }

    /// Open deliverables of a job, soonest due first.
    pub fn list_active(&self, job: &Job) -> Result<Vec<Deliverable>, ServiceError> {
        let mut deliverables = persisted(
            "deliverable_list",
            self.repo.list_deliverables(job.id, CompletionFilter::Active),
        )?;
        deliverables.sort_by_key(|deliverable| deliverable.due_date);
        Ok(deliverables)
    }

    /// Completed deliverables of a job, most recently completed first.
    pub fn list_completed(&self, job: &Job) -> Result<Vec<Deliverable>, ServiceError> {
        let mut deliverables = persisted(
            "deliverable_list",
            self.repo
                .list_deliverables(job.id, CompletionFilter::Completed),
        )?;
        deliverables.sort_by_key(|deliverable| Reverse(deliverable.completion_date));
        Ok(deliverables)
    }

    /// Adds an open deliverable with gray color and no reminders.
    pub fn add(
        &self,
        job: &Job,
        description: impl Into<String>,
        due_date: i64,
    ) -> Result<Deliverable, ServiceError> {
        let description = normalize_required("deliverable", "task description", description.into())?;
        let deliverable = Deliverable::new(job.id, description, due_date);
        persisted("deliverable_add", self.repo.insert_deliverable(&deliverable))?;
        info!(
            "event=deliverable_add module=service status=ok job_id={} deliverable_id={}",
            job.id, deliverable.id
        );
        Ok(deliverable)
    }

    pub fn set_due_date(&self, deliverable: &mut Deliverable, due_date: i64) -> Result<(), ServiceError> {
        deliverable.due_date = due_date;
        let result = persisted("deliverable_set_due_date", self.repo.update_deliverable(deliverable));
        self.sync_reminders(deliverable);
        result
    }

    /// Edits the task text; reminders are re-derived so their body matches.
    pub fn set_description(
        &self,
        deliverable: &mut Deliverable,
        description: impl Into<String>,
    ) -> Result<(), ServiceError> {
        deliverable.task_description =
            normalize_required("deliverable", "task description", description.into())?;
        let result = persisted(
            "deliverable_set_description",
            self.repo.update_deliverable(deliverable),
        );
        self.sync_reminders(deliverable);
        result
    }

    /// Marks done and cancels reminders. No-op when already completed.
    pub fn complete(&self, deliverable: &mut Deliverable) -> Result<(), ServiceError> {
        if deliverable.is_completed() {
            return Ok(());
        }
        deliverable.complete(self.clock.now_ms());
        let result = persisted("deliverable_complete", self.repo.update_deliverable(deliverable));
        self.scheduler.cancel_all(deliverable.id);
        result
    }

    /// Reopens a deliverable. Reminders stay cancelled.
    pub fn uncomplete(&self, deliverable: &mut Deliverable) -> Result<(), ServiceError> {
        if !deliverable.is_completed() {
            return Ok(());
        }
        deliverable.uncomplete();
        persisted("deliverable_uncomplete", self.repo.update_deliverable(deliverable))
    }

    /// Sets the row color; unknown tags become gray.
    pub fn set_color(&self, deliverable: &mut Deliverable, tag: &str) -> Result<(), ServiceError> {
        deliverable.color = DeliverableColor::from_tag(tag);
        persisted("deliverable_set_color", self.repo.update_deliverable(deliverable))
    }

    /// Replaces the whole offset set and re-derives reminders.
    pub fn set_reminder_offsets(
        &self,
        deliverable: &mut Deliverable,
        offsets: ReminderOffsets,
    ) -> Result<(), ServiceError> {
        deliverable.reminder_offsets = offsets;
        let result = persisted(
            "deliverable_set_reminders",
            self.repo.update_deliverable(deliverable),
        );
        self.sync_reminders(deliverable);
        result
    }

    /// Adds or removes one offset.
    ///
    /// Returns whether the offset is set afterwards.
    pub fn toggle_reminder_offset(
        &self,
        deliverable: &mut Deliverable,
        offset: ReminderOffset,
    ) -> Result<bool, ServiceError> {
        let mut offsets = deliverable.reminder_offsets.clone();
        let enabled = offsets.toggle(offset);
        self.set_reminder_offsets(deliverable, offsets)?;
        Ok(enabled)
    }

    /// Hard-deletes a deliverable and cancels its reminders.
    pub fn remove(&self, deliverable: Deliverable) -> Result<(), ServiceError> {
        let result = persisted("deliverable_remove", self.repo.delete_deliverable(deliverable.id));
        self.scheduler.cancel_all(deliverable.id);
        if result.is_ok() {
            info!(
                "event=deliverable_remove module=service status=ok deliverable_id={}",
                deliverable.id
            );
        }
        result
    }

    /// Re-derives reminders for every deliverable of a job from storage.
    ///
    /// Open deliverables are rescheduled, completed ones cancelled. Used
    /// after a restart, when the host center may have lost or kept stale
    /// requests. Returns the number of requests scheduled.
    pub fn resync_reminders(&self, job: &Job) -> Result<usize, ServiceError> {
        let deliverables = persisted(
            "deliverable_resync",
            self.repo.list_deliverables(job.id, CompletionFilter::All),
        )?;
        let scheduled = deliverables
            .iter()
            .map(|deliverable| self.sync_reminders(deliverable))
            .sum();
        info!(
            "event=deliverable_resync module=service status=ok job_id={} deliverables={} scheduled={scheduled}",
            job.id,
            deliverables.len()
        );
        Ok(scheduled)
    }

    fn sync_reminders(&self, deliverable: &Deliverable) -> usize {
        if deliverable.is_completed() {
            self.scheduler.cancel_all(deliverable.id);
            return 0;
        }
        let scheduled = self.scheduler.schedule(deliverable, self.clock.now_ms());
        debug!(
            "event=deliverable_reminders module=service status=ok deliverable_id={} scheduled={scheduled}",
            deliverable.id
        );
        scheduled
    }
}
