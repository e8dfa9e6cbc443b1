//! Checklist tracker use-case service.

use crate::clock::Clock;
use crate::model::checklist::{ChecklistItem, ChecklistItemId, ChecklistPriority};
use crate::model::job::Job;
use crate::model::validation::normalize_required;
use crate::repo::checklist_repo::ChecklistRepository;
use crate::repo::query::CompletionFilter;
use crate::service::error::{found, persisted, ServiceError};
use log::info;
use std::cmp::Reverse;

/// Checklist tracker facade. No reminder interaction.
pub struct ChecklistTracker<R: ChecklistRepository, C: Clock> {
    repo: R,
    clock: C,
}

impl<R: ChecklistRepository, C: Clock> ChecklistTracker<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    pub fn get(&self, id: ChecklistItemId) -> Result<ChecklistItem, ServiceError> {
        let item = persisted("checklist_get", self.repo.get_checklist_item(id))?;
        found("checklist item", id, item)
    }

    /// Open items in insertion order.
    pub fn list_active(&self, job: &Job) -> Result<Vec<ChecklistItem>, ServiceError> {
        persisted(
            "checklist_list",
            self.repo.list_checklist_items(job.id, CompletionFilter::Active),
        )
    }

    /// Completed items, most recently completed first.
    pub fn list_completed(&self, job: &Job) -> Result<Vec<ChecklistItem>, ServiceError> {
        let mut items = persisted(
            "checklist_list",
            self.repo
                .list_checklist_items(job.id, CompletionFilter::Completed),
        )?;
        items.sort_by_key(|item| Reverse(item.completion_date));
        Ok(items)
    }

    pub fn add(&self, job: &Job, title: impl Into<String>) -> Result<ChecklistItem, ServiceError> {
        let title = normalize_required("checklist item", "title", title.into())?;
        let item = ChecklistItem::new(job.id, title);
        persisted("checklist_add", self.repo.insert_checklist_item(&item))?;
        info!(
            "event=checklist_add module=service status=ok job_id={} item_id={}",
            job.id, item.id
        );
        Ok(item)
    }

    pub fn rename(&self, item: &mut ChecklistItem, title: impl Into<String>) -> Result<(), ServiceError> {
        item.title = normalize_required("checklist item", "title", title.into())?;
        persisted("checklist_rename", self.repo.update_checklist_item(item))
    }

    /// No-op when already completed.
    pub fn complete(&self, item: &mut ChecklistItem) -> Result<(), ServiceError> {
        if item.is_completed() {
            return Ok(());
        }
        item.complete(self.clock.now_ms());
        persisted("checklist_complete", self.repo.update_checklist_item(item))
    }

    /// No-op when not completed.
    pub fn uncomplete(&self, item: &mut ChecklistItem) -> Result<(), ServiceError> {
        if !item.is_completed() {
            return Ok(());
        }
        item.uncomplete();
        persisted("checklist_uncomplete", self.repo.update_checklist_item(item))
    }

    pub fn set_priority(
        &self,
        item: &mut ChecklistItem,
        priority: ChecklistPriority,
    ) -> Result<(), ServiceError> {
        item.set_priority(priority);
        persisted("checklist_set_priority", self.repo.update_checklist_item(item))
    }

    pub fn remove(&self, item: ChecklistItem) -> Result<(), ServiceError> {
        persisted("checklist_remove", self.repo.delete_checklist_item(item.id))
    }
}
