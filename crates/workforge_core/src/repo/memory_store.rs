//! In-memory arena gateway.
//!
//! # Responsibility
//! - Store each job together with the records it owns in one arena slot, so
//!   purging a job is dropping its slot.
//! - Mirror the SQLite gateway's contracts for hosts and tests that do not
//!   need durable storage.
//!
//! # Invariants
//! - Arena slots stay in insertion order.
//! - A child lives in exactly one slot, the one named by its `job_id`.
//! - Single-threaded: interior mutability is `RefCell`, so the store is `!Sync`.

use crate::model::checklist::{ChecklistItem, ChecklistItemId};
use crate::model::deliverable::{Deliverable, DeliverableId};
use crate::model::job::{Job, JobId};
use crate::model::note::{Note, NoteId};
use crate::repo::checklist_repo::ChecklistRepository;
use crate::repo::deliverable_repo::DeliverableRepository;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::job_repo::{JobRepository, PurgeReport};
use crate::repo::note_repo::NoteRepository;
use crate::repo::query::{CompletionFilter, JobFilter};
use std::cell::RefCell;
use uuid::Uuid;

#[derive(Debug)]
struct JobArena {
    job: Job,
    deliverables: Vec<Deliverable>,
    checklist_items: Vec<ChecklistItem>,
    notes: Vec<Note>,
}

impl JobArena {
    fn new(job: Job) -> Self {
        Self {
            job,
            deliverables: Vec::new(),
            checklist_items: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Child record kinds stored inside a job arena.
trait ArenaChild: Clone {
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;
    fn owner(&self) -> JobId;
    fn validate_record(&self) -> RepoResult<()>;
    fn slots(arena: &JobArena) -> &Vec<Self>;
    fn slots_mut(arena: &mut JobArena) -> &mut Vec<Self>;
}

impl ArenaChild for Deliverable {
    const ENTITY: &'static str = "deliverable";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> JobId {
        self.job_id
    }

    fn validate_record(&self) -> RepoResult<()> {
        Ok(self.validate()?)
    }

    fn slots(arena: &JobArena) -> &Vec<Self> {
        &arena.deliverables
    }

    fn slots_mut(arena: &mut JobArena) -> &mut Vec<Self> {
        &mut arena.deliverables
    }
}

impl ArenaChild for ChecklistItem {
    const ENTITY: &'static str = "checklist item";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> JobId {
        self.job_id
    }

    fn validate_record(&self) -> RepoResult<()> {
        Ok(self.validate()?)
    }

    fn slots(arena: &JobArena) -> &Vec<Self> {
        &arena.checklist_items
    }

    fn slots_mut(arena: &mut JobArena) -> &mut Vec<Self> {
        &mut arena.checklist_items
    }
}

impl ArenaChild for Note {
    const ENTITY: &'static str = "note";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> JobId {
        self.job_id
    }

    fn validate_record(&self) -> RepoResult<()> {
        Ok(self.validate()?)
    }

    fn slots(arena: &JobArena) -> &Vec<Self> {
        &arena.notes
    }

    fn slots_mut(arena: &mut JobArena) -> &mut Vec<Self> {
        &mut arena.notes
    }
}

/// Arena-per-job store implementing every repository trait.
#[derive(Debug, Default)]
pub struct MemoryWorkStore {
    arenas: RefCell<Vec<JobArena>>,
}

impl MemoryWorkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of job arenas, active and soft-deleted.
    pub fn job_count(&self) -> usize {
        self.arenas.borrow().len()
    }

    fn insert_child<T: ArenaChild>(&self, child: &T) -> RepoResult<Uuid> {
        child.validate_record()?;
        let mut arenas = self.arenas.borrow_mut();
        if arenas
            .iter()
            .any(|arena| T::slots(arena).iter().any(|slot| slot.id() == child.id()))
        {
            return Err(RepoError::InvalidData(format!(
                "duplicate {} id {}",
                T::ENTITY,
                child.id()
            )));
        }
        let arena = arenas
            .iter_mut()
            .find(|arena| arena.job.id == child.owner())
            .ok_or_else(|| RepoError::not_found("job", child.owner()))?;
        T::slots_mut(arena).push(child.clone());
        Ok(child.id())
    }

    fn update_child<T: ArenaChild>(&self, child: &T) -> RepoResult<()> {
        child.validate_record()?;
        let mut arenas = self.arenas.borrow_mut();
        let slot = arenas
            .iter_mut()
            .find(|arena| arena.job.id == child.owner())
            .and_then(|arena| {
                T::slots_mut(arena)
                    .iter_mut()
                    .find(|slot| slot.id() == child.id())
            })
            .ok_or_else(|| RepoError::not_found(T::ENTITY, child.id()))?;
        *slot = child.clone();
        Ok(())
    }

    fn get_child<T: ArenaChild>(&self, id: Uuid) -> Option<T> {
        self.arenas.borrow().iter().find_map(|arena| {
            T::slots(arena)
                .iter()
                .find(|slot| slot.id() == id)
                .cloned()
        })
    }

    fn list_children<T: ArenaChild>(
        &self,
        job_id: JobId,
        keep: impl Fn(&T) -> bool,
    ) -> Vec<T> {
        self.arenas
            .borrow()
            .iter()
            .find(|arena| arena.job.id == job_id)
            .map(|arena| T::slots(arena).iter().filter(|slot| keep(slot)).cloned().collect())
            .unwrap_or_default()
    }

    fn delete_child<T: ArenaChild>(&self, id: Uuid) -> RepoResult<()> {
        let mut arenas = self.arenas.borrow_mut();
        for arena in arenas.iter_mut() {
            let slots = T::slots_mut(arena);
            if let Some(position) = slots.iter().position(|slot| slot.id() == id) {
                slots.remove(position);
                return Ok(());
            }
        }
        Err(RepoError::not_found(T::ENTITY, id))
    }
}

impl JobRepository for MemoryWorkStore {
    fn insert_job(&self, job: &Job) -> RepoResult<JobId> {
        job.validate()?;
        let mut arenas = self.arenas.borrow_mut();
        if arenas.iter().any(|arena| arena.job.id == job.id) {
            return Err(RepoError::InvalidData(format!("duplicate job id {}", job.id)));
        }
        arenas.push(JobArena::new(job.clone()));
        Ok(job.id)
    }

    fn update_job(&self, job: &Job) -> RepoResult<()> {
        job.validate()?;
        let mut arenas = self.arenas.borrow_mut();
        let arena = arenas
            .iter_mut()
            .find(|arena| arena.job.id == job.id)
            .ok_or_else(|| RepoError::not_found("job", job.id))?;
        let creation_date = arena.job.creation_date;
        arena.job = Job {
            creation_date,
            ..job.clone()
        };
        Ok(())
    }

    fn get_job(&self, id: JobId) -> RepoResult<Option<Job>> {
        Ok(self
            .arenas
            .borrow()
            .iter()
            .find(|arena| arena.job.id == id)
            .map(|arena| arena.job.clone()))
    }

    fn list_jobs(&self, filter: JobFilter) -> RepoResult<Vec<Job>> {
        Ok(self
            .arenas
            .borrow()
            .iter()
            .filter(|arena| filter.matches(arena.job.is_deleted()))
            .map(|arena| arena.job.clone())
            .collect())
    }

    fn purge_job(&self, id: JobId) -> RepoResult<PurgeReport> {
        let mut arenas = self.arenas.borrow_mut();
        let position = arenas
            .iter()
            .position(|arena| arena.job.id == id)
            .ok_or_else(|| RepoError::not_found("job", id))?;
        let arena = arenas.remove(position);

        Ok(PurgeReport {
            job_id: id,
            deliverable_ids: arena.deliverables.iter().map(|d| d.id).collect(),
            checklist_items_removed: arena.checklist_items.len(),
            notes_removed: arena.notes.len(),
        })
    }
}

impl DeliverableRepository for MemoryWorkStore {
    fn insert_deliverable(&self, deliverable: &Deliverable) -> RepoResult<DeliverableId> {
        self.insert_child(deliverable)
    }

    fn update_deliverable(&self, deliverable: &Deliverable) -> RepoResult<()> {
        self.update_child(deliverable)
    }

    fn get_deliverable(&self, id: DeliverableId) -> RepoResult<Option<Deliverable>> {
        Ok(self.get_child(id))
    }

    fn list_deliverables(
        &self,
        job_id: JobId,
        filter: CompletionFilter,
    ) -> RepoResult<Vec<Deliverable>> {
        Ok(self.list_children(job_id, |d: &Deliverable| {
            filter.matches(d.completion_date)
        }))
    }

    fn delete_deliverable(&self, id: DeliverableId) -> RepoResult<()> {
        self.delete_child::<Deliverable>(id)
    }
}

impl ChecklistRepository for MemoryWorkStore {
    fn insert_checklist_item(&self, item: &ChecklistItem) -> RepoResult<ChecklistItemId> {
        self.insert_child(item)
    }

    fn update_checklist_item(&self, item: &ChecklistItem) -> RepoResult<()> {
        self.update_child(item)
    }

    fn get_checklist_item(&self, id: ChecklistItemId) -> RepoResult<Option<ChecklistItem>> {
        Ok(self.get_child(id))
    }

    fn list_checklist_items(
        &self,
        job_id: JobId,
        filter: CompletionFilter,
    ) -> RepoResult<Vec<ChecklistItem>> {
        Ok(self.list_children(job_id, |item: &ChecklistItem| {
            filter.matches(item.completion_date)
        }))
    }

    fn delete_checklist_item(&self, id: ChecklistItemId) -> RepoResult<()> {
        self.delete_child::<ChecklistItem>(id)
    }
}

impl NoteRepository for MemoryWorkStore {
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
        self.insert_child(note)
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        let creation_date = self
            .get_child::<Note>(note.id)
            .filter(|stored| stored.job_id == note.job_id)
            .map(|stored| stored.creation_date)
            .ok_or_else(|| RepoError::not_found("note", note.id))?;
        self.update_child(&Note {
            creation_date,
            ..note.clone()
        })
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        Ok(self.get_child(id))
    }

    fn list_notes(&self, job_id: JobId) -> RepoResult<Vec<Note>> {
        let mut notes = self.list_children(job_id, |_: &Note| true);
        notes.sort_by_key(|note| note.creation_date);
        Ok(notes)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        self.delete_child::<Note>(id)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryWorkStore;
    use crate::model::deliverable::Deliverable;
    use crate::model::job::Job;
    use crate::model::note::Note;
    use crate::repo::deliverable_repo::DeliverableRepository;
    use crate::repo::error::RepoError;
    use crate::repo::job_repo::JobRepository;
    use crate::repo::note_repo::NoteRepository;
    use crate::repo::query::{CompletionFilter, JobFilter};

    #[test]
    fn purge_drops_the_whole_arena() {
        let store = MemoryWorkStore::new();
        let job = Job::new("Studio", 1);
        store.insert_job(&job).unwrap();
        let deliverable = Deliverable::new(job.id, "Mixdown", 10);
        store.insert_deliverable(&deliverable).unwrap();
        store
            .insert_note(&Note::new(job.id, "body", "label", 0, 2))
            .unwrap();

        let report = store.purge_job(job.id).unwrap();
        assert_eq!(report.deliverable_ids, vec![deliverable.id]);
        assert_eq!(report.notes_removed, 1);
        assert_eq!(store.job_count(), 0);
        assert!(store.get_deliverable(deliverable.id).unwrap().is_none());
        assert!(store.list_jobs(JobFilter::All).unwrap().is_empty());
    }

    #[test]
    fn child_insert_requires_existing_owner() {
        let store = MemoryWorkStore::new();
        let orphan = Deliverable::new(uuid::Uuid::new_v4(), "Mixdown", 10);
        let err = store.insert_deliverable(&orphan).unwrap_err();
        assert!(matches!(err, RepoError::NotFound { entity: "job", .. }));
    }

    #[test]
    fn update_cannot_move_child_to_other_job() {
        let store = MemoryWorkStore::new();
        let first = Job::new("First", 1);
        let second = Job::new("Second", 2);
        store.insert_job(&first).unwrap();
        store.insert_job(&second).unwrap();
        let mut deliverable = Deliverable::new(first.id, "Mixdown", 10);
        store.insert_deliverable(&deliverable).unwrap();

        deliverable.job_id = second.id;
        let err = store.update_deliverable(&deliverable).unwrap_err();
        assert!(matches!(err, RepoError::NotFound { entity: "deliverable", .. }));
        assert_eq!(
            store
                .list_deliverables(first.id, CompletionFilter::All)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn update_keeps_creation_dates() {
        let store = MemoryWorkStore::new();
        let mut job = Job::new("Studio", 100);
        store.insert_job(&job).unwrap();
        job.creation_date = 999;
        job.title = "Studio B".to_string();
        store.update_job(&job).unwrap();

        let stored = store.get_job(job.id).unwrap().unwrap();
        assert_eq!(stored.title, "Studio B");
        assert_eq!(stored.creation_date, 100);
    }
}
