//! Core domain logic for WorkForge.
//! Job, deliverable, checklist and note records live here together with
//! their persistence gateways, reminder scheduling and use-case services.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::checklist::{ChecklistItem, ChecklistItemId, ChecklistPriority};
pub use model::deliverable::{
    Deliverable, DeliverableColor, DeliverableId, ReminderOffset, ReminderOffsets, MS_PER_DAY,
};
pub use model::job::{Job, JobId, JobLifecycle, JobProfile, JobType, PayType};
pub use model::note::{Note, NoteId, NOTE_PALETTE, NOTE_PALETTE_SIZE};
pub use model::ValidationError;
pub use reminder::notifier::{
    InMemoryNotificationCenter, NotificationCommand, NotificationError, NotificationRequest,
    NotificationService, PermissionStatus,
};
pub use reminder::scheduler::{reminder_key, ReminderScheduler, ReminderZone, REMINDER_TITLE};
pub use repo::checklist_repo::ChecklistRepository;
pub use repo::deliverable_repo::DeliverableRepository;
pub use repo::error::{RepoError, RepoResult};
pub use repo::job_repo::{JobRepository, PurgeReport};
pub use repo::memory_store::MemoryWorkStore;
pub use repo::note_repo::NoteRepository;
pub use repo::query::{CompletionFilter, JobFilter};
pub use repo::sqlite_store::SqliteWorkStore;
pub use service::checklist_tracker::ChecklistTracker;
pub use service::deliverable_tracker::DeliverableTracker;
pub use service::error::ServiceError;
pub use service::job_directory::JobDirectory;
pub use service::note_board::NoteBoard;

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
