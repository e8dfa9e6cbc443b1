//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose job, deliverable, checklist and note use cases to Dart via FRB.
//! - Own the process-wide database path and notification center.
//! - Hand reminder changes to the host as an ordered command stream, and
//!   rebuild them from storage on startup.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens its own connection; no connection outlives a call.
//! - Failures come back as `ok=false` envelopes with a diagnostic message.

use log::warn;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};
use uuid::Uuid;
use workforge_core::db::open_db;
use workforge_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ChecklistItem, ChecklistPriority, ChecklistTracker, Deliverable, DeliverableTracker,
    InMemoryNotificationCenter, Job, JobDirectory, JobProfile, JobType, NotificationCommand,
    NotificationRequest, Note, NoteBoard, PayType, PermissionStatus, ReminderOffset, ReminderOffsets,
    ReminderScheduler, ServiceError, SqliteWorkStore, SystemClock, ValidationError,
};

const DB_FILE_NAME: &str = "workforge.sqlite3";

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static NOTIFICATIONS: OnceLock<Mutex<InMemoryNotificationCenter>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the database file for this process.
///
/// Must run before the first data call; afterwards only the same path is
/// accepted. Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "db path must not be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "db path already set to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the created or touched record.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// Job row for list and detail screens.
#[derive(Debug, Clone, PartialEq)]
pub struct JobItem {
    pub id: String,
    pub title: String,
    pub creation_date: i64,
    /// Set only for soft-deleted jobs.
    pub deletion_date: Option<i64>,
    pub email: Option<String>,
    pub pay_rate: f64,
    pub pay_type: String,
    pub manager_name: Option<String>,
    pub role_title: Option<String>,
    pub equipment_list: Option<String>,
    pub job_type: String,
    /// Hidden unless `job_type` is `Contracted`.
    pub contract_end_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobListResponse {
    pub ok: bool,
    pub items: Vec<JobItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverableItem {
    pub id: String,
    pub job_id: String,
    pub task_description: String,
    pub due_date: i64,
    pub completion_date: Option<i64>,
    pub color: String,
    /// Offset tags in picker order.
    pub reminder_offsets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverableListResponse {
    pub ok: bool,
    pub items: Vec<DeliverableItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistEntry {
    pub id: String,
    pub job_id: String,
    pub title: String,
    pub completion_date: Option<i64>,
    /// Display priority; unknown stored values show as `Green`.
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistListResponse {
    pub ok: bool,
    pub items: Vec<ChecklistEntry>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub job_id: String,
    pub content: String,
    pub summary: String,
    pub color_index: u8,
    pub color_name: String,
    pub creation_date: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListResponse {
    pub ok: bool,
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Pending local reminder as seen by a polling host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub key: String,
    pub title: String,
    pub body: String,
    pub trigger_at: i64,
}

/// Reminder change the host applies to its OS notification center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderCommand {
    /// Add or replace the request with the same key.
    Schedule(ReminderItem),
    /// Withdraw these keys; unknown keys are ignored.
    Cancel { keys: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderResyncResponse {
    pub ok: bool,
    /// Requests scheduled across all jobs.
    pub scheduled: u32,
    pub message: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn job_list_active() -> JobListResponse {
    job_list("job_list_active", |jobs| jobs.list_active())
}

#[flutter_rust_bridge::frb(sync)]
pub fn job_list_deleted() -> JobListResponse {
    job_list("job_list_deleted", |jobs| jobs.list_deleted())
}

/// Default title for the quick-add flow. Falls back to `Job 1` on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn job_next_default_title() -> String {
    with_session(|session| Ok(session.jobs().next_default_title()?))
        .unwrap_or_else(|_| "Job 1".to_string())
}

#[flutter_rust_bridge::frb(sync)]
pub fn job_create(title: String) -> ActionResponse {
    action("job_create", "Job created.", || {
        with_session(|session| Ok(session.jobs().create(title)?.id))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn job_rename(job_id: String, title: String) -> ActionResponse {
    action("job_rename", "Job renamed.", || {
        with_session(|session| {
            let jobs = session.jobs();
            let mut job = jobs.get(parse_id(&job_id)?)?;
            jobs.rename(&mut job, title)?;
            Ok(job.id)
        })
    })
}

/// Replaces the job info fields in one write.
#[flutter_rust_bridge::frb(sync)]
#[allow(clippy::too_many_arguments)]
pub fn job_update_profile(
    job_id: String,
    email: Option<String>,
    pay_rate: f64,
    pay_type: String,
    manager_name: Option<String>,
    role_title: Option<String>,
    equipment_list: Option<String>,
    job_type: String,
    contract_end_date: Option<i64>,
) -> ActionResponse {
    action("job_update_profile", "Job updated.", || {
        let profile = JobProfile {
            email,
            pay_rate,
            pay_type: PayType::parse(&pay_type)
                .ok_or_else(|| unknown_value("pay type", &pay_type))?,
            manager_name,
            role_title,
            equipment_list,
            job_type: JobType::parse(&job_type)
                .ok_or_else(|| unknown_value("job type", &job_type))?,
            contract_end_date,
        };
        with_session(|session| {
            let jobs = session.jobs();
            let mut job = jobs.get(parse_id(&job_id)?)?;
            jobs.update_profile(&mut job, profile)?;
            Ok(job.id)
        })
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn job_soft_delete(job_id: String) -> ActionResponse {
    action("job_soft_delete", "Job moved to recently deleted.", || {
        with_session(|session| {
            let jobs = session.jobs();
            let mut job = jobs.get(parse_id(&job_id)?)?;
            jobs.soft_delete(&mut job)?;
            Ok(job.id)
        })
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn job_restore(job_id: String) -> ActionResponse {
    action("job_restore", "Job restored.", || {
        with_session(|session| {
            let jobs = session.jobs();
            let mut job = jobs.get(parse_id(&job_id)?)?;
            jobs.restore(&mut job)?;
            Ok(job.id)
        })
    })
}

/// Permanently deletes a job with all its deliverables, checklist items
/// and notes.
#[flutter_rust_bridge::frb(sync)]
pub fn job_purge(job_id: String) -> ActionResponse {
    action("job_purge", "Job permanently deleted.", || {
        with_session(|session| {
            let jobs = session.jobs();
            let job = jobs.get(parse_id(&job_id)?)?;
            Ok(jobs.purge(job)?.job_id)
        })
    })
}

/// Lists deliverables of a job: open ones by due date, or completed ones by
/// most recent completion.
#[flutter_rust_bridge::frb(sync)]
pub fn deliverable_list(job_id: String, completed: bool) -> DeliverableListResponse {
    let result = with_session(|session| {
        let job = session.jobs().get(parse_id(&job_id)?)?;
        let tracker = session.deliverables();
        let items = if completed {
            tracker.list_completed(&job)?
        } else {
            tracker.list_active(&job)?
        };
        Ok(items.iter().map(to_deliverable_item).collect::<Vec<_>>())
    });
    match result {
        Ok(items) => DeliverableListResponse {
            message: format!("Found {} deliverable(s).", items.len()),
            ok: true,
            items,
        },
        Err(err) => DeliverableListResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message("deliverable_list", &err),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn deliverable_add(job_id: String, task_description: String, due_date: i64) -> ActionResponse {
    action("deliverable_add", "Deliverable added.", || {
        with_session(|session| {
            let job = session.jobs().get(parse_id(&job_id)?)?;
            Ok(session
                .deliverables()
                .add(&job, task_description, due_date)?
                .id)
        })
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn deliverable_set_due_date(deliverable_id: String, due_date: i64) -> ActionResponse {
    deliverable_action("deliverable_set_due_date", &deliverable_id, |tracker, deliverable| {
        tracker.set_due_date(deliverable, due_date)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn deliverable_set_description(
    deliverable_id: String,
    task_description: String,
) -> ActionResponse {
    deliverable_action(
        "deliverable_set_description",
        &deliverable_id,
        |tracker, deliverable| tracker.set_description(deliverable, task_description),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn deliverable_complete(deliverable_id: String) -> ActionResponse {
    deliverable_action("deliverable_complete", &deliverable_id, |tracker, deliverable| {
        tracker.complete(deliverable)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn deliverable_uncomplete(deliverable_id: String) -> ActionResponse {
    deliverable_action("deliverable_uncomplete", &deliverable_id, |tracker, deliverable| {
        tracker.uncomplete(deliverable)
    })
}

/// Unknown color tags are stored as `gray`.
#[flutter_rust_bridge::frb(sync)]
pub fn deliverable_set_color(deliverable_id: String, color: String) -> ActionResponse {
    deliverable_action("deliverable_set_color", &deliverable_id, |tracker, deliverable| {
        tracker.set_color(deliverable, &color)
    })
}

/// Replaces the reminder offsets. Accepts tags (`2weeks`) or labels (`2 weeks`).
#[flutter_rust_bridge::frb(sync)]
pub fn deliverable_set_reminder_offsets(
    deliverable_id: String,
    offsets: Vec<String>,
) -> ActionResponse {
    let parsed = offsets
        .iter()
        .map(|raw| ReminderOffset::parse(raw).ok_or_else(|| unknown_value("reminder offset", raw)))
        .collect::<Result<ReminderOffsets, ApiError>>();
    let parsed = match parsed {
        Ok(parsed) => parsed,
        Err(err) => {
            return ActionResponse::failure(failure_message("deliverable_set_reminder_offsets", &err))
        }
    };
    deliverable_action(
        "deliverable_set_reminder_offsets",
        &deliverable_id,
        |tracker, deliverable| tracker.set_reminder_offsets(deliverable, parsed),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn deliverable_remove(deliverable_id: String) -> ActionResponse {
    action("deliverable_remove", "Deliverable removed.", || {
        with_session(|session| {
            let tracker = session.deliverables();
            let deliverable = tracker.get(parse_id(&deliverable_id)?)?;
            let id = deliverable.id;
            tracker.remove(deliverable)?;
            Ok(id)
        })
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn checklist_list(job_id: String, completed: bool) -> ChecklistListResponse {
    let result = with_session(|session| {
        let job = session.jobs().get(parse_id(&job_id)?)?;
        let tracker = session.checklist();
        let items = if completed {
            tracker.list_completed(&job)?
        } else {
            tracker.list_active(&job)?
        };
        Ok(items.iter().map(to_checklist_entry).collect::<Vec<_>>())
    });
    match result {
        Ok(items) => ChecklistListResponse {
            message: format!("Found {} item(s).", items.len()),
            ok: true,
            items,
        },
        Err(err) => ChecklistListResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message("checklist_list", &err),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn checklist_add(job_id: String, title: String) -> ActionResponse {
    action("checklist_add", "Checklist item added.", || {
        with_session(|session| {
            let job = session.jobs().get(parse_id(&job_id)?)?;
            Ok(session.checklist().add(&job, title)?.id)
        })
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn checklist_rename(item_id: String, title: String) -> ActionResponse {
    checklist_action("checklist_rename", &item_id, |tracker, item| {
        tracker.rename(item, title)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn checklist_complete(item_id: String) -> ActionResponse {
    checklist_action("checklist_complete", &item_id, |tracker, item| {
        tracker.complete(item)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn checklist_uncomplete(item_id: String) -> ActionResponse {
    checklist_action("checklist_uncomplete", &item_id, |tracker, item| {
        tracker.uncomplete(item)
    })
}

/// `priority` is one of `Red|Green|Yellow` (case-insensitive).
#[flutter_rust_bridge::frb(sync)]
pub fn checklist_set_priority(item_id: String, priority: String) -> ActionResponse {
    let Some(parsed) = ChecklistPriority::parse(&priority) else {
        let err = unknown_value("priority", &priority);
        return ActionResponse::failure(failure_message("checklist_set_priority", &err));
    };
    checklist_action("checklist_set_priority", &item_id, |tracker, item| {
        tracker.set_priority(item, parsed)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn checklist_remove(item_id: String) -> ActionResponse {
    action("checklist_remove", "Checklist item removed.", || {
        with_session(|session| {
            let tracker = session.checklist();
            let item = tracker.get(parse_id(&item_id)?)?;
            let id = item.id;
            tracker.remove(item)?;
            Ok(id)
        })
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_list(job_id: String) -> NoteListResponse {
    let result = with_session(|session| {
        let job = session.jobs().get(parse_id(&job_id)?)?;
        let notes = session.notes().list(&job)?;
        Ok(notes.iter().map(to_note_item).collect::<Vec<_>>())
    });
    match result {
        Ok(items) => NoteListResponse {
            message: format!("Found {} note(s).", items.len()),
            ok: true,
            items,
        },
        Err(err) => NoteListResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message("note_list", &err),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_create(job_id: String, content: String, summary: String) -> ActionResponse {
    action("note_create", "Note created.", || {
        with_session(|session| {
            let job = session.jobs().get(parse_id(&job_id)?)?;
            Ok(session.notes().create(&job, content, summary)?.id)
        })
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_update(note_id: String, content: String, summary: String) -> ActionResponse {
    note_action("note_update", &note_id, |board, note| {
        board.update(note, content, summary)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_set_color(note_id: String, color_index: i64) -> ActionResponse {
    note_action("note_set_color", &note_id, |board, note| {
        board.set_color(note, color_index)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_remove(note_id: String) -> ActionResponse {
    action("note_remove", "Note removed.", || {
        with_session(|session| {
            let board = session.notes();
            let note = board.get(parse_id(&note_id)?)?;
            let id = note.id;
            board.remove(note)?;
            Ok(id)
        })
    })
}

/// Asks for notification permission. Call once at startup.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_request_permission() -> bool {
    let center = lock_notifications();
    ReminderScheduler::new(&*center).request_permission() == PermissionStatus::Granted
}

/// Pending reminders, soonest first.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_pending() -> Vec<ReminderItem> {
    lock_notifications()
        .pending()
        .into_iter()
        .map(to_reminder_item)
        .collect()
}

/// Removes and returns reminders due at or before `now_epoch_ms`.
///
/// Only for hosts without an OS notification center; alerts fire while the
/// process runs.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_take_due(now_epoch_ms: i64) -> Vec<ReminderItem> {
    lock_notifications()
        .drain_due(now_epoch_ms)
        .into_iter()
        .map(to_reminder_item)
        .collect()
}

/// Removes and returns reminder changes since the last call, oldest first.
///
/// Hosts with an OS notification center replay these in order after every
/// data call, so completed, removed and purged deliverables stop alerting.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_take_commands() -> Vec<ReminderCommand> {
    lock_notifications()
        .take_commands()
        .into_iter()
        .map(to_reminder_command)
        .collect()
}

/// Re-derives every deliverable's reminders from the database.
///
/// Call once at startup after `reminders_request_permission`; the
/// resulting commands are picked up by `reminders_take_commands`.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_resync() -> ReminderResyncResponse {
    let result = with_session(|session| {
        let jobs = session.jobs();
        let tracker = session.deliverables();
        let mut all_jobs = jobs.list_active()?;
        all_jobs.extend(jobs.list_deleted()?);
        let mut scheduled = 0;
        for job in &all_jobs {
            scheduled += tracker.resync_reminders(job)?;
        }
        Ok(scheduled)
    });
    match result {
        Ok(scheduled) => ReminderResyncResponse {
            ok: true,
            scheduled: u32::try_from(scheduled).unwrap_or(u32::MAX),
            message: format!("Scheduled {scheduled} reminder(s)."),
        },
        Err(err) => ReminderResyncResponse {
            ok: false,
            scheduled: 0,
            message: failure_message("reminders_resync", &err),
        },
    }
}

#[derive(Debug)]
enum ApiError {
    Setup(String),
    InvalidId(String),
    Service(ServiceError),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup(message) => write!(f, "{message}"),
            Self::InvalidId(raw) => write!(f, "invalid id `{raw}`"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Uuid) -> Self {
        Self {
            ok: true,
            id: Some(id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

type Jobs<'a> = JobDirectory<SqliteWorkStore<'a>, &'a InMemoryNotificationCenter, SystemClock>;
type Deliverables<'a> =
    DeliverableTracker<SqliteWorkStore<'a>, &'a InMemoryNotificationCenter, SystemClock>;
type Checklist<'a> = ChecklistTracker<SqliteWorkStore<'a>, SystemClock>;
type Notes<'a> = NoteBoard<SqliteWorkStore<'a>, SystemClock>;

/// Collaborators for one call.
struct Session<'a> {
    store: SqliteWorkStore<'a>,
    center: &'a InMemoryNotificationCenter,
}

impl<'a> Session<'a> {
    fn jobs(&self) -> Jobs<'a> {
        JobDirectory::new(self.store, ReminderScheduler::new(self.center), SystemClock)
    }

    fn deliverables(&self) -> Deliverables<'a> {
        DeliverableTracker::new(self.store, ReminderScheduler::new(self.center), SystemClock)
    }

    fn checklist(&self) -> Checklist<'a> {
        ChecklistTracker::new(self.store, SystemClock)
    }

    fn notes(&self) -> Notes<'a> {
        NoteBoard::new(self.store, SystemClock)
    }
}

fn with_session<T>(f: impl FnOnce(&Session<'_>) -> Result<T, ApiError>) -> Result<T, ApiError> {
    let conn = open_db(resolve_db_path())
        .map_err(|err| ApiError::Setup(format!("database open failed: {err}")))?;
    let store = SqliteWorkStore::try_new(&conn)
        .map_err(|err| ApiError::Setup(format!("store init failed: {err}")))?;
    let center = lock_notifications();
    f(&Session {
        store,
        center: &*center,
    })
}

fn action(
    op: &'static str,
    success_message: &'static str,
    run: impl FnOnce() -> Result<Uuid, ApiError>,
) -> ActionResponse {
    match run() {
        Ok(id) => ActionResponse::success(success_message, id),
        Err(err) => ActionResponse::failure(failure_message(op, &err)),
    }
}

fn job_list(
    op: &'static str,
    list: impl FnOnce(&Jobs<'_>) -> Result<Vec<Job>, ServiceError>,
) -> JobListResponse {
    match with_session(|session| Ok(list(&session.jobs())?)) {
        Ok(jobs) => JobListResponse {
            message: format!("Found {} job(s).", jobs.len()),
            ok: true,
            items: jobs.iter().map(to_job_item).collect(),
        },
        Err(err) => JobListResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message(op, &err),
        },
    }
}

fn deliverable_action(
    op: &'static str,
    raw_id: &str,
    edit: impl FnOnce(&Deliverables<'_>, &mut Deliverable) -> Result<(), ServiceError>,
) -> ActionResponse {
    action(op, "Deliverable updated.", || {
        with_session(|session| {
            let tracker = session.deliverables();
            let mut deliverable = tracker.get(parse_id(raw_id)?)?;
            edit(&tracker, &mut deliverable)?;
            Ok(deliverable.id)
        })
    })
}

fn checklist_action(
    op: &'static str,
    raw_id: &str,
    edit: impl FnOnce(&Checklist<'_>, &mut ChecklistItem) -> Result<(), ServiceError>,
) -> ActionResponse {
    action(op, "Checklist item updated.", || {
        with_session(|session| {
            let tracker = session.checklist();
            let mut item = tracker.get(parse_id(raw_id)?)?;
            edit(&tracker, &mut item)?;
            Ok(item.id)
        })
    })
}

fn note_action(
    op: &'static str,
    raw_id: &str,
    edit: impl FnOnce(&Notes<'_>, &mut Note) -> Result<(), ServiceError>,
) -> ActionResponse {
    action(op, "Note updated.", || {
        with_session(|session| {
            let board = session.notes();
            let mut note = board.get(parse_id(raw_id)?)?;
            edit(&board, &mut note)?;
            Ok(note.id)
        })
    })
}

fn failure_message(op: &'static str, err: &ApiError) -> String {
    warn!("event=ffi_call module=ffi status=error op={op} error={err}");
    format!("{op} failed: {err}")
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::InvalidId(raw.to_string()))
}

fn unknown_value(field: &'static str, value: &str) -> ApiError {
    ApiError::Service(ServiceError::Validation(ValidationError::UnknownValue {
        field,
        value: value.to_string(),
    }))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| std::env::temp_dir().join(DB_FILE_NAME))
        .clone()
}

/// Hosts must call `reminders_request_permission` before reminders are
/// accepted.
fn lock_notifications() -> std::sync::MutexGuard<'static, InMemoryNotificationCenter> {
    NOTIFICATIONS
        .get_or_init(|| Mutex::new(InMemoryNotificationCenter::new(PermissionStatus::Granted)))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn to_job_item(job: &Job) -> JobItem {
    JobItem {
        id: job.id.to_string(),
        title: job.title.clone(),
        creation_date: job.creation_date,
        deletion_date: job.deletion_date(),
        email: job.profile.email.clone(),
        pay_rate: job.profile.pay_rate,
        pay_type: job.profile.pay_type.as_str().to_string(),
        manager_name: job.profile.manager_name.clone(),
        role_title: job.profile.role_title.clone(),
        equipment_list: job.profile.equipment_list.clone(),
        job_type: job.profile.job_type.as_str().to_string(),
        contract_end_date: job.profile.effective_contract_end_date(),
    }
}

fn to_deliverable_item(deliverable: &Deliverable) -> DeliverableItem {
    DeliverableItem {
        id: deliverable.id.to_string(),
        job_id: deliverable.job_id.to_string(),
        task_description: deliverable.task_description.clone(),
        due_date: deliverable.due_date,
        completion_date: deliverable.completion_date,
        color: deliverable.color.as_str().to_string(),
        reminder_offsets: deliverable
            .reminder_offsets
            .iter()
            .map(|offset| offset.as_str().to_string())
            .collect(),
    }
}

fn to_checklist_entry(item: &ChecklistItem) -> ChecklistEntry {
    ChecklistEntry {
        id: item.id.to_string(),
        job_id: item.job_id.to_string(),
        title: item.title.clone(),
        completion_date: item.completion_date,
        priority: item.display_priority().as_str().to_string(),
    }
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.to_string(),
        job_id: note.job_id.to_string(),
        content: note.content.clone(),
        summary: note.summary.clone(),
        color_index: note.color_index,
        color_name: note.color_name().to_string(),
        creation_date: note.creation_date,
    }
}

fn to_reminder_item(request: NotificationRequest) -> ReminderItem {
    ReminderItem {
        key: request.key,
        title: request.title,
        body: request.body,
        trigger_at: request.trigger_at,
    }
}

fn to_reminder_command(command: NotificationCommand) -> ReminderCommand {
    match command {
        NotificationCommand::Schedule(request) => {
            ReminderCommand::Schedule(to_reminder_item(request))
        }
        NotificationCommand::Cancel(keys) => ReminderCommand::Cancel { keys },
    }
}
