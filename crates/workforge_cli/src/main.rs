//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `workforge_core` linkage without the Flutter runtime.
//! - With a database path argument, print per-job record counts.
//!
//! Usage: `workforge_cli [path/to/workforge.sqlite3]`

use std::process::ExitCode;
use workforge_core::{
    ChecklistRepository, CompletionFilter, DeliverableRepository, Job, JobFilter, JobRepository,
    NoteRepository, RepoResult, SqliteWorkStore,
};

fn main() -> ExitCode {
    println!("workforge_core ping={}", workforge_core::ping());
    println!("workforge_core version={}", workforge_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    let conn = match workforge_core::open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    match SqliteWorkStore::try_new(&conn).and_then(print_summary) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("failed to read `{db_path}`: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_summary(store: SqliteWorkStore<'_>) -> RepoResult<()> {
    let jobs = store.list_jobs(JobFilter::All)?;
    println!("jobs={}", jobs.len());
    for job in &jobs {
        print_job(store, job)?;
    }
    Ok(())
}

fn print_job(store: SqliteWorkStore<'_>, job: &Job) -> RepoResult<()> {
    let open_deliverables = store
        .list_deliverables(job.id, CompletionFilter::Active)?
        .len();
    let done_deliverables = store
        .list_deliverables(job.id, CompletionFilter::Completed)?
        .len();
    let checklist_items = store
        .list_checklist_items(job.id, CompletionFilter::All)?
        .len();
    let notes = store.list_notes(job.id)?.len();
    println!(
        "job id={} state={} deliverables_open={open_deliverables} deliverables_done={done_deliverables} checklist_items={checklist_items} notes={notes}",
        job.id,
        if job.is_deleted() { "deleted" } else { "active" },
    );
    Ok(())
}
