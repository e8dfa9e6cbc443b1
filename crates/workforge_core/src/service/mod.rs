//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate gateway writes and reminder scheduling per user action.
//! - Keep presentation layers decoupled from storage details.
//!
//! # Invariants
//! - Input validation runs before any mutation; a `Validation` error means
//!   nothing changed, in memory or in storage.
//! - Operations take the caller's in-memory record by `&mut` and leave the
//!   mutation in place even when the write fails. The failure is logged and
//!   returned as `ServiceError::Persistence`.
//! - Services hold collaborators only, never UI state.

pub mod checklist_tracker;
pub mod deliverable_tracker;
pub mod error;
pub mod job_directory;
pub mod note_board;
