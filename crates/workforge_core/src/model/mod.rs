//! Job-tracking domain model.
//!
//! # Responsibility
//! - Define the persisted shape of jobs and the records they own.
//! - Keep lifecycle transitions (soft delete, completion) inside the model so
//!   every caller observes the same invariants.
//!
//! # Invariants
//! - Every child record (`Deliverable`, `ChecklistItem`, `Note`) carries the
//!   id of exactly one owning `Job` and is never re-parented.
//! - Completion is a single `Option<i64>`: a record is completed iff it has a
//!   completion timestamp.
//! - Timestamps are Unix epoch milliseconds.

pub mod checklist;
pub mod deliverable;
pub mod job;
pub mod note;
pub mod validation;

pub use validation::ValidationError;
