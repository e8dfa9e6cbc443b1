//! Persistence gateway contracts and implementations.
//!
//! # Responsibility
//! - Define one repository trait per record kind.
//! - Provide a SQLite gateway and an in-memory arena gateway that honor the
//!   same contracts, including cascade delete on job purge.
//!
//! # Invariants
//! - Write paths validate records before touching storage.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Child writes are scoped to their owning job; an update that names a
//!   different owner is `NotFound`.

pub mod checklist_repo;
pub mod deliverable_repo;
pub mod error;
pub mod job_repo;
pub mod memory_store;
pub mod note_repo;
pub mod query;
pub mod sqlite_store;
