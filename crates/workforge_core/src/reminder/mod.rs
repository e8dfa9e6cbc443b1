//! Reminder projection and notification service boundary.
//!
//! Holds no state of its own: every call derives triggers from the
//! deliverable it is given.

pub mod notifier;
pub mod scheduler;
