//! Flutter-facing bridge over `workforge_core`.

pub mod api;
