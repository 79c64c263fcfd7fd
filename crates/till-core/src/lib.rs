//! Shared domain layer for tillpoint.
//!
//! Holds the record types stored in the CSV files, the crate-wide error
//! type, the store date/time formats, display formatting helpers and the
//! persisted CLI settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
