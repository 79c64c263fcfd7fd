//! Data layer for tillpoint.
//!
//! Owns every flat-file store of the outlet: attendance sessions, the
//! staff list, the inventory matrix, the outlet directory, the sales log
//! and the daily receipt files, plus the flows that weave them together
//! (sales, stock movements, stock counts) and the sales aggregation
//! pipeline.

pub mod analytics;
pub mod attendance;
pub mod counts;
pub mod employees;
pub mod inventory;
pub mod movement;
pub mod outlets;
pub mod receipts;
pub mod register;
pub mod sales;
pub mod store;

pub use till_core as core;
