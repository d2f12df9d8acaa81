//! Durable roll history for Dice Roll.
//!
//! The [`HistoryStore`] trait is an append/list/delete log of
//! [`dr_core::RollRecord`]s, listed newest first. [`MemoryHistory`] keeps
//! records in memory; [`JsonFileHistory`] persists them to a JSON document
//! with atomic rewrites.

pub mod error;
pub mod json;
pub mod memory;
pub mod store;

pub use error::{HistoryError, HistoryResult};
pub use json::JsonFileHistory;
pub use memory::MemoryHistory;
pub use store::{HistoryStore, record_completed_rolls};
