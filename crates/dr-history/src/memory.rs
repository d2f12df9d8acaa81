//! In-memory roll history.

use std::sync::{PoisonError, RwLock};

use dr_core::{RollId, RollRecord};

use crate::error::HistoryResult;
use crate::store::{HistoryStore, newest_first};

/// A roll history that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    records: RwLock<Vec<RollRecord>>,
}

impl MemoryHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&self, record: RollRecord) -> HistoryResult<()> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        Ok(())
    }

    fn list_all(&self) -> HistoryResult<Vec<RollRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(newest_first(&records))
    }

    fn delete(&self, id: RollId) -> HistoryResult<bool> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|r| r.id() != id);
        Ok(records.len() != before)
    }
}
