//! The history store contract.

use std::sync::Arc;

use dr_core::{CompletedRoll, RollId, RollRecord};
use tracing::{info, warn};

use crate::error::HistoryResult;

/// An append/list/delete log of completed rolls.
///
/// Implementations serialize writes against each other; reads may run
/// concurrently with one another.
pub trait HistoryStore: Send + Sync {
    /// Persist a new record.
    fn append(&self, record: RollRecord) -> HistoryResult<()>;

    /// All records, newest first. Records with equal timestamps are listed
    /// in reverse insertion order.
    fn list_all(&self) -> HistoryResult<Vec<RollRecord>>;

    /// Remove the record with `id`. Returns `false` if there was none; the
    /// remaining records are untouched either way.
    fn delete(&self, id: RollId) -> HistoryResult<bool>;

    /// Look up a single record.
    fn get(&self, id: RollId) -> HistoryResult<Option<RollRecord>> {
        Ok(self.list_all()?.into_iter().find(|r| r.id() == id))
    }

    /// Number of records.
    fn len(&self) -> HistoryResult<usize> {
        Ok(self.list_all()?.len())
    }

    /// Whether the history holds no records.
    fn is_empty(&self) -> HistoryResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove every record. Returns how many were removed.
    fn clear(&self) -> HistoryResult<usize> {
        let mut removed = 0;
        for record in self.list_all()? {
            if self.delete(record.id())? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Build a completion observer that saves every finished roll to `store`.
///
/// Failures are logged and swallowed: a roll that cannot be saved has still
/// completed.
pub fn record_completed_rolls<S>(store: Arc<S>) -> impl FnMut(&CompletedRoll) + Send + 'static
where
    S: HistoryStore + ?Sized + 'static,
{
    move |roll: &CompletedRoll| {
        let record = match roll.to_record() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "nothing to save for completed roll");
                return;
            }
        };
        let summary = record.to_string();
        match store.append(record) {
            Ok(()) => info!(roll = %summary, "roll saved"),
            Err(e) => warn!(roll = %summary, error = %e, "failed to save roll"),
        }
    }
}

pub(crate) fn newest_first(records: &[RollRecord]) -> Vec<RollRecord> {
    let mut sorted: Vec<RollRecord> = records.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    sorted
}
