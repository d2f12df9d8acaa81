//! JSON file roll history.
//!
//! The whole history lives in one document:
//!
//! ```json
//! { "version": 1, "rolls": [ { "id": "…", "timestamp": "…", "results": [3, 5], "die_type": 6 } ] }
//! ```
//!
//! The document is cached in memory and rewritten on every mutation through a
//! temp file, fsync, and rename, so a crash mid-write leaves the previous
//! version intact.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use dr_core::{RollId, RollRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HistoryError, HistoryResult};
use crate::store::{HistoryStore, newest_first};

const FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Document {
    version: u32,
    rolls: Vec<RollRecord>,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u32,
    rolls: &'a [RollRecord],
}

/// A roll history persisted to a JSON file.
#[derive(Debug)]
pub struct JsonFileHistory {
    path: PathBuf,
    records: RwLock<Vec<RollRecord>>,
}

impl JsonFileHistory {
    /// Open the history at `path`. A missing file is an empty history; the
    /// file and its parent directories are created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> HistoryResult<Self> {
        let path = path.into();
        let records = load(&path)?;
        debug!(path = %path.display(), rolls = records.len(), "history opened");
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: &[RollRecord]) -> HistoryResult<()> {
        let missing_parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty() && !p.exists());
        if let Some(parent) = missing_parent {
            fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
        }

        let doc = DocumentRef {
            version: FORMAT_VERSION,
            rolls: records,
        };
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp = File::create(&tmp_path).map_err(|e| HistoryError::io(&tmp_path, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| HistoryError::io(&tmp_path, e))?;
        tmp.sync_all().map_err(|e| HistoryError::io(&tmp_path, e))?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path).map_err(|e| HistoryError::io(&self.path, e))?;
        debug!(path = %self.path.display(), rolls = records.len(), "history written");
        Ok(())
    }
}

impl HistoryStore for JsonFileHistory {
    fn append(&self, record: RollRecord) -> HistoryResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.push(record);
        if let Err(e) = self.persist(&records) {
            records.pop();
            return Err(e);
        }
        Ok(())
    }

    fn list_all(&self) -> HistoryResult<Vec<RollRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(newest_first(&records))
    }

    fn delete(&self, id: RollId) -> HistoryResult<bool> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let Some(pos) = records.iter().position(|r| r.id() == id) else {
            return Ok(false);
        };
        let removed = records.remove(pos);
        if let Err(e) = self.persist(&records) {
            records.insert(pos, removed);
            return Err(e);
        }
        Ok(true)
    }

    fn clear(&self) -> HistoryResult<usize> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let removed = std::mem::take(&mut *records);
        if let Err(e) = self.persist(&records) {
            *records = removed;
            return Err(e);
        }
        Ok(removed.len())
    }
}

fn load(path: &Path) -> HistoryResult<Vec<RollRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path).map_err(|e| HistoryError::io(path, e))?;
    let doc: Document = serde_json::from_str(&text).map_err(|e| {
        HistoryError::Serialization(format!("failed to parse '{}': {e}", path.display()))
    })?;
    if doc.version != FORMAT_VERSION {
        return Err(HistoryError::Serialization(format!(
            "unsupported history version {} in '{}'",
            doc.version,
            path.display()
        )));
    }
    for record in &doc.rolls {
        record.validate().map_err(|e| {
            HistoryError::Serialization(format!("invalid roll {}: {e}", record.id()))
        })?;
    }
    Ok(doc.rolls)
}
