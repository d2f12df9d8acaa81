pub mod clear;
pub mod delete;
pub mod dice;
pub mod history;
pub mod roll;

use std::path::Path;

use dr_history::{HistoryStore, JsonFileHistory};
use tracing::debug;

/// Open the history file, turning errors into CLI messages.
fn open_history(path: &Path) -> Result<JsonFileHistory, String> {
    let store =
        JsonFileHistory::open(path).map_err(|e| format!("failed to open history: {e}"))?;
    debug!(
        path = %store.path().display(),
        rolls = store.len().unwrap_or(0),
        "using history file"
    );
    Ok(store)
}

/// Render die values as "[3, 5]".
fn format_values(values: &[u32]) -> String {
    let vals: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", vals.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_values_brackets() {
        assert_eq!(format_values(&[3, 5]), "[3, 5]");
        assert_eq!(format_values(&[]), "[]");
    }
}
