use std::path::Path;

use dr_history::HistoryStore;

use super::open_history;

pub fn run(history: &Path) -> Result<(), String> {
    let store = open_history(history)?;
    let removed = store.clear().map_err(|e| e.to_string())?;
    println!("  Deleted {removed} rolls.");
    Ok(())
}
