use std::path::Path;

use dr_core::{RollId, RollRecord};
use dr_history::HistoryStore;

use super::open_history;

/// Shortest id prefix accepted, to avoid deleting the wrong roll by accident.
const MIN_PREFIX: usize = 4;

pub fn run(history: &Path, target: &str) -> Result<(), String> {
    let store = open_history(history)?;
    let rolls = store.list_all().map_err(|e| e.to_string())?;

    let Some(id) = resolve(&rolls, target.trim())? else {
        println!("  No roll matching '{target}'.");
        return Ok(());
    };

    if store.delete(id).map_err(|e| e.to_string())? {
        println!("  Deleted roll {}.", id.short());
    } else {
        println!("  No roll matching '{target}'.");
    }
    Ok(())
}

/// Resolve `#N`, a full id, or an id prefix against the newest-first list.
fn resolve(rolls: &[RollRecord], target: &str) -> Result<Option<RollId>, String> {
    if let Some(position) = target.strip_prefix('#') {
        let n: usize = position
            .parse()
            .map_err(|_| format!("invalid position '{target}'"))?;
        return Ok(n
            .checked_sub(1)
            .and_then(|i| rolls.get(i))
            .map(RollRecord::id));
    }

    if let Ok(id) = target.parse::<RollId>() {
        return Ok(Some(id));
    }

    let prefix = target.to_lowercase();
    if prefix.len() < MIN_PREFIX {
        return Err(format!(
            "id prefix '{target}' is too short (need at least {MIN_PREFIX} characters)"
        ));
    }
    let matches: Vec<RollId> = rolls
        .iter()
        .map(RollRecord::id)
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();
    match matches.as_slice() {
        [] => Ok(None),
        [id] => Ok(Some(*id)),
        _ => Err(format!(
            "id prefix '{target}' matches {} rolls; use more characters",
            matches.len()
        )),
    }
}
