use std::path::Path;

use chrono::Local;
use comfy_table::{ContentArrangement, Table};
use dr_history::HistoryStore;

use super::{format_values, open_history};

pub fn run(history: &Path, limit: Option<usize>) -> Result<(), String> {
    let store = open_history(history)?;
    let rolls = store.list_all().map_err(|e| e.to_string())?;

    if rolls.is_empty() {
        println!("  No rolls yet.");
        return Ok(());
    }

    let shown = limit.unwrap_or(rolls.len()).min(rolls.len());

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "When", "Dice", "Results", "Total", "ID"]);

    for (i, roll) in rolls.iter().take(shown).enumerate() {
        let when = roll
            .timestamp()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        table.add_row(vec![
            format!("#{}", i + 1),
            when,
            roll.notation(),
            format_values(roll.results()),
            roll.total().to_string(),
            roll.id().short(),
        ]);
    }

    println!("{table}");
    println!();
    if shown < rolls.len() {
        println!("  {shown} of {} rolls", rolls.len());
    } else {
        println!("  {} rolls", rolls.len());
    }

    Ok(())
}
