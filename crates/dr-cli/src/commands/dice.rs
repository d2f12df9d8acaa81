use comfy_table::{ContentArrangement, Table};
use dr_core::DieType;

pub fn run() -> Result<(), String> {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Die", "Faces", "Description"]);
    for die in DieType::ALL {
        table.add_row(vec![
            die.name(),
            die.sides().to_string(),
            die.description(),
        ]);
    }
    println!("{table}");
    Ok(())
}
