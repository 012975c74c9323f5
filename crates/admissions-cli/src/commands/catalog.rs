//! The `admissions catalog` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use admissions_store::config::load_config_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let catalog = load_config_from(config_path.as_deref())?.catalog();

    let mut table = Table::new();
    table.set_header(vec!["Program", "Type", "Course", "Available"]);

    for program in catalog.programs() {
        let open = if program.available { "yes" } else { "coming soon" };
        if program.courses.is_empty() {
            table.add_row(vec![
                Cell::new(&program.title),
                Cell::new(program.kind),
                Cell::new("-"),
                Cell::new(open),
            ]);
        }
        for course in &program.courses {
            let available = if program.available && course.available {
                "yes"
            } else {
                "coming soon"
            };
            table.add_row(vec![
                Cell::new(&program.title),
                Cell::new(program.kind),
                Cell::new(&course.title),
                Cell::new(available),
            ]);
        }
    }

    println!("{table}");
    Ok(())
}
