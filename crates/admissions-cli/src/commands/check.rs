//! The `admissions check` command.

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use admissions_store::config::load_config_from;
use admissions_store::create_store;

use super::print_banner;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    println!("Store:  {:?}", config.store);
    println!(
        "Tables: students={}, questions={}, submissions={}, answers={}, time_slots={}",
        config.tables.students,
        config.tables.questions,
        config.tables.submissions,
        config.tables.answers,
        config.tables.time_slots,
    );
    let steps: Vec<String> = config.wizard.plan.steps().iter().map(|s| s.to_string()).collect();
    println!("Plan:   {}", steps.join(" -> "));

    if let Err(e) = config.store.validate() {
        print_banner(&format!("Configuration error: {e}"));
        return Err(e.into());
    }

    let store = create_store(&config)?;
    match store.list_time_slots().await {
        Ok(slots) => {
            println!(
                "{} Store reachable ({} time slot(s) configured)",
                style("✓").green(),
                slots.len()
            );
            Ok(())
        }
        Err(e) => {
            print_banner(&format!("Store unreachable: {e}"));
            Err(e.context("store probe failed"))
        }
    }
}
