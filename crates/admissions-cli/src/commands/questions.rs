//! The `admissions questions` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use admissions_core::model::QuestionKind;
use admissions_core::order::interleave_questions;

use super::open_store;

pub async fn execute(config_path: Option<PathBuf>, demo: bool) -> Result<()> {
    let (_config, store) = open_store(config_path.as_deref(), demo)?;
    let questions = interleave_questions(store.list_active_questions().await?);

    if questions.is_empty() {
        println!("No active questions found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "No.", "Type", "Question", "Options"]);
    for (position, question) in questions.iter().enumerate() {
        let (kind, options) = match &question.kind {
            QuestionKind::Mcq { options } => ("mcq", options.join(" / ")),
            QuestionKind::Text => ("text", "min. 50 characters".to_string()),
        };
        table.add_row(vec![
            Cell::new(position + 1),
            Cell::new(question.question_number),
            Cell::new(kind),
            Cell::new(&question.text),
            Cell::new(options),
        ]);
    }

    println!("{table}");
    println!("{} question(s) from {}", questions.len(), store.name());
    Ok(())
}
