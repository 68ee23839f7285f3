//! Describe command - show the schema and missingness of a table.

use std::path::PathBuf;

use colored::Colorize;
use tidyshape::{Tidy, TidyConfig};

use super::CommandResult;

pub fn run(config: TidyConfig, file: PathBuf, json_output: bool) -> CommandResult {
    let tidy = Tidy::with_config(config);
    let table = tidy.load(&file)?;

    if json_output {
        let columns: Vec<_> = table
            .columns()
            .map(|c| {
                serde_json::json!({
                    "name": c.name(),
                    "type": c.data_type(),
                    "missing": c.null_count(),
                })
            })
            .collect();
        let summary = serde_json::json!({
            "file": file.display().to_string(),
            "rows": table.row_count(),
            "columns": columns,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Table".cyan().bold(),
        file.display().to_string().white()
    );
    println!(
        "  {} rows x {} columns",
        table.row_count().to_string().white().bold(),
        table.column_count().to_string().white().bold()
    );
    println!();

    let width = table.column_names().iter().map(|n| n.len()).max().unwrap_or(0);
    println!("{}", "Columns:".yellow().bold());
    for column in table.columns() {
        let missing = column.null_count();
        let missing_text = if missing == 0 {
            "complete".green()
        } else if missing == column.len() {
            format!("{} missing (all)", missing).red()
        } else {
            format!("{} missing", missing).yellow()
        };
        println!(
            "  {:<width$}  {:<11}  {}",
            column.name(),
            column.data_type().to_string().blue(),
            missing_text,
            width = width
        );
    }
    Ok(())
}
