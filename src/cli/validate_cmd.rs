//! `validate` - report structural problems in a task list

use anyhow::Result;
use serde_json::json;

use crate::domain::TaskOrEmpty;
use crate::engine::validate_tasks;

use super::output::Output;

/// Prints diagnostics and returns how many were found
pub fn run(output: &Output, tasks: &[TaskOrEmpty]) -> Result<usize> {
    let diagnostics = validate_tasks(tasks);

    if output.is_json() {
        let messages: Vec<String> = diagnostics.iter().map(|d| d.to_string()).collect();
        output.data(&json!({
            "count": diagnostics.len(),
            "diagnostics": messages,
        }));
        return Ok(diagnostics.len());
    }

    if diagnostics.is_empty() {
        output.success("No problems found.");
    } else {
        for diagnostic in &diagnostics {
            println!("{}", diagnostic);
        }
        println!(
            "Found {} problem{}.",
            diagnostics.len(),
            if diagnostics.len() == 1 { "" } else { "s" }
        );
    }

    Ok(diagnostics.len())
}
