//! `suggest` - run the change-suggestion engine for one proposed move

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{apply_suggestions, TaskOrEmpty};
use crate::engine::Schedule;

use super::output::Output;

#[allow(clippy::too_many_arguments)]
pub fn run(
    output: &Output,
    schedule: &Schedule,
    task_id: &str,
    level: u32,
    new_start: DateTime<Utc>,
    new_end: DateTime<Utc>,
    apply: bool,
) -> Result<()> {
    let metadata = schedule.suggest(task_id, level, new_start, new_end)?;

    let changed = match schedule.task(level, task_id) {
        Some(TaskOrEmpty::Task(task)) => {
            let mut changed = task.clone();
            changed.start = new_start;
            changed.end = new_end;
            TaskOrEmpty::Task(changed)
        }
        _ => bail!("task '{}' disappeared from the schedule", task_id),
    };

    if output.is_json() {
        let suggestions: Vec<_> = metadata
            .suggestions
            .iter()
            .map(|suggestion| {
                json!({
                    "id": suggestion.task.id,
                    "index": suggestion.index,
                    "start": suggestion.start,
                    "end": suggestion.end,
                })
            })
            .collect();
        let parents: Vec<&str> = metadata.parents.iter().map(|p| p.id.as_str()).collect();
        let dependents: Vec<&str> = metadata
            .dependent_tasks
            .iter()
            .map(|t| t.id.as_str())
            .collect();

        let mut payload = json!({
            "task": task_id,
            "index": metadata.index,
            "parents": parents,
            "dependent_tasks": dependents,
            "suggestions": suggestions,
        });
        if apply {
            let next = apply_suggestions(
                &schedule.tasks,
                &changed,
                metadata.index,
                &metadata.suggestions,
            );
            payload["tasks"] = json!(next);
        }
        output.data(&payload);
        return Ok(());
    }

    println!(
        "Moving '{}' to {}..{}",
        task_id,
        new_start.format("%Y-%m-%d"),
        new_end.format("%Y-%m-%d")
    );

    if metadata.suggestions.is_empty() {
        println!("No other task needs to move.");
    } else {
        println!("Suggestions ({}):", metadata.suggestions.len());
        for suggestion in &metadata.suggestions {
            println!(
                "{:<16} {}..{}",
                suggestion.task.id,
                suggestion.start.format("%Y-%m-%d"),
                suggestion.end.format("%Y-%m-%d")
            );
        }
    }

    if !metadata.parents.is_empty() {
        let chain: Vec<&str> = metadata.parents.iter().map(|p| p.id.as_str()).collect();
        println!("Parent chain: {}", chain.join(" -> "));
    }
    if !metadata.dependent_tasks.is_empty() {
        let dependents: Vec<&str> = metadata
            .dependent_tasks
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        println!("Dependent tasks: {}", dependents.join(", "));
    }

    if apply {
        let next = apply_suggestions(
            &schedule.tasks,
            &changed,
            metadata.index,
            &metadata.suggestions,
        );
        output.blank();
        output.data(&next);
    }

    Ok(())
}
