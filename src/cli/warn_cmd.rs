//! `warnings` - print containment and dependency warnings

use chrono::TimeDelta;

use anyhow::Result;
use serde_json::json;

use crate::engine::Schedule;

use super::output::Output;

pub fn run(output: &Output, schedule: &Schedule, level_filter: Option<u32>) -> Result<()> {
    let levels: Vec<u32> = schedule
        .levels()
        .into_iter()
        .filter(|&level| level_filter.map_or(true, |wanted| wanted == level))
        .collect();

    if output.is_json() {
        let rendered: Vec<_> = levels
            .iter()
            .map(|level| {
                json!({
                    "level": level,
                    "containment": containment_rows(schedule, *level),
                    "dependencies": dependency_rows(schedule, *level),
                })
            })
            .collect();
        output.data(&rendered);
        return Ok(());
    }

    let mut clean = true;
    for &level in &levels {
        let containment = containment_rows(schedule, level);
        let dependencies = dependency_rows(schedule, level);
        if containment.is_empty() && dependencies.is_empty() {
            continue;
        }
        clean = false;

        println!("Level {}:", level);

        if !containment.is_empty() {
            println!("Containment warnings ({}):", containment.len());
            println!("{:<16} {:<6} DATE", "PARENT", "EDGE");
            for row in &containment {
                println!(
                    "{:<16} {:<6} {}",
                    row["parent"].as_str().unwrap_or_default(),
                    row["edge"].as_str().unwrap_or_default(),
                    row["date"].as_str().unwrap_or_default()
                );
            }
        }

        if !dependencies.is_empty() {
            println!("Dependency warnings ({}):", dependencies.len());
            println!("{:<16} {:<16} MARGIN", "TASK", "SOURCE");
            for row in &dependencies {
                println!(
                    "{:<16} {:<16} {}h",
                    row["task"].as_str().unwrap_or_default(),
                    row["source"].as_str().unwrap_or_default(),
                    row["margin_hours"].as_i64().unwrap_or_default()
                );
            }
        }
        output.blank();
    }

    if clean {
        println!("No warnings.");
    }

    Ok(())
}

fn containment_rows(schedule: &Schedule, level: u32) -> Vec<serde_json::Value> {
    let mut rows = Vec::new();
    let Some(warnings) = schedule.containment_warnings.get(&level) else {
        return rows;
    };

    let mut parents: Vec<&String> = warnings.keys().collect();
    parents.sort();

    for parent in parents {
        let warning = &warnings[parent];
        if let Some(start) = warning.start {
            rows.push(json!({
                "parent": parent,
                "edge": "start",
                "date": start.date.format("%Y-%m-%d").to_string(),
            }));
        }
        if let Some(end) = warning.end {
            rows.push(json!({
                "parent": parent,
                "edge": "end",
                "date": end.date.format("%Y-%m-%d").to_string(),
            }));
        }
    }

    rows
}

fn dependency_rows(schedule: &Schedule, level: u32) -> Vec<serde_json::Value> {
    let mut rows = Vec::new();
    let Some(flagged) = schedule.dependency_maps.warnings.get(&level) else {
        return rows;
    };
    let Some(margins) = schedule.dependency_maps.margins.get(&level) else {
        return rows;
    };

    let mut tasks: Vec<&String> = flagged.iter().collect();
    tasks.sort();

    for task in tasks {
        let Some(task_margins) = margins.get(task) else {
            continue;
        };
        let mut sources: Vec<&String> = task_margins.keys().collect();
        sources.sort();

        for source in sources {
            let margin = task_margins[source];
            if margin < TimeDelta::zero() {
                rows.push(json!({
                    "task": task,
                    "source": source,
                    "margin_hours": margin.num_hours(),
                    "margin_ms": margin.num_milliseconds(),
                }));
            }
        }
    }

    rows
}
