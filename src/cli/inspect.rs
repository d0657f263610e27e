//! `inspect` - print the task forest with nesting indexes

use std::collections::{HashMap, HashSet};

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
        let mut rendered = Vec::new();
        for &level in &levels {
            let empty = HashMap::new();
            let nested = schedule.nested_index.get(&level).unwrap_or(&empty);

            let rows: Vec<_> = display_order(schedule, level)
                .into_iter()
                .map(|index| {
                    let row = &schedule.tasks[index];
                    let (depth, dotted) = nested
                        .get(row.id())
                        .cloned()
                        .unwrap_or((0, String::new()));
                    let mut value = json!({
                        "id": row.id(),
                        "name": row.name(),
                        "depth": depth,
                        "index": dotted,
                        "parent": row.parent(),
                    });
                    if let Some(task) = row.as_task() {
                        value["start"] = json!(task.start);
                        value["end"] = json!(task.end);
                    }
                    value
                })
                .collect();

            rendered.push(json!({ "level": level, "tasks": rows }));
        }
        output.data(&rendered);
        return Ok(());
    }

    for (position, &level) in levels.iter().enumerate() {
        if position > 0 {
            output.blank();
        }
        println!("Level {}:", level);
        println!("{:<10} {:<16} {:<24} INTERVAL", "INDEX", "ID", "NAME");
        println!("{}", "-".repeat(72));

        let empty = HashMap::new();
        let nested = schedule.nested_index.get(&level).unwrap_or(&empty);

        for index in display_order(schedule, level) {
            let row = &schedule.tasks[index];
            let dotted = nested
                .get(row.id())
                .map(|(_, dotted)| dotted.clone())
                .unwrap_or_default();
            let interval = match row.as_task() {
                Some(task) => format!(
                    "{}..{}",
                    task.start.format("%Y-%m-%d"),
                    task.end.format("%Y-%m-%d")
                ),
                None => "-".to_string(),
            };
            println!("{:<10} {:<16} {:<24} {}", dotted, row.id(), row.name(), interval);
        }
    }

    Ok(())
}

/// Depth-first display order of one level's forest
fn display_order(schedule: &Schedule, level: u32) -> Vec<usize> {
    let mut order = Vec::new();
    let Some(roots) = schedule.roots.get(&level) else {
        return order;
    };
    let empty = HashMap::new();
    let children = schedule.children.get(&level).unwrap_or(&empty);
    let mut seen: HashSet<&str> = HashSet::new();

    for &root in roots {
        push_subtree(schedule, children, root, &mut seen, &mut order);
    }

    order
}

fn push_subtree<'a>(
    schedule: &'a Schedule,
    children: &HashMap<String, Vec<usize>>,
    index: usize,
    seen: &mut HashSet<&'a str>,
    order: &mut Vec<usize>,
) {
    let id = schedule.tasks[index].id();
    if !seen.insert(id) {
        return;
    }
    order.push(index);

    if let Some(child_indexes) = children.get(id) {
        for &child in child_indexes {
            push_subtree(schedule, children, child, seen, order);
        }
    }
}
