//! `critical-path` - print the longest dependency chain per level

use anyhow::Result;
use serde_json::json;

use crate::engine::Schedule;

use super::output::Output;

pub fn run(output: &Output, schedule: &Schedule, level_filter: Option<u32>) -> Result<()> {
    let mut levels: Vec<u32> = schedule
        .critical_paths
        .keys()
        .copied()
        .filter(|&level| level_filter.map_or(true, |wanted| wanted == level))
        .collect();
    levels.sort_unstable();

    if output.is_json() {
        let rendered: Vec<_> = levels
            .iter()
            .map(|level| {
                let path = &schedule.critical_paths[level];

                let mut tasks: Vec<&String> = path.tasks.iter().collect();
                tasks.sort();

                let mut edges = serde_json::Map::new();
                let mut ids: Vec<&String> = path.dependencies.keys().collect();
                ids.sort();
                for id in ids {
                    let mut sources: Vec<&String> = path.dependencies[id].iter().collect();
                    sources.sort();
                    edges.insert(id.clone(), json!(sources));
                }

                json!({ "level": level, "tasks": tasks, "dependencies": edges })
            })
            .collect();
        output.data(&rendered);
        return Ok(());
    }

    for (position, level) in levels.iter().enumerate() {
        if position > 0 {
            output.blank();
        }
        let path = &schedule.critical_paths[level];

        let mut tasks: Vec<&String> = path.tasks.iter().collect();
        tasks.sort();

        println!("Level {} critical path ({} tasks):", level, tasks.len());
        for id in tasks {
            match path.dependencies.get(id) {
                Some(sources) => {
                    let mut sources: Vec<&String> = sources.iter().collect();
                    sources.sort();
                    let joined: Vec<&str> = sources.iter().map(|s| s.as_str()).collect();
                    println!("{:<16} after {}", id, joined.join(", "));
                }
                None => println!("{}", id),
            }
        }
    }

    Ok(())
}
