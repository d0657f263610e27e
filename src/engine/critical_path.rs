//! Critical path engine
//!
//! Finds, per comparison level, the longest accumulated chain through the
//! dependency graph. A task contributes its own duration; an edge contributes
//! the signed distance between its two bound edges (the expanded margin). The
//! critical path is the set of tasks attaining the global maximum chain
//! length, together with every predecessor edge that realizes that maximum —
//! ties are all included, never broken arbitrarily.
//!
//! Cycles are tolerated: traversal carries a three-state visitation marker
//! and a re-entered in-progress node contributes no further length.

use std::collections::{HashMap, HashSet};

use chrono::TimeDelta;

use crate::domain::TaskOrEmpty;

use super::dependency::{DependencyMap, ExpandedDependency};
use super::forest::TaskMapByLevel;

/// The critical path of one comparison level
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CriticalPath {
    /// Ids of tasks on the path
    pub tasks: HashSet<String>,
    /// task id -> source ids of its critical predecessor edges
    pub dependencies: HashMap<String, HashSet<String>>,
}

/// comparison level -> critical path
pub type CriticalPaths = HashMap<u32, CriticalPath>;

enum Visit {
    InProgress,
    Done,
}

/// Computes the critical path for every comparison level with scheduled tasks
pub fn compute_critical_paths(
    tasks: &[TaskOrEmpty],
    task_map: &TaskMapByLevel,
    dependencies: &DependencyMap,
) -> CriticalPaths {
    let mut result = CriticalPaths::new();

    for (&level, level_tasks) in task_map {
        let level_deps = dependencies.get(&level);

        let mut state: HashMap<String, Visit> = HashMap::new();
        let mut lengths: HashMap<String, TimeDelta> = HashMap::new();

        for id in level_tasks.keys() {
            longest_chain(id, tasks, level_tasks, level_deps, &mut state, &mut lengths);
        }

        let Some(&max_length) = lengths.values().max() else {
            continue;
        };

        let mut path = CriticalPath::default();
        let mut worklist: Vec<String> = lengths
            .iter()
            .filter(|(_, &length)| length == max_length)
            .map(|(id, _)| id.clone())
            .collect();

        while let Some(id) = worklist.pop() {
            if !path.tasks.insert(id.clone()) {
                continue;
            }

            let Some(task) = level_tasks.get(&id).and_then(|&i| tasks[i].as_task()) else {
                continue;
            };
            let incoming = lengths[&id] - task.duration();

            let Some(deps) = level_deps.and_then(|map| map.get(&id)) else {
                continue;
            };
            for dep in deps {
                let Some(&source_length) = lengths.get(&dep.source_id) else {
                    continue;
                };
                if source_length + dep.margin == incoming {
                    path.dependencies
                        .entry(id.clone())
                        .or_default()
                        .insert(dep.source_id.clone());
                    worklist.push(dep.source_id.clone());
                }
            }
        }

        result.insert(level, path);
    }

    result
}

fn longest_chain(
    id: &str,
    tasks: &[TaskOrEmpty],
    level_tasks: &HashMap<String, usize>,
    level_deps: Option<&HashMap<String, Vec<ExpandedDependency>>>,
    state: &mut HashMap<String, Visit>,
    lengths: &mut HashMap<String, TimeDelta>,
) -> Option<TimeDelta> {
    match state.get(id) {
        Some(Visit::InProgress) => return None,
        Some(Visit::Done) => return lengths.get(id).copied(),
        None => {}
    }

    let task = level_tasks.get(id).and_then(|&i| tasks[i].as_task())?;
    state.insert(id.to_string(), Visit::InProgress);

    let mut incoming: Option<TimeDelta> = None;
    if let Some(deps) = level_deps.and_then(|map| map.get(id)) {
        for dep in deps {
            let source_length = longest_chain(
                &dep.source_id,
                tasks,
                level_tasks,
                level_deps,
                state,
                lengths,
            );
            if let Some(source_length) = source_length {
                let candidate = source_length + dep.margin;
                incoming = Some(match incoming {
                    Some(best) if best >= candidate => best,
                    _ => candidate,
                });
            }
        }
    }

    let length = task.duration() + incoming.unwrap_or_else(TimeDelta::zero);
    state.insert(id.to_string(), Visit::Done);
    lengths.insert(id.to_string(), length);

    Some(length)
}
