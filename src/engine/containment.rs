//! Containment checker
//!
//! A project or task is expected to cover its children's intervals. This pass
//! compares every parent against its direct children and records, keyed by
//! the parent's id, the child dates that fall outside — the renderer draws
//! its warning glyph next to the parent and uses the reported date for the
//! fix affordance.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::TaskOrEmpty;

use super::forest::{ChildMapByLevel, TaskMapByLevel};

/// One out-of-bounds edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOutOfParentWarning {
    pub is_outside: bool,
    /// The offending child date (earliest start or latest end)
    pub date: DateTime<Utc>,
}

/// Warnings for one parent, per edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskOutOfParentWarnings {
    pub start: Option<TaskOutOfParentWarning>,
    pub end: Option<TaskOutOfParentWarning>,
}

/// comparison level -> parent id -> containment warnings
pub type ChildOutOfParentWarnings = HashMap<u32, HashMap<String, TaskOutOfParentWarnings>>;

/// Flags parents whose interval does not cover all of their children
pub fn check_child_out_of_parent(
    tasks: &[TaskOrEmpty],
    task_map: &TaskMapByLevel,
    children: &ChildMapByLevel,
) -> ChildOutOfParentWarnings {
    let mut result = ChildOutOfParentWarnings::new();

    for (&level, level_children) in children {
        let Some(level_tasks) = task_map.get(&level) else {
            continue;
        };

        for (parent_id, child_indexes) in level_children {
            let parent = level_tasks
                .get(parent_id)
                .and_then(|&index| tasks[index].as_task());
            let Some(parent) = parent else {
                continue;
            };

            let mut earliest_start: Option<DateTime<Utc>> = None;
            let mut latest_end: Option<DateTime<Utc>> = None;

            for &child_index in child_indexes {
                let Some(child) = tasks[child_index].as_task() else {
                    continue;
                };
                if earliest_start.map_or(true, |start| child.start < start) {
                    earliest_start = Some(child.start);
                }
                if latest_end.map_or(true, |end| child.end > end) {
                    latest_end = Some(child.end);
                }
            }

            let mut warnings = TaskOutOfParentWarnings::default();

            if let Some(start) = earliest_start {
                if start < parent.start {
                    warnings.start = Some(TaskOutOfParentWarning {
                        is_outside: true,
                        date: start,
                    });
                }
            }
            if let Some(end) = latest_end {
                if end > parent.end {
                    warnings.end = Some(TaskOutOfParentWarning {
                        is_outside: true,
                        date: end,
                    });
                }
            }

            if warnings.start.is_some() || warnings.end.is_some() {
                result
                    .entry(level)
                    .or_default()
                    .insert(parent_id.clone(), warnings);
            }
        }
    }

    result
}
