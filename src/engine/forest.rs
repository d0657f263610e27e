//! Forest indexer
//!
//! Groups the caller's task list into per-comparison-level forests: a map
//! from parent id to its ordered children and a list of root tasks. Tasks are
//! addressed by their offset in the input slice, so no task data is copied;
//! every other engine component is derived from these maps.

use std::collections::{HashMap, HashSet};

use crate::domain::TaskOrEmpty;

/// comparison level -> parent id -> offsets of its children, in input order
pub type ChildMapByLevel = HashMap<u32, HashMap<String, Vec<usize>>>;

/// comparison level -> offsets of tasks without a parent, in input order
pub type RootMapByLevel = HashMap<u32, Vec<usize>>;

/// comparison level -> task id -> offset in the caller's task array
///
/// Doubles as the global index map: an id resolves to the position the host
/// uses in its own list.
pub type TaskMapByLevel = HashMap<u32, HashMap<String, usize>>;

/// Builds the per-level child and root maps
///
/// Input order is preserved as child order within each parent and within the
/// root lists. A parent reference is not checked for existence: a dangling
/// parent simply produces a child entry under an absent id, which consumers
/// resolve defensively.
pub fn build_forest(tasks: &[TaskOrEmpty]) -> (ChildMapByLevel, RootMapByLevel) {
    let mut children: ChildMapByLevel = HashMap::new();
    let mut roots: RootMapByLevel = HashMap::new();

    for (index, task) in tasks.iter().enumerate() {
        let level = task.comparison_level();

        match task.parent() {
            Some(parent) => {
                children
                    .entry(level)
                    .or_default()
                    .entry(parent.to_string())
                    .or_default()
                    .push(index);
            }
            None => {
                roots.entry(level).or_default().push(index);
            }
        }
    }

    (children, roots)
}

/// Builds the per-level id -> offset map
///
/// On duplicate ids within a level the last occurrence wins; duplicates are
/// reported by `validate_tasks`, not here.
pub fn build_task_map(tasks: &[TaskOrEmpty]) -> TaskMapByLevel {
    let mut map: TaskMapByLevel = HashMap::new();

    for (index, task) in tasks.iter().enumerate() {
        map.entry(task.comparison_level())
            .or_default()
            .insert(task.id().to_string(), index);
    }

    map
}

/// Returns the offsets of a task's transitive descendants in forest order
pub fn descendants_of(
    tasks: &[TaskOrEmpty],
    children: &ChildMapByLevel,
    level: u32,
    id: &str,
) -> Vec<usize> {
    let mut result = Vec::new();

    let Some(level_children) = children.get(&level) else {
        return result;
    };

    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(id.to_string());
    collect_descendants(tasks, level_children, id, &mut seen, &mut result);

    result
}

fn collect_descendants(
    tasks: &[TaskOrEmpty],
    level_children: &HashMap<String, Vec<usize>>,
    id: &str,
    seen: &mut HashSet<String>,
    result: &mut Vec<usize>,
) {
    let Some(child_indexes) = level_children.get(id) else {
        return;
    };

    for &child_index in child_indexes {
        let child_id = tasks[child_index].id();
        if !seen.insert(child_id.to_string()) {
            continue;
        }
        result.push(child_index);
        collect_descendants(tasks, level_children, child_id, seen, result);
    }
}

/// Returns true if either task is an ancestor of the other
pub fn is_one_descendant(
    tasks: &[TaskOrEmpty],
    children: &ChildMapByLevel,
    level: u32,
    first_id: &str,
    second_id: &str,
) -> bool {
    let is_under = |ancestor: &str, descendant: &str| {
        descendants_of(tasks, children, level, ancestor)
            .iter()
            .any(|&index| tasks[index].id() == descendant)
    };

    is_under(first_id, second_id) || is_under(second_id, first_id)
}
