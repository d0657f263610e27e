//! Nesting indexer
//!
//! Walks each level's forest depth-first and assigns every reachable task a
//! depth and a dotted display index built from 1-based sibling positions
//! (the second child of the first root is `1.2`). Used for row numbering and
//! ordering only; tasks under a dangling parent are unreachable and get no
//! index.

use std::collections::{HashMap, HashSet};

use crate::domain::TaskOrEmpty;

use super::forest::{ChildMapByLevel, RootMapByLevel};

/// comparison level -> task id -> (depth, dotted index like `1.2.1`)
pub type NestedIndexByLevel = HashMap<u32, HashMap<String, (usize, String)>>;

/// Assigns depths and dotted indexes per comparison level
pub fn build_nested_index(
    tasks: &[TaskOrEmpty],
    children: &ChildMapByLevel,
    roots: &RootMapByLevel,
) -> NestedIndexByLevel {
    let mut result: NestedIndexByLevel = HashMap::new();
    let empty_children = HashMap::new();

    for (&level, root_indexes) in roots {
        let level_children = children.get(&level).unwrap_or(&empty_children);
        let mut level_index: HashMap<String, (usize, String)> = HashMap::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (position, &root_index) in root_indexes.iter().enumerate() {
            index_subtree(
                tasks,
                level_children,
                root_index,
                0,
                &(position + 1).to_string(),
                &mut level_index,
                &mut seen,
            );
        }

        result.insert(level, level_index);
    }

    result
}

fn index_subtree(
    tasks: &[TaskOrEmpty],
    level_children: &HashMap<String, Vec<usize>>,
    task_index: usize,
    depth: usize,
    dotted: &str,
    level_index: &mut HashMap<String, (usize, String)>,
    seen: &mut HashSet<String>,
) {
    let id = tasks[task_index].id();
    if !seen.insert(id.to_string()) {
        return;
    }

    level_index.insert(id.to_string(), (depth, dotted.to_string()));

    if let Some(child_indexes) = level_children.get(id) {
        for (position, &child_index) in child_indexes.iter().enumerate() {
            let child_dotted = format!("{}.{}", dotted, position + 1);
            index_subtree(
                tasks,
                level_children,
                child_index,
                depth + 1,
                &child_dotted,
                level_index,
                seen,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;
    use crate::engine::forest::build_forest;
    use chrono::{DateTime, TimeZone, Utc};

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn task(id: &str, parent: Option<&str>) -> TaskOrEmpty {
        let mut t = Task::new(id, id.to_uppercase(), date(1), date(2));
        t.parent = parent.map(str::to_string);
        t.into()
    }

    fn indexes_for(tasks: &[TaskOrEmpty]) -> HashMap<String, (usize, String)> {
        let (children, roots) = build_forest(tasks);
        build_nested_index(tasks, &children, &roots)
            .remove(&1)
            .unwrap_or_default()
    }

    #[test]
    fn roots_are_numbered_in_order() {
        let tasks = vec![task("a", None), task("b", None), task("c", None)];
        let index = indexes_for(&tasks);

        assert_eq!(index.get("a"), Some(&(0, "1".to_string())));
        assert_eq!(index.get("b"), Some(&(0, "2".to_string())));
        assert_eq!(index.get("c"), Some(&(0, "3".to_string())));
    }

    #[test]
    fn nested_tasks_get_dotted_indexes() {
        let tasks = vec![
            task("p", None),
            task("a", Some("p")),
            task("b", Some("p")),
            task("b1", Some("b")),
        ];
        let index = indexes_for(&tasks);

        assert_eq!(index.get("a"), Some(&(1, "1.1".to_string())));
        assert_eq!(index.get("b"), Some(&(1, "1.2".to_string())));
        assert_eq!(index.get("b1"), Some(&(2, "1.2.1".to_string())));
    }

    #[test]
    fn depth_matches_segment_count() {
        let tasks = vec![
            task("p", None),
            task("a", Some("p")),
            task("a1", Some("a")),
        ];
        let index = indexes_for(&tasks);

        for (depth, dotted) in index.values() {
            assert_eq!(*depth, dotted.split('.').count() - 1);
        }
    }

    #[test]
    fn dotted_indexes_are_unique_within_a_level() {
        let tasks = vec![
            task("p", None),
            task("a", Some("p")),
            task("b", Some("p")),
            task("q", None),
            task("c", Some("q")),
        ];
        let index = indexes_for(&tasks);

        let mut dotted: Vec<&String> = index.values().map(|(_, s)| s).collect();
        dotted.sort();
        dotted.dedup();
        assert_eq!(dotted.len(), tasks.len());
    }

    #[test]
    fn unreachable_tasks_are_not_indexed() {
        let tasks = vec![task("a", None), task("orphan", Some("missing"))];
        let index = indexes_for(&tasks);

        assert!(index.contains_key("a"));
        assert!(!index.contains_key("orphan"));
    }
}
