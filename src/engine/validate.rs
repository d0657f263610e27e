//! Structural diagnostics
//!
//! The engine itself tolerates broken references and cycles by construction:
//! traversals guard and truncate. This pass makes those conditions visible
//! instead — it reports dangling references, duplicate ids, inverted
//! intervals, and parent/dependency cycles as structured findings the host
//! can surface. Purely advisory; no other engine function consults it.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::domain::{TaskOrEmpty, TaskType};

/// A structural problem in the task list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("duplicate task id '{id}' at comparison level {level}")]
    DuplicateId { level: u32, id: String },

    #[error("task '{id}' at level {level} references missing parent '{parent}'")]
    DanglingParent {
        level: u32,
        id: String,
        parent: String,
    },

    #[error("task '{id}' at level {level} depends on missing task '{source_id}'")]
    DanglingDependency {
        level: u32,
        id: String,
        source_id: String,
    },

    #[error("task '{id}' at level {level} depends on itself")]
    SelfDependency { level: u32, id: String },

    #[error("task '{id}' at level {level} ends before it starts")]
    InvertedInterval { level: u32, id: String },

    #[error("milestone '{id}' at level {level} has a non-zero duration")]
    MilestoneWithDuration { level: u32, id: String },

    #[error("parent chain of '{id}' at level {level} forms a cycle")]
    ParentCycle { level: u32, id: String },

    #[error("dependency cycle at level {level}: {}", .ids.join(" -> "))]
    DependencyCycle { level: u32, ids: Vec<String> },
}

/// Scans the task list for structural problems
///
/// Findings are ordered: per-task checks in input order, then parent cycles
/// in input order, then dependency cycles per ascending level.
pub fn validate_tasks(tasks: &[TaskOrEmpty]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let mut ids_by_level: HashMap<u32, HashSet<&str>> = HashMap::new();
    let mut parent_by_level: HashMap<u32, HashMap<&str, Option<&str>>> = HashMap::new();
    for task in tasks {
        let level = task.comparison_level();
        ids_by_level.entry(level).or_default().insert(task.id());
        parent_by_level
            .entry(level)
            .or_default()
            .insert(task.id(), task.parent());
    }

    // per-task checks, input order
    let mut seen_ids: HashMap<u32, HashSet<&str>> = HashMap::new();
    for row in tasks {
        let level = row.comparison_level();
        let id = row.id();
        let level_ids = &ids_by_level[&level];

        if !seen_ids.entry(level).or_default().insert(id) {
            diagnostics.push(Diagnostic::DuplicateId {
                level,
                id: id.to_string(),
            });
        }

        if let Some(parent) = row.parent() {
            if !level_ids.contains(parent) {
                diagnostics.push(Diagnostic::DanglingParent {
                    level,
                    id: id.to_string(),
                    parent: parent.to_string(),
                });
            }
        }

        let Some(task) = row.as_task() else {
            continue;
        };

        if task.task_type == TaskType::Milestone {
            if task.start != task.end {
                diagnostics.push(Diagnostic::MilestoneWithDuration {
                    level,
                    id: id.to_string(),
                });
            }
        } else if task.start > task.end {
            diagnostics.push(Diagnostic::InvertedInterval {
                level,
                id: id.to_string(),
            });
        }

        for dependency in &task.dependencies {
            if dependency.source_id == task.id {
                diagnostics.push(Diagnostic::SelfDependency {
                    level,
                    id: id.to_string(),
                });
            } else if !level_ids.contains(dependency.source_id.as_str()) {
                diagnostics.push(Diagnostic::DanglingDependency {
                    level,
                    id: id.to_string(),
                    source_id: dependency.source_id.clone(),
                });
            }
        }
    }

    // parent cycles, input order
    for row in tasks {
        let level = row.comparison_level();
        let parents = &parent_by_level[&level];
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = row.parent();

        while let Some(parent_id) = current {
            if parent_id == row.id() {
                diagnostics.push(Diagnostic::ParentCycle {
                    level,
                    id: row.id().to_string(),
                });
                break;
            }
            if !visited.insert(parent_id) {
                break;
            }
            current = parents.get(parent_id).copied().flatten();
        }
    }

    // dependency cycles, ascending level
    let levels: BTreeSet<u32> = ids_by_level.keys().copied().collect();
    for level in levels {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

        for row in tasks {
            let Some(task) = row.as_task() else {
                continue;
            };
            if task.comparison_level != level {
                continue;
            }
            nodes
                .entry(task.id.as_str())
                .or_insert_with(|| graph.add_node(task.id.as_str()));
        }

        for row in tasks {
            let Some(task) = row.as_task() else {
                continue;
            };
            if task.comparison_level != level {
                continue;
            }
            let Some(&own) = nodes.get(task.id.as_str()) else {
                continue;
            };
            for dependency in &task.dependencies {
                if dependency.source_id == task.id {
                    continue;
                }
                if let Some(&source) = nodes.get(dependency.source_id.as_str()) {
                    graph.add_edge(source, own, ());
                }
            }
        }

        for component in tarjan_scc(&graph) {
            if component.len() < 2 {
                continue;
            }
            let ids: Vec<String> = component
                .iter()
                .map(|&node| graph[node].to_string())
                .collect();
            diagnostics.push(Diagnostic::DependencyCycle { level, ids });
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, Task};
    use chrono::{DateTime, TimeZone, Utc};

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn task(id: &str, start: u32, end: u32) -> Task {
        Task::new(id, id.to_uppercase(), date(start), date(end))
    }

    #[test]
    fn clean_list_has_no_findings() {
        let a = task("a", 1, 5);
        let mut b = task("b", 6, 8);
        b.dependencies.push(Dependency::finish_to_start("a"));
        b.parent = Some("a".to_string());

        assert!(validate_tasks(&[a.into(), b.into()]).is_empty());
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let diagnostics = validate_tasks(&[task("a", 1, 2).into(), task("a", 3, 4).into()]);
        assert!(diagnostics.contains(&Diagnostic::DuplicateId {
            level: 1,
            id: "a".to_string()
        }));
    }

    #[test]
    fn same_id_on_other_level_is_fine() {
        let first = task("a", 1, 2);
        let mut second = task("a", 1, 2);
        second.comparison_level = 2;

        assert!(validate_tasks(&[first.into(), second.into()]).is_empty());
    }

    #[test]
    fn dangling_references_are_reported() {
        let mut orphan = task("a", 1, 2);
        orphan.parent = Some("ghost".to_string());
        orphan.dependencies.push(Dependency::finish_to_start("gone"));

        let diagnostics = validate_tasks(&[orphan.into()]);
        assert!(diagnostics.contains(&Diagnostic::DanglingParent {
            level: 1,
            id: "a".to_string(),
            parent: "ghost".to_string()
        }));
        assert!(diagnostics.contains(&Diagnostic::DanglingDependency {
            level: 1,
            id: "a".to_string(),
            source_id: "gone".to_string()
        }));
    }

    #[test]
    fn inverted_interval_and_long_milestone_are_reported() {
        let backwards = task("a", 5, 1);
        let mut stretched = Task::milestone("m", "M", date(3));
        stretched.end = date(4);

        let diagnostics = validate_tasks(&[backwards.into(), stretched.into()]);
        assert!(diagnostics.contains(&Diagnostic::InvertedInterval {
            level: 1,
            id: "a".to_string()
        }));
        assert!(diagnostics.contains(&Diagnostic::MilestoneWithDuration {
            level: 1,
            id: "m".to_string()
        }));
    }

    #[test]
    fn self_dependency_is_reported_once_not_as_cycle() {
        let mut looped = task("a", 1, 2);
        looped.dependencies.push(Dependency::finish_to_start("a"));

        let diagnostics = validate_tasks(&[looped.into()]);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::SelfDependency {
                level: 1,
                id: "a".to_string()
            }]
        );
    }

    #[test]
    fn parent_cycles_are_reported_for_each_member() {
        let mut a = task("a", 1, 2);
        a.parent = Some("b".to_string());
        let mut b = task("b", 1, 2);
        b.parent = Some("a".to_string());

        let diagnostics = validate_tasks(&[a.into(), b.into()]);
        let cycles: Vec<_> = diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::ParentCycle { .. }))
            .collect();
        assert_eq!(cycles.len(), 2);
    }

    #[test]
    fn dependency_cycles_name_their_members() {
        let mut a = task("a", 1, 2);
        a.dependencies.push(Dependency::finish_to_start("b"));
        let mut b = task("b", 3, 4);
        b.dependencies.push(Dependency::finish_to_start("a"));

        let diagnostics = validate_tasks(&[a.into(), b.into()]);
        let cycle = diagnostics
            .iter()
            .find_map(|d| match d {
                Diagnostic::DependencyCycle { level, ids } => Some((level, ids)),
                _ => None,
            })
            .unwrap();

        assert_eq!(*cycle.0, 1);
        let mut ids = cycle.1.clone();
        ids.sort();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn diagnostics_render_as_messages() {
        let diagnostic = Diagnostic::DependencyCycle {
            level: 1,
            ids: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            diagnostic.to_string(),
            "dependency cycle at level 1: a -> b"
        );
    }
}
