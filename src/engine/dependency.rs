//! Dependency expander
//!
//! Resolves each task's raw [`Dependency`] references into positioned
//! records: a forward [`ExpandedDependency`] under the dependent task and a
//! reverse [`ExpandedDependent`] under the source, together with the signed
//! time margin between the two bound edges. A negative margin means the
//! dependent edge precedes the edge it is bound to, which flags the
//! dependent task for a warning.
//!
//! Unresolved source ids and placeholder endpoints are skipped, not fatal.
//! Self-referential and duplicate edges pass through as data; nothing here
//! recurses over the graph.

use std::collections::{HashMap, HashSet};

use chrono::TimeDelta;

use crate::domain::{RelationTarget, TaskOrEmpty};

use super::forest::TaskMapByLevel;

/// A dependency as seen from the task that declares it
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedDependency {
    pub source_id: String,
    /// Bound edge of the source task
    pub source_target: RelationTarget,
    /// Bound edge of the dependent task itself
    pub own_target: RelationTarget,
    /// Own bound date minus source bound date
    pub margin: TimeDelta,
}

/// A dependency as seen from the task that is depended upon
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedDependent {
    pub dependent_id: String,
    /// Bound edge of the dependent task
    pub dependent_target: RelationTarget,
    /// Bound edge of this (source) task
    pub own_target: RelationTarget,
    /// Dependent bound date minus this task's bound date
    pub margin: TimeDelta,
}

/// comparison level -> dependent id -> its expanded dependencies, in stored order
pub type DependencyMap = HashMap<u32, HashMap<String, Vec<ExpandedDependency>>>;

/// comparison level -> source id -> its expanded dependents, in stored order
pub type DependentMap = HashMap<u32, HashMap<String, Vec<ExpandedDependent>>>;

/// comparison level -> dependent id -> source id -> signed margin
pub type DependencyMargins = HashMap<u32, HashMap<String, HashMap<String, TimeDelta>>>;

/// comparison level -> ids of tasks carrying at least one violated margin
pub type DependencyWarningSet = HashMap<u32, HashSet<String>>;

/// All four maps produced by one expansion pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DependencyGraphMaps {
    pub dependencies: DependencyMap,
    pub dependents: DependentMap,
    pub margins: DependencyMargins,
    pub warnings: DependencyWarningSet,
}

/// Expands every resolvable dependency edge, per comparison level
pub fn expand_dependencies(
    tasks: &[TaskOrEmpty],
    task_map: &TaskMapByLevel,
) -> DependencyGraphMaps {
    let mut maps = DependencyGraphMaps::default();

    for row in tasks {
        let Some(own) = row.as_task() else {
            continue;
        };
        if own.dependencies.is_empty() {
            continue;
        }

        let level = own.comparison_level;
        let Some(level_tasks) = task_map.get(&level) else {
            continue;
        };

        for dependency in &own.dependencies {
            let source = level_tasks
                .get(&dependency.source_id)
                .and_then(|&index| tasks[index].as_task());
            let Some(source) = source else {
                continue;
            };

            let own_date = dependency.own_target.date_of(own);
            let source_date = dependency.source_target.date_of(source);
            let margin = own_date - source_date;

            maps.dependencies
                .entry(level)
                .or_default()
                .entry(own.id.clone())
                .or_default()
                .push(ExpandedDependency {
                    source_id: source.id.clone(),
                    source_target: dependency.source_target,
                    own_target: dependency.own_target,
                    margin,
                });

            maps.dependents
                .entry(level)
                .or_default()
                .entry(source.id.clone())
                .or_default()
                .push(ExpandedDependent {
                    dependent_id: own.id.clone(),
                    dependent_target: dependency.own_target,
                    own_target: dependency.source_target,
                    margin,
                });

            maps.margins
                .entry(level)
                .or_default()
                .entry(own.id.clone())
                .or_default()
                .insert(source.id.clone(), margin);

            if margin < TimeDelta::zero() {
                maps.warnings.entry(level).or_default().insert(own.id.clone());
            }
        }
    }

    maps
}
