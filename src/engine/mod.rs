//! # Scheduling Engine
//!
//! Pure derivations over a caller-supplied task list. Each sub-module is one
//! stage of the pipeline; [`Schedule::build`] runs them in dependency order:
//!
//! | Stage | Produces |
//! |-------|----------|
//! | `forest` | children map, root list, id -> offset map per level |
//! | `nesting` | depth + dotted display index per task |
//! | `dependency` | expanded dependency/dependent records, margins, warnings |
//! | `critical_path` | longest-chain task and edge sets per level |
//! | `containment` | child-out-of-parent warnings |
//! | `suggestion` | date-change suggestions for a proposed move/resize |
//! | `validate` | advisory structural diagnostics |
//!
//! Every stage takes immutable inputs and returns freshly built maps, so
//! calls are re-entrant and a stale result can simply be dropped. Tasks are
//! addressed by their offset in the input slice throughout.

mod containment;
mod critical_path;
mod dependency;
mod forest;
mod nesting;
mod suggestion;
mod validate;

pub use containment::{
    check_child_out_of_parent, ChildOutOfParentWarnings, TaskOutOfParentWarning,
    TaskOutOfParentWarnings,
};
pub use critical_path::{compute_critical_paths, CriticalPath, CriticalPaths};
pub use dependency::{
    expand_dependencies, DependencyGraphMaps, DependencyMap, DependencyMargins,
    DependencyWarningSet, DependentMap, ExpandedDependency, ExpandedDependent,
};
pub use forest::{
    build_forest, build_task_map, descendants_of, is_one_descendant, ChildMapByLevel,
    RootMapByLevel, TaskMapByLevel,
};
pub use nesting::{build_nested_index, NestedIndexByLevel};
pub use suggestion::{change_metadata, suggest_date_change, SuggestError};
pub use validate::{validate_tasks, Diagnostic};

use chrono::{DateTime, Utc};

use crate::domain::{ChangeAction, ChangeMetadata, TaskOrEmpty};

/// Every derived structure for one task-list snapshot
///
/// Building a `Schedule` is the whole engine pass; the fields are the maps
/// the rendering layer consumes. The snapshot owns its input copy, so a
/// `Schedule` stays coherent even if the host list moves on.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub tasks: Vec<TaskOrEmpty>,
    pub task_map: TaskMapByLevel,
    pub children: ChildMapByLevel,
    pub roots: RootMapByLevel,
    pub nested_index: NestedIndexByLevel,
    pub dependency_maps: DependencyGraphMaps,
    pub critical_paths: CriticalPaths,
    pub containment_warnings: ChildOutOfParentWarnings,
}

impl Schedule {
    /// Runs the full pipeline over a task-list snapshot
    pub fn build(tasks: Vec<TaskOrEmpty>) -> Self {
        let (children, roots) = build_forest(&tasks);
        let task_map = build_task_map(&tasks);
        let nested_index = build_nested_index(&tasks, &children, &roots);
        let dependency_maps = expand_dependencies(&tasks, &task_map);
        let critical_paths =
            compute_critical_paths(&tasks, &task_map, &dependency_maps.dependencies);
        let containment_warnings = check_child_out_of_parent(&tasks, &task_map, &children);

        Self {
            tasks,
            task_map,
            children,
            roots,
            nested_index,
            dependency_maps,
            critical_paths,
            containment_warnings,
        }
    }

    /// Comparison levels present in the snapshot, ascending
    pub fn levels(&self) -> Vec<u32> {
        let mut levels: Vec<u32> = self.task_map.keys().copied().collect();
        levels.sort_unstable();
        levels
    }

    /// Looks a task up by level and id
    pub fn task(&self, level: u32, id: &str) -> Option<&TaskOrEmpty> {
        self.task_map
            .get(&level)?
            .get(id)
            .map(|&index| &self.tasks[index])
    }

    /// Consequences of moving or resizing one task; see [`suggest_date_change`]
    pub fn suggest(
        &self,
        task_id: &str,
        level: u32,
        new_start: DateTime<Utc>,
        new_end: DateTime<Utc>,
    ) -> Result<ChangeMetadata, SuggestError> {
        suggest_date_change(
            task_id,
            level,
            new_start,
            new_end,
            &self.tasks,
            &self.task_map,
            &self.children,
            &self.dependency_maps.dependents,
        )
    }

    /// Host-callback metadata for any change action; see [`change_metadata`]
    pub fn metadata_for(&self, action: &ChangeAction) -> Result<ChangeMetadata, SuggestError> {
        change_metadata(
            action,
            &self.tasks,
            &self.task_map,
            &self.children,
            &self.dependency_maps.dependents,
        )
    }

    /// Returns true if either task contains the other in the forest
    pub fn is_one_descendant(&self, level: u32, first_id: &str, second_id: &str) -> bool {
        is_one_descendant(&self.tasks, &self.children, level, first_id, second_id)
    }

    /// Advisory structural diagnostics; see [`validate_tasks`]
    pub fn validate(&self) -> Vec<Diagnostic> {
        validate_tasks(&self.tasks)
    }
}
