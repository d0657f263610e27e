//! Change-suggestion engine
//!
//! Given a proposed move or resize of one task, computes the ordered set of
//! date adjustments that keep two invariants intact: every parent contains
//! its children's intervals, and every dependency margin stays non-negative.
//! The engine only proposes — it never touches the caller's task list; the
//! host applies or rejects the batch as a whole.
//!
//! Propagation, in emission order:
//! - ancestors of the moved task grow to re-contain it, immediate parent
//!   first, transitively up the chain (growth only, never shrink);
//! - on a pure shift, descendants move by the same delta in forest order;
//! - dependents bound to a moved edge are re-margined and shifted to restore
//!   a zero margin, cascading through their own dependents and ancestors.
//!
//! Each task receives at most one suggestion per call: ancestor growth widens
//! an already-emitted suggestion in place, dependent shifts are first-wins.
//! Together with the visitation guards this makes contradictory cycles
//! terminate with a best-effort subset instead of an error.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::domain::{
    ChangeAction, ChangeMetadata, DateChangeSuggestion, Task, TaskOrEmpty,
};

use super::dependency::DependentMap;
use super::forest::{descendants_of, ChildMapByLevel, TaskMapByLevel};

#[derive(Debug, Error, PartialEq)]
pub enum SuggestError {
    #[error("no task with id '{id}' at comparison level {level}")]
    TaskNotFound { id: String, level: u32 },

    #[error("task '{0}' is a placeholder without dates")]
    EmptyTask(String),
}

type Interval = (DateTime<Utc>, DateTime<Utc>);

/// Computes the consequences of moving or resizing one task
///
/// `new_start`/`new_end` is the proposed interval for the task with `task_id`
/// at `level`. Returns the affected dependents, the task's offset in the
/// caller's array, its ancestor chain (immediate parent first), and the
/// ordered suggestions.
pub fn suggest_date_change(
    task_id: &str,
    level: u32,
    new_start: DateTime<Utc>,
    new_end: DateTime<Utc>,
    tasks: &[TaskOrEmpty],
    task_map: &TaskMapByLevel,
    children: &ChildMapByLevel,
    dependents: &DependentMap,
) -> Result<ChangeMetadata, SuggestError> {
    let not_found = || SuggestError::TaskNotFound {
        id: task_id.to_string(),
        level,
    };
    let level_tasks = task_map.get(&level).ok_or_else(not_found)?;
    let &offset = level_tasks.get(task_id).ok_or_else(not_found)?;
    let task = tasks[offset]
        .as_task()
        .ok_or_else(|| SuggestError::EmptyTask(task_id.to_string()))?;

    let mut propagation = Propagation::new(tasks, level_tasks, dependents.get(&level));
    propagation
        .proposals
        .insert(task.id.clone(), (new_start, new_end));

    let parents = collect_parent_chain(own_parent(task), tasks, level_tasks);

    propagation.grow_ancestors(own_parent(task).map(str::to_string), (new_start, new_end));

    // a pure shift drags the subtree along; a resize leaves children in place
    let delta = new_start - task.start;
    let is_shift = delta != TimeDelta::zero() && (new_end - new_start) == task.duration();

    let mut cascade_seeds = vec![task.id.clone()];
    if is_shift {
        for descendant_index in descendants_of(tasks, children, level, &task.id) {
            let Some(descendant) = tasks[descendant_index].as_task() else {
                continue;
            };
            if propagation.proposals.contains_key(&descendant.id) {
                continue;
            }
            let shifted = (descendant.start + delta, descendant.end + delta);
            propagation.propose(descendant, shifted);
            cascade_seeds.push(descendant.id.clone());
        }
    }

    let dependent_tasks = propagation.cascade_dependents(cascade_seeds);

    Ok(ChangeMetadata {
        dependent_tasks,
        index: offset,
        parents,
        suggestions: propagation.suggestions,
    })
}

/// Computes host-callback metadata for any [`ChangeAction`]
///
/// `Change` on a dated task runs the full suggestion cascade against the
/// task's carried (new) interval. Structural actions resolve the affected
/// task's dependents and (new) ancestor chain, growing that chain where a
/// moved or added child would stick out of it.
pub fn change_metadata(
    action: &ChangeAction,
    tasks: &[TaskOrEmpty],
    task_map: &TaskMapByLevel,
    children: &ChildMapByLevel,
    dependents: &DependentMap,
) -> Result<ChangeMetadata, SuggestError> {
    match action {
        ChangeAction::Change { task } => match task {
            TaskOrEmpty::Task(changed) => suggest_date_change(
                &changed.id,
                changed.comparison_level,
                changed.start,
                changed.end,
                tasks,
                task_map,
                children,
                dependents,
            ),
            TaskOrEmpty::Empty(_) => {
                structural_metadata(task, task.parent(), tasks, task_map, dependents)
            }
        },

        ChangeAction::Delete { task } => {
            structural_metadata(task, task.parent(), tasks, task_map, dependents)
        }

        ChangeAction::AddChild { parent, child } => {
            adoption_metadata(parent, &parent.id, child, tasks, task_map, dependents)
        }

        ChangeAction::MoveAfter {
            target,
            task_for_move,
        } => {
            let level = task_for_move.comparison_level();
            let level_tasks = level_map(task_map, level, task_for_move.id())?;
            let &offset = level_tasks
                .get(task_for_move.id())
                .ok_or_else(|| SuggestError::TaskNotFound {
                    id: task_for_move.id().to_string(),
                    level,
                })?;

            let parents = collect_parent_chain(target.parent(), tasks, level_tasks);
            let mut propagation = Propagation::new(tasks, level_tasks, dependents.get(&level));
            if let Some(moved) = task_for_move.as_task() {
                propagation.grow_ancestors(
                    target.parent().map(str::to_string),
                    (moved.start, moved.end),
                );
            }

            Ok(ChangeMetadata {
                dependent_tasks: direct_dependents(
                    task_for_move.id(),
                    level,
                    tasks,
                    level_tasks,
                    dependents,
                ),
                index: offset,
                parents,
                suggestions: propagation.suggestions,
            })
        }

        ChangeAction::MoveInside { parent, child } => {
            adoption_metadata(parent, child.id(), child, tasks, task_map, dependents)
        }
    }
}

/// Metadata for a task staying where it is (delete, empty-task edit)
fn structural_metadata(
    row: &TaskOrEmpty,
    first_parent: Option<&str>,
    tasks: &[TaskOrEmpty],
    task_map: &TaskMapByLevel,
    dependents: &DependentMap,
) -> Result<ChangeMetadata, SuggestError> {
    let level = row.comparison_level();
    let level_tasks = level_map(task_map, level, row.id())?;
    let &offset = level_tasks
        .get(row.id())
        .ok_or_else(|| SuggestError::TaskNotFound {
            id: row.id().to_string(),
            level,
        })?;

    Ok(ChangeMetadata {
        dependent_tasks: direct_dependents(row.id(), level, tasks, level_tasks, dependents),
        index: offset,
        parents: collect_parent_chain(first_parent, tasks, level_tasks),
        suggestions: Vec::new(),
    })
}

/// Metadata for placing `child` under `parent` (add-child, move-inside)
///
/// `index_id` is the task whose offset the host receives: the child when it
/// already exists in the list, the parent when the child is being created.
fn adoption_metadata(
    parent: &Task,
    index_id: &str,
    child: &TaskOrEmpty,
    tasks: &[TaskOrEmpty],
    task_map: &TaskMapByLevel,
    dependents: &DependentMap,
) -> Result<ChangeMetadata, SuggestError> {
    let level = parent.comparison_level;
    let level_tasks = level_map(task_map, level, index_id)?;
    let &offset = level_tasks
        .get(index_id)
        .ok_or_else(|| SuggestError::TaskNotFound {
            id: index_id.to_string(),
            level,
        })?;

    let mut parents = vec![parent.clone()];
    parents.extend(collect_parent_chain(own_parent(parent), tasks, level_tasks));

    let mut propagation = Propagation::new(tasks, level_tasks, dependents.get(&level));
    if let Some(child_task) = child.as_task() {
        propagation.grow_ancestors(
            Some(parent.id.clone()),
            (child_task.start, child_task.end),
        );
    }

    Ok(ChangeMetadata {
        dependent_tasks: direct_dependents(child.id(), level, tasks, level_tasks, dependents),
        index: offset,
        parents,
        suggestions: propagation.suggestions,
    })
}

fn level_map<'a>(
    task_map: &'a TaskMapByLevel,
    level: u32,
    id: &str,
) -> Result<&'a HashMap<String, usize>, SuggestError> {
    task_map.get(&level).ok_or_else(|| SuggestError::TaskNotFound {
        id: id.to_string(),
        level,
    })
}

fn own_parent(task: &Task) -> Option<&str> {
    task.parent.as_deref().filter(|p| !p.is_empty())
}

/// Ancestor chain as stored tasks, immediate parent first
///
/// Stops at a missing parent, a placeholder, or a repeated id (parent cycle).
fn collect_parent_chain(
    first_parent: Option<&str>,
    tasks: &[TaskOrEmpty],
    level_tasks: &HashMap<String, usize>,
) -> Vec<Task> {
    let mut parents = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut current = first_parent.map(str::to_string);

    while let Some(id) = current {
        if !seen.insert(id.clone()) {
            break;
        }
        let Some(parent) = level_tasks.get(&id).and_then(|&i| tasks[i].as_task()) else {
            break;
        };
        parents.push(parent.clone());
        current = own_parent(parent).map(str::to_string);
    }

    parents
}

fn direct_dependents(
    id: &str,
    level: u32,
    tasks: &[TaskOrEmpty],
    level_tasks: &HashMap<String, usize>,
    dependents: &DependentMap,
) -> Vec<Task> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut result = Vec::new();

    if let Some(records) = dependents.get(&level).and_then(|map| map.get(id)) {
        for record in records {
            if !seen.insert(record.dependent_id.as_str()) {
                continue;
            }
            if let Some(task) = level_tasks
                .get(&record.dependent_id)
                .and_then(|&i| tasks[i].as_task())
            {
                result.push(task.clone());
            }
        }
    }

    result
}

/// Working state of one propagation pass
struct Propagation<'a> {
    tasks: &'a [TaskOrEmpty],
    level_tasks: &'a HashMap<String, usize>,
    level_dependents: Option<&'a HashMap<String, Vec<super::dependency::ExpandedDependent>>>,
    /// Proposed intervals, including the moved task's own
    proposals: HashMap<String, Interval>,
    suggestions: Vec<DateChangeSuggestion>,
    /// Suggestion slot per task id, for in-place widening
    slots: HashMap<String, usize>,
}

impl<'a> Propagation<'a> {
    fn new(
        tasks: &'a [TaskOrEmpty],
        level_tasks: &'a HashMap<String, usize>,
        level_dependents: Option<
            &'a HashMap<String, Vec<super::dependency::ExpandedDependent>>,
        >,
    ) -> Self {
        Self {
            tasks,
            level_tasks,
            level_dependents,
            proposals: HashMap::new(),
            suggestions: Vec::new(),
            slots: HashMap::new(),
        }
    }

    fn resolve(&self, id: &str) -> Option<&'a Task> {
        self.level_tasks
            .get(id)
            .and_then(|&index| self.tasks[index].as_task())
    }

    fn interval_of(&self, task: &Task) -> Interval {
        self.proposals
            .get(&task.id)
            .copied()
            .unwrap_or((task.start, task.end))
    }

    fn propose(&mut self, task: &Task, interval: Interval) {
        self.proposals.insert(task.id.clone(), interval);

        if let Some(&slot) = self.slots.get(&task.id) {
            self.suggestions[slot].start = interval.0;
            self.suggestions[slot].end = interval.1;
        } else if let Some(&offset) = self.level_tasks.get(&task.id) {
            self.slots.insert(task.id.clone(), self.suggestions.len());
            self.suggestions.push(DateChangeSuggestion {
                start: interval.0,
                end: interval.1,
                task: task.clone(),
                index: offset,
            });
        }
    }

    /// Grows the chain above `first_parent` until an ancestor already
    /// contains the child interval
    fn grow_ancestors(&mut self, first_parent: Option<String>, mut child: Interval) {
        let mut seen: HashSet<String> = HashSet::new();
        let mut current = first_parent;

        while let Some(id) = current {
            if !seen.insert(id.clone()) {
                break;
            }
            let Some(ancestor) = self.resolve(&id) else {
                break;
            };

            let base = self.interval_of(ancestor);
            let grown = (base.0.min(child.0), base.1.max(child.1));
            if grown == base {
                break;
            }

            self.propose(ancestor, grown);
            child = grown;
            current = own_parent(ancestor).map(str::to_string);
        }
    }

    /// Re-margins every dependent of the seed tasks against their proposed
    /// positions, shifting violated dependents and cascading through them
    ///
    /// Returns the dependents encountered, in discovery order.
    fn cascade_dependents(&mut self, seeds: Vec<String>) -> Vec<Task> {
        let mut queue: VecDeque<String> = seeds.into();
        let mut processed: HashSet<String> = HashSet::new();
        let mut seen_dependents: HashSet<String> = HashSet::new();
        let mut dependent_tasks: Vec<Task> = Vec::new();

        while let Some(source_id) = queue.pop_front() {
            if !processed.insert(source_id.clone()) {
                continue;
            }
            let Some(source) = self.resolve(&source_id) else {
                continue;
            };
            let source_interval = self.interval_of(source);

            let Some(records) = self.level_dependents.and_then(|map| map.get(&source_id))
            else {
                continue;
            };

            for record in records {
                let Some(dependent) = self.resolve(&record.dependent_id) else {
                    continue;
                };
                if seen_dependents.insert(dependent.id.clone()) {
                    dependent_tasks.push(dependent.clone());
                }
                if self.proposals.contains_key(&dependent.id) {
                    continue;
                }

                let source_bound = record.own_target.date_of_interval(source_interval);
                let dependent_bound = record.dependent_target.date_of(dependent);
                let margin = dependent_bound - source_bound;

                if margin < TimeDelta::zero() {
                    let delta = -margin;
                    let shifted = (dependent.start + delta, dependent.end + delta);
                    self.propose(dependent, shifted);
                    self.grow_ancestors(own_parent(dependent).map(str::to_string), shifted);
                    queue.push_back(dependent.id.clone());
                }
            }
        }

        dependent_tasks
    }
}
