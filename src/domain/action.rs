//! Change protocol between the engine and its host
//!
//! The host owns the authoritative task list. Every mutation intent is
//! expressed as a [`ChangeAction`]; the engine answers with
//! [`ChangeMetadata`] (affected dependents, the task's position, its parent
//! chain, and date-change suggestions) and the host decides what to do with
//! it. [`apply_suggestions`] materializes an accepted batch into a fresh
//! list; the engine never mutates the input in place.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::task::{Task, TaskOrEmpty};

/// A mutation intent, described but not yet applied
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeAction {
    /// Replace a task with an edited copy (new dates, name, progress, ...)
    Change { task: TaskOrEmpty },
    /// Remove a task
    Delete { task: TaskOrEmpty },
    /// Add a new child under a parent task
    AddChild { parent: Task, child: TaskOrEmpty },
    /// Reorder a task to sit after a sibling, adopting the sibling's parent
    MoveAfter {
        target: TaskOrEmpty,
        task_for_move: TaskOrEmpty,
    },
    /// Reparent a task under another task
    MoveInside { parent: Task, child: TaskOrEmpty },
}

/// A proposed date change for one task
///
/// `index` is the task's offset in the caller's task array, so the host can
/// apply the change without a lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateChangeSuggestion {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// The affected task, as it currently is (pre-change dates)
    pub task: Task,
    pub index: usize,
}

/// Everything the host needs to react to a [`ChangeAction`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeMetadata {
    /// Tasks that depend on the changed task, in discovery order
    pub dependent_tasks: Vec<Task>,
    /// Offset of the changed task in the caller's task array
    pub index: usize,
    /// Ancestor chain, immediate parent first
    pub parents: Vec<Task>,
    /// Ordered date changes keeping the tree and margins consistent
    pub suggestions: Vec<DateChangeSuggestion>,
}

/// The host's verdict on a suggestion batch
///
/// Replaces the callback-returning-a-promise shape of UI frameworks: the
/// engine hands back metadata, the host answers with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateChangeDecision {
    /// Apply the changed task and the whole suggestion batch
    Accepted,
    /// Discard everything; the host snaps the gesture back
    Rejected,
    /// The host needs an asynchronous decision; nothing is applied yet
    Deferred,
}

/// Builds the task list that results from accepting a change
///
/// Replaces the entry at `index` with `changed` and applies every suggestion
/// by offset. The input list is left untouched.
pub fn apply_suggestions(
    tasks: &[TaskOrEmpty],
    changed: &TaskOrEmpty,
    index: usize,
    suggestions: &[DateChangeSuggestion],
) -> Vec<TaskOrEmpty> {
    let mut next: Vec<TaskOrEmpty> = tasks.to_vec();

    if index < next.len() {
        next[index] = changed.clone();
    }

    for suggestion in suggestions {
        if let Some(TaskOrEmpty::Task(task)) = next.get_mut(suggestion.index) {
            task.start = suggestion.start;
            task.end = suggestion.end;
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn apply_suggestions_builds_fresh_list() {
        let tasks: Vec<TaskOrEmpty> = vec![
            Task::new("p", "Parent", date(1), date(10)).into(),
            Task::new("c", "Child", date(2), date(5)).into(),
        ];

        let mut moved = Task::new("c", "Child", date(2), date(12));
        moved.parent = Some("p".to_string());
        let changed = TaskOrEmpty::from(moved);

        let suggestion = DateChangeSuggestion {
            start: date(1),
            end: date(12),
            task: Task::new("p", "Parent", date(1), date(10)),
            index: 0,
        };

        let next = apply_suggestions(&tasks, &changed, 1, &[suggestion]);

        let parent = next[0].as_task().unwrap();
        assert_eq!(parent.end, date(12));

        let child = next[1].as_task().unwrap();
        assert_eq!(child.end, date(12));

        // input list untouched
        assert_eq!(tasks[0].as_task().unwrap().end, date(10));
        assert_eq!(tasks[1].as_task().unwrap().end, date(5));
    }

    #[test]
    fn out_of_range_indexes_are_ignored() {
        let tasks: Vec<TaskOrEmpty> = vec![Task::new("a", "A", date(1), date(2)).into()];
        let changed = tasks[0].clone();

        let suggestion = DateChangeSuggestion {
            start: date(1),
            end: date(3),
            task: Task::new("ghost", "Ghost", date(1), date(2)),
            index: 9,
        };

        let next = apply_suggestions(&tasks, &changed, 9, &[suggestion]);
        assert_eq!(next, tasks);
    }
}
