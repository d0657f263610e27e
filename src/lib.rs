//! gantt-engine - Task-graph scheduling engine for interactive Gantt charts
//!
//! Takes an ordered list of tasks (hierarchical, time-boxed, with cross-task
//! dependencies, optionally split across comparison levels) and derives the
//! structures a Gantt renderer needs: the task forest, nesting indexes,
//! expanded dependencies with margins, the critical path, containment and
//! dependency warnings, and date-change suggestions for drag gestures.
//! Everything is a pure function of the input snapshot; the host owns the
//! authoritative task list.

pub mod cli;
pub mod domain;
pub mod engine;

pub use domain::{
    apply_suggestions, ChangeAction, ChangeMetadata, DateChangeDecision, DateChangeSuggestion,
    Dependency, EmptyTask, RelationTarget, Task, TaskOrEmpty, TaskType,
};
pub use engine::{Diagnostic, Schedule, SuggestError};
