//! Gantt task model
//!
//! Tasks are time-boxed bars on the chart. They nest through `parent`
//! references into a forest, constrain each other through dependency links,
//! and may be split across independent comparison levels so several
//! alternative schedules can be shown side by side. An `EmptyTask` is a
//! placeholder row without dates; it participates in the forest but not in
//! any date arithmetic.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a scheduled bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// A regular unit of work
    #[default]
    Task,
    /// A zero-duration marker (`start == end`)
    Milestone,
    /// A container whose interval is expected to cover its children
    Project,
}

/// Which edge of a task a dependency binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationTarget {
    Start,
    End,
}

impl RelationTarget {
    /// Returns the bound edge's date of the given task
    pub fn date_of(&self, task: &Task) -> DateTime<Utc> {
        match self {
            RelationTarget::Start => task.start,
            RelationTarget::End => task.end,
        }
    }

    /// Returns the bound edge's date of a raw `(start, end)` interval
    pub fn date_of_interval(&self, interval: (DateTime<Utc>, DateTime<Utc>)) -> DateTime<Utc> {
        match self {
            RelationTarget::Start => interval.0,
            RelationTarget::End => interval.1,
        }
    }
}

/// A directed timing constraint on another task at the same comparison level
///
/// The task carrying the dependency is the dependent: its `own_target` edge
/// is expected not to precede the source task's `source_target` edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Id of the task this one depends on
    pub source_id: String,
    /// Bound edge of the source task
    pub source_target: RelationTarget,
    /// Bound edge of the dependent task itself
    pub own_target: RelationTarget,
}

impl Dependency {
    /// Creates a finish-to-start dependency, the common case
    pub fn finish_to_start(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            source_target: RelationTarget::End,
            own_target: RelationTarget::Start,
        }
    }
}

fn default_comparison_level() -> u32 {
    1
}

fn is_default_level(level: &u32) -> bool {
    *level == 1
}

/// A scheduled task bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique within a comparison level
    pub id: String,

    #[serde(rename = "type", default)]
    pub task_type: TaskType,

    pub name: String,

    pub start: DateTime<Utc>,

    pub end: DateTime<Utc>,

    /// From 0 to 100
    #[serde(default)]
    pub progress: f64,

    /// Id of the containing project or task, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,

    #[serde(
        default = "default_comparison_level",
        skip_serializing_if = "is_default_level"
    )]
    pub comparison_level: u32,

    #[serde(default)]
    pub hide_children: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<u32>,
}

impl Task {
    /// Creates a task with the given interval and defaults elsewhere
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            task_type: TaskType::Task,
            name: name.into(),
            start,
            end,
            progress: 0.0,
            parent: None,
            dependencies: Vec::new(),
            comparison_level: 1,
            hide_children: false,
            display_order: None,
        }
    }

    /// Creates a milestone (`start == end`)
    pub fn milestone(id: impl Into<String>, name: impl Into<String>, date: DateTime<Utc>) -> Self {
        let mut task = Self::new(id, name, date, date);
        task.task_type = TaskType::Milestone;
        task
    }

    /// Signed length of the task's interval
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Returns true if this task's interval fully contains `other`'s
    pub fn contains(&self, other: &Task) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A placeholder row without temporal data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyTask {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(
        default = "default_comparison_level",
        skip_serializing_if = "is_default_level"
    )]
    pub comparison_level: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<u32>,
}

/// A row of the chart: either a scheduled task or an empty placeholder
///
/// Deserialization is untagged: a record with `start` and `end` is a [`Task`],
/// anything else falls back to [`EmptyTask`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskOrEmpty {
    Task(Task),
    Empty(EmptyTask),
}

impl TaskOrEmpty {
    pub fn id(&self) -> &str {
        match self {
            TaskOrEmpty::Task(task) => &task.id,
            TaskOrEmpty::Empty(empty) => &empty.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TaskOrEmpty::Task(task) => &task.name,
            TaskOrEmpty::Empty(empty) => &empty.name,
        }
    }

    /// The containing task's id; an empty string counts as no parent
    pub fn parent(&self) -> Option<&str> {
        let parent = match self {
            TaskOrEmpty::Task(task) => task.parent.as_deref(),
            TaskOrEmpty::Empty(empty) => empty.parent.as_deref(),
        };
        parent.filter(|p| !p.is_empty())
    }

    pub fn comparison_level(&self) -> u32 {
        match self {
            TaskOrEmpty::Task(task) => task.comparison_level,
            TaskOrEmpty::Empty(empty) => empty.comparison_level,
        }
    }

    pub fn display_order(&self) -> Option<u32> {
        match self {
            TaskOrEmpty::Task(task) => task.display_order,
            TaskOrEmpty::Empty(empty) => empty.display_order,
        }
    }

    /// Returns the scheduled task, or None for a placeholder
    pub fn as_task(&self) -> Option<&Task> {
        match self {
            TaskOrEmpty::Task(task) => Some(task),
            TaskOrEmpty::Empty(_) => None,
        }
    }

    pub fn is_empty_task(&self) -> bool {
        matches!(self, TaskOrEmpty::Empty(_))
    }
}

impl From<Task> for TaskOrEmpty {
    fn from(task: Task) -> Self {
        TaskOrEmpty::Task(task)
    }
}

impl From<EmptyTask> for TaskOrEmpty {
    fn from(empty: EmptyTask) -> Self {
        TaskOrEmpty::Empty(empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn duration_is_signed() {
        let task = Task::new("a", "A", date(1), date(4));
        assert_eq!(task.duration(), TimeDelta::days(3));

        let inverted = Task::new("b", "B", date(4), date(1));
        assert_eq!(inverted.duration(), TimeDelta::days(-3));
    }

    #[test]
    fn milestone_has_zero_duration() {
        let milestone = Task::milestone("m", "M", date(5));
        assert_eq!(milestone.task_type, TaskType::Milestone);
        assert_eq!(milestone.duration(), TimeDelta::zero());
    }

    #[test]
    fn contains_is_inclusive() {
        let parent = Task::new("p", "P", date(1), date(10));
        let inside = Task::new("c", "C", date(1), date(10));
        let outside = Task::new("d", "D", date(1), date(11));

        assert!(parent.contains(&inside));
        assert!(!parent.contains(&outside));
    }

    #[test]
    fn empty_string_parent_counts_as_root() {
        let mut task = Task::new("a", "A", date(1), date(2));
        task.parent = Some(String::new());

        let row = TaskOrEmpty::from(task);
        assert_eq!(row.parent(), None);
    }

    #[test]
    fn relation_target_selects_edge() {
        let task = Task::new("a", "A", date(2), date(6));
        assert_eq!(RelationTarget::Start.date_of(&task), date(2));
        assert_eq!(RelationTarget::End.date_of(&task), date(6));
    }

    #[test]
    fn serde_roundtrip_task() {
        let mut task = Task::new("a", "A", date(1), date(3));
        task.dependencies.push(Dependency::finish_to_start("b"));
        task.parent = Some("p".to_string());

        let row = TaskOrEmpty::from(task);
        let json = serde_json::to_string(&row).unwrap();
        let parsed: TaskOrEmpty = serde_json::from_str(&json).unwrap();

        assert_eq!(row, parsed);
        assert!(parsed.as_task().is_some());
    }

    #[test]
    fn serde_roundtrip_empty_task() {
        let row = TaskOrEmpty::from(EmptyTask {
            id: "e".to_string(),
            name: "Placeholder".to_string(),
            parent: Some("p".to_string()),
            comparison_level: 2,
            display_order: None,
        });

        let json = serde_json::to_string(&row).unwrap();
        let parsed: TaskOrEmpty = serde_json::from_str(&json).unwrap();

        assert_eq!(row, parsed);
        assert!(parsed.is_empty_task());
        assert_eq!(parsed.comparison_level(), 2);
    }

    #[test]
    fn comparison_level_defaults_to_one() {
        let json = r#"{
            "id": "a",
            "name": "A",
            "start": "2024-01-01T00:00:00Z",
            "end": "2024-01-03T00:00:00Z"
        }"#;

        let parsed: TaskOrEmpty = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.comparison_level(), 1);
        assert!(parsed.as_task().is_some());
    }

    #[test]
    fn record_without_dates_parses_as_empty() {
        let json = r#"{"id": "e", "name": "Placeholder"}"#;
        let parsed: TaskOrEmpty = serde_json::from_str(json).unwrap();
        assert!(parsed.is_empty_task());
    }
}
