//! Domain types for construction task tracking.
//!
//! These types mirror the task records served by the project backend. Fields
//! the backend may omit or null out are modelled as `Option` with serde
//! defaults so that "missing" always reads as "empty" rather than failing
//! deserialization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    /// Get the raw integer value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Status of a task
///
/// Tasks move `not-started -> in-progress -> completed`. `on-hold` can be
/// entered from any non-terminal status and left back to `not-started` or
/// `in-progress`. `completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Work has not begun
    #[default]
    NotStarted,

    /// Work is underway
    InProgress,

    /// Work is finished
    Completed,

    /// Work is paused
    OnHold,
}

impl TaskStatus {
    /// Whether the task-CRUD layer may move a task from `self` to `next`.
    ///
    /// Staying in the same status is not a transition and returns `false`.
    pub fn can_transition_to(self, next: Self) -> bool {
        use TaskStatus::{Completed, InProgress, NotStarted, OnHold};

        matches!(
            (self, next),
            (NotStarted, InProgress)
                | (InProgress, Completed)
                | (NotStarted | InProgress, OnHold)
                | (OnHold, NotStarted | InProgress)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not-started"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Completed => write!(f, "completed"),
            Self::OnHold => write!(f, "on-hold"),
        }
    }
}

/// Priority of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority
    Low,

    /// Medium priority
    #[default]
    Medium,

    /// High priority
    High,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Apartment layout a task applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    /// One bedroom, hall, kitchen
    #[serde(rename = "1BHK")]
    OneBhk,

    /// Two bedrooms
    #[serde(rename = "2BHK")]
    TwoBhk,

    /// Three bedrooms
    #[serde(rename = "3BHK")]
    ThreeBhk,

    /// Four bedrooms
    #[serde(rename = "4BHK")]
    FourBhk,

    /// Five bedrooms
    #[serde(rename = "5BHK")]
    FiveBhk,
}

/// A unit of work belonging to a project
///
/// Only `id`, `status` and `dependencies` matter to the dependency graph.
/// Everything else is carried through untouched so that a snapshot can be
/// written back in the shape the backend served it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for the task
    pub id: TaskId,

    /// Task title
    #[serde(default)]
    pub title: String,

    /// Task description
    #[serde(default)]
    pub description: Option<String>,

    /// Owning project
    #[serde(default)]
    pub project: Option<u64>,

    /// User the task is assigned to
    #[serde(default)]
    pub assigned_to: Option<u64>,

    /// User who assigned the task
    #[serde(default)]
    pub assigned_by: Option<u64>,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Completion percentage, nominally 0-100 but not range-checked by the backend
    #[serde(default)]
    pub progress: i64,

    /// Priority level
    #[serde(default)]
    pub priority: TaskPriority,

    /// Due date
    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    /// Creation date
    #[serde(default)]
    pub created_date: Option<NaiveDate>,

    /// Building the work happens in
    #[serde(default)]
    pub building: Option<String>,

    /// Floor the work happens on
    #[serde(default)]
    pub floor: Option<String>,

    /// Unit the work happens in
    #[serde(default)]
    pub unit: Option<String>,

    /// Unit layout; blank or unrecognised values read as `None`
    #[serde(default, deserialize_with = "lenient_unit_type")]
    pub unit_type: Option<UnitType>,

    /// Per-unit breakdown, stored by the backend as a free-form JSON object
    #[serde(default = "empty_object")]
    pub units_data: serde_json::Value,

    /// IDs of the tasks this task depends on, in listed order
    #[serde(default, deserialize_with = "nullable_ids")]
    pub dependencies: Vec<TaskId>,

    /// Allow starting before prerequisites are completed
    #[serde(
        default,
        alias = "canStartWithoutDependency",
        skip_serializing_if = "Option::is_none"
    )]
    pub can_start_without_dependency: Option<bool>,
}

/// `dependencies: null` from the backend reads as an empty list.
fn nullable_ids<'de, D>(deserializer: D) -> Result<Vec<TaskId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<TaskId>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `unit_type` is a free-text column, so `""` and unknown layouts are tolerated.
fn lenient_unit_type<'de, D>(deserializer: D) -> Result<Option<UnitType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        serde_json::from_value(serde_json::Value::String(value.trim().to_string())).ok()
    }))
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Task {
    /// Create a not-started task with no dependencies.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: TaskId(id),
            title: title.into(),
            description: None,
            project: None,
            assigned_to: None,
            assigned_by: None,
            status: TaskStatus::NotStarted,
            progress: 0,
            priority: TaskPriority::Medium,
            due_date: None,
            created_date: None,
            building: None,
            floor: None,
            unit: None,
            unit_type: None,
            units_data: empty_object(),
            dependencies: Vec::new(),
            can_start_without_dependency: None,
        }
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Replace the dependency list.
    #[must_use]
    pub fn with_dependencies(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.dependencies = ids.into_iter().map(TaskId).collect();
        self
    }

    /// Whether this task lists `id` among its dependencies.
    pub fn depends_on(&self, id: TaskId) -> bool {
        self.dependencies.contains(&id)
    }

    /// Whether the task has been flagged to start ahead of its prerequisites.
    pub fn may_skip_dependencies(&self) -> bool {
        self.can_start_without_dependency.unwrap_or(false)
    }

    /// Whether the task is completed.
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn task_deserializes_from_backend_shape() {
        let json = r#"{
            "id": 12,
            "title": "Pour slab",
            "description": null,
            "project": 3,
            "assigned_to": 7,
            "assigned_by": 1,
            "status": "in-progress",
            "progress": 40,
            "priority": "high",
            "due_date": "2025-03-01",
            "created_date": "2025-01-15",
            "building": "A",
            "floor": "2",
            "unit": null,
            "unit_type": "3BHK",
            "units_data": {"201": 0.5},
            "dependencies": [10, 11]
        }"#;

        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, TaskId(12));
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.unit_type, Some(UnitType::ThreeBhk));
        assert_eq!(task.dependencies, vec![TaskId(10), TaskId(11)]);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(task.description.is_none());
    }

    #[rstest]
    #[case(r#"{"id": 1}"#)]
    #[case(r#"{"id": 1, "dependencies": null}"#)]
    #[case(r#"{"id": 1, "dependencies": []}"#)]
    fn missing_dependencies_read_as_empty(#[case] json: &str) {
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.dependencies.is_empty());
        assert_eq!(task.status, TaskStatus::NotStarted);
    }

    #[rstest]
    #[case(r#"{"id": 1, "unit_type": ""}"#, None)]
    #[case(r#"{"id": 1, "unit_type": "Studio"}"#, None)]
    #[case(r#"{"id": 1, "unit_type": null}"#, None)]
    #[case(r#"{"id": 1, "unit_type": "2BHK"}"#, Some(UnitType::TwoBhk))]
    fn unit_type_tolerates_free_text(#[case] json: &str, #[case] expected: Option<UnitType>) {
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.unit_type, expected);
    }

    #[rstest]
    #[case(r#"{"id": 1, "progress": 300}"#, 300)]
    #[case(r#"{"id": 1, "progress": -5}"#, -5)]
    fn progress_is_not_range_checked(#[case] json: &str, #[case] expected: i64) {
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.progress, expected);
    }

    #[test]
    fn missing_units_data_is_empty_object() {
        let task: Task = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(task.units_data, serde_json::json!({}));

        let json = serde_json::to_value(Task::new(2, "Survey")).unwrap();
        assert_eq!(json["units_data"], serde_json::json!({}));
    }

    #[test]
    fn override_flag_accepts_client_spelling() {
        let task: Task =
            serde_json::from_str(r#"{"id": 4, "canStartWithoutDependency": true}"#).unwrap();
        assert!(task.may_skip_dependencies());
    }

    #[test]
    fn override_flag_is_omitted_when_unset() {
        let json = serde_json::to_value(Task::new(1, "Survey")).unwrap();
        assert!(json.get("can_start_without_dependency").is_none());
        assert_eq!(json["status"], "not-started");
    }

    #[rstest]
    #[case(TaskStatus::NotStarted, TaskStatus::InProgress, true)]
    #[case(TaskStatus::InProgress, TaskStatus::Completed, true)]
    #[case(TaskStatus::NotStarted, TaskStatus::OnHold, true)]
    #[case(TaskStatus::InProgress, TaskStatus::OnHold, true)]
    #[case(TaskStatus::OnHold, TaskStatus::InProgress, true)]
    #[case(TaskStatus::OnHold, TaskStatus::NotStarted, true)]
    #[case(TaskStatus::NotStarted, TaskStatus::Completed, false)]
    #[case(TaskStatus::Completed, TaskStatus::OnHold, false)]
    #[case(TaskStatus::Completed, TaskStatus::InProgress, false)]
    #[case(TaskStatus::OnHold, TaskStatus::Completed, false)]
    #[case(TaskStatus::InProgress, TaskStatus::InProgress, false)]
    fn status_transitions(
        #[case] from: TaskStatus,
        #[case] to: TaskStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn status_display_matches_wire_format() {
        for status in [
            TaskStatus::NotStarted,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::OnHold,
        ] {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, status.to_string());
        }
    }
}
