//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::TaskStatus;

/// Task status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatusArg {
    /// Work has not begun
    #[value(alias = "not_started")]
    NotStarted,
    /// Work is underway
    #[value(alias = "in_progress")]
    InProgress,
    /// Work is finished
    Completed,
    /// Work is paused
    #[value(alias = "on_hold")]
    OnHold,
}

impl From<TaskStatusArg> for TaskStatus {
    fn from(arg: TaskStatusArg) -> Self {
        match arg {
            TaskStatusArg::NotStarted => TaskStatus::NotStarted,
            TaskStatusArg::InProgress => TaskStatus::InProgress,
            TaskStatusArg::Completed => TaskStatus::Completed,
            TaskStatusArg::OnHold => TaskStatus::OnHold,
        }
    }
}
