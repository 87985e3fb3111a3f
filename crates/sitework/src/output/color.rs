//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:  green   (completed tasks, ready listings)
//!   - Warning/Active: yellow (in-progress tasks, load warnings)
//!   - Error/Blocked: red     (blocked tasks, cycles)
//!   - Info/Reference: cyan   (task IDs)
//!   - Accent:        magenta (on-hold tasks)
//!   - Muted:         dimmed  (field labels, connectors)

use crate::domain::{TaskPriority, TaskStatus};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply color to status text based on task status.
pub(crate) fn colorize_status(status: TaskStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        TaskStatus::NotStarted => text.white().to_string(),
        TaskStatus::InProgress => text.yellow().to_string(),
        TaskStatus::Completed => text.green().to_string(),
        TaskStatus::OnHold => text.magenta().to_string(),
    }
}

/// Apply color to priority text.
pub(crate) fn colorize_priority(priority: TaskPriority, config: &OutputConfig) -> String {
    let text = format!("[{priority}]");
    if !config.use_colors {
        return text;
    }
    match priority {
        TaskPriority::High => text.red().bold().to_string(),
        TaskPriority::Medium => text.yellow().to_string(),
        TaskPriority::Low => text.to_string(),
    }
}

/// Colorize a task ID (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Status icon, red lock when the task is blocked.
pub(crate) fn status_icon(status: TaskStatus, blocked: bool, config: &OutputConfig) -> String {
    let icon = match (blocked, status, config.use_ascii) {
        (true, _, true) => "x",
        (true, _, false) => "⊘",
        (false, TaskStatus::Completed, true) => "v",
        (false, TaskStatus::Completed, false) => "✓",
        (false, TaskStatus::InProgress, true) => ">",
        (false, TaskStatus::InProgress, false) => "◐",
        (false, TaskStatus::OnHold, true) => "=",
        (false, TaskStatus::OnHold, false) => "‖",
        (false, TaskStatus::NotStarted, true) => "o",
        (false, TaskStatus::NotStarted, false) => "○",
    };
    if !config.use_colors {
        return icon.to_string();
    }
    if blocked {
        return icon.red().to_string();
    }
    match status {
        TaskStatus::Completed => icon.green().to_string(),
        TaskStatus::InProgress => icon.yellow().to_string(),
        TaskStatus::OnHold => icon.magenta().to_string(),
        TaskStatus::NotStarted => icon.to_string(),
    }
}

/// Dimmed text for labels and connectors.
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Bold text for section headers.
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
