//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::domain::TaskId;

/// Parse a task ID.
///
/// Accepts the bare backend id (`12`) or the display form (`#12`).
pub fn parse_task_id(s: &str) -> Result<TaskId, String> {
    let s = s.trim();
    let digits = s.strip_prefix('#').unwrap_or(s);

    if digits.is_empty() {
        return Err("Task ID cannot be empty".to_string());
    }

    digits
        .parse::<u64>()
        .map(TaskId)
        .map_err(|_| format!("Invalid task ID: '{s}'. Expected a number such as 12 or #12"))
}

/// Validate a traversal depth limit.
pub fn parse_depth(s: &str) -> Result<usize, String> {
    let depth: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid depth: '{s}'"))?;
    if depth == 0 {
        return Err("Depth must be at least 1".to_string());
    }
    Ok(depth)
}
