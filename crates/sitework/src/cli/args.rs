//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::Parser;

use super::types::TaskStatusArg;
use super::validators::{parse_depth, parse_task_id};
use crate::domain::TaskId;

/// Arguments for the `deps` command
#[derive(Parser, Debug, Clone)]
pub struct DepsArgs {
    /// Task ID (e.g., 12 or #12)
    #[arg(value_parser = parse_task_id)]
    pub task: TaskId,
}

/// Arguments for the `ready` command
#[derive(Parser, Debug, Clone)]
pub struct ReadyArgs {
    /// Require the whole dependency chain to be completed
    ///
    /// Defaults to the `readiness` setting of the configuration file.
    #[arg(long)]
    pub transitive: bool,

    /// Depth limit for transitive readiness
    #[arg(long, value_parser = parse_depth)]
    pub depth: Option<usize>,
}

/// Arguments for the `link` and `unlink` commands
#[derive(Parser, Debug, Clone)]
pub struct LinkArgs {
    /// The dependent task
    #[arg(value_parser = parse_task_id)]
    pub task: TaskId,

    /// The task it depends on
    #[arg(value_parser = parse_task_id)]
    pub dependency: TaskId,
}

/// Arguments for the `status` command
#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {
    /// Task ID
    #[arg(value_parser = parse_task_id)]
    pub task: TaskId,

    /// New status
    #[arg(value_enum)]
    pub status: TaskStatusArg,
}

/// Arguments for the `tree` command
#[derive(Parser, Debug, Clone)]
pub struct TreeArgs {
    /// Root task ID
    #[arg(value_parser = parse_task_id)]
    pub task: TaskId,

    /// Maximum depth to display (defaults to `max-depth` from the configuration)
    #[arg(short, long, value_parser = parse_depth)]
    pub depth: Option<usize>,
}
