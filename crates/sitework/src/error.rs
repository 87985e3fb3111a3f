//! Error types for sitework operations.

use crate::domain::TaskId;
use std::io;
use thiserror::Error;

/// The error type for sitework operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A task was asked to depend on itself.
    #[error("Task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// Adding the dependency would close a cycle.
    #[error("Adding dependency {from} -> {to} would create a cycle")]
    CircularDependency {
        /// The dependent task
        from: TaskId,
        /// The prerequisite task
        to: TaskId,
    },

    /// Task not found.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),
}

/// A specialized Result type for sitework operations.
pub type Result<T> = std::result::Result<T, Error>;
