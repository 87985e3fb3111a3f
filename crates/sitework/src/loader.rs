//! Task snapshot loading and saving.
//!
//! A snapshot is the JSON array returned by the backend's task listing. The
//! loader never alters the tasks it reads: stale references, self references
//! and cycles are all legal for the dependency functions. They are reported
//! as [`LoadWarning`]s so callers can surface data-quality problems.

use crate::domain::{Task, TaskId};
use crate::error::Result;
use crate::graph::DependencyIndex;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tokio::fs;

/// Non-fatal findings from checking a task collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A dependency names a task that is not in the snapshot.
    ///
    /// **Effect**: the reference is skipped when resolving and never blocks.
    StaleDependency {
        /// Task holding the reference
        task: TaskId,
        /// The id that did not resolve
        missing: TaskId,
    },

    /// A task lists itself as a dependency.
    ///
    /// **Effect**: the task is startable only once it is itself completed.
    SelfDependency {
        /// The task
        task: TaskId,
    },

    /// A task lists the same dependency more than once.
    DuplicateDependency {
        /// Task holding the list
        task: TaskId,
        /// The repeated id
        dependency: TaskId,
    },

    /// Tasks that depend on each other in a cycle.
    ///
    /// **Effect**: none for direct readiness; transitive traversals stop at
    /// already visited tasks.
    CircularDependency {
        /// Tasks in the cycle, sorted
        tasks: Vec<TaskId>,
    },

    /// More than one task carries the same id.
    ///
    /// **Effect**: lookups resolve to the first occurrence.
    DuplicateTaskId {
        /// The repeated id
        id: TaskId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleDependency { task, missing } => {
                write!(f, "task {task} depends on missing task {missing}")
            }
            Self::SelfDependency { task } => write!(f, "task {task} depends on itself"),
            Self::DuplicateDependency { task, dependency } => {
                write!(f, "task {task} lists dependency {dependency} more than once")
            }
            Self::CircularDependency { tasks } => {
                let ids: Vec<String> = tasks.iter().map(ToString::to_string).collect();
                write!(f, "circular dependency between {}", ids.join(", "))
            }
            Self::DuplicateTaskId { id } => write!(f, "task id {id} appears more than once"),
        }
    }
}

/// Inspect a collection for data-quality problems, in collection order.
///
/// Cycle warnings follow the per-task warnings.
pub fn check_tasks(tasks: &[Task]) -> Vec<LoadWarning> {
    let mut warnings = Vec::new();
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    let known: HashSet<TaskId> = tasks.iter().map(|t| t.id).collect();

    for task in tasks {
        if !seen_ids.insert(task.id) {
            warnings.push(LoadWarning::DuplicateTaskId { id: task.id });
        }

        let mut listed = HashSet::with_capacity(task.dependencies.len());
        for &dep in &task.dependencies {
            if !listed.insert(dep) {
                warnings.push(LoadWarning::DuplicateDependency {
                    task: task.id,
                    dependency: dep,
                });
            } else if dep == task.id {
                warnings.push(LoadWarning::SelfDependency { task: task.id });
            } else if !known.contains(&dep) {
                warnings.push(LoadWarning::StaleDependency {
                    task: task.id,
                    missing: dep,
                });
            }
        }
    }

    // Self loops were reported above
    warnings.extend(
        DependencyIndex::from_tasks(tasks)
            .find_cycles()
            .into_iter()
            .filter(|cycle| cycle.len() > 1)
            .map(|tasks| LoadWarning::CircularDependency { tasks }),
    );

    warnings
}

/// Parse a snapshot from JSON text.
pub fn parse_tasks(json: &str) -> Result<(Vec<Task>, Vec<LoadWarning>)> {
    let tasks: Vec<Task> = serde_json::from_str(json)?;
    let warnings = check_tasks(&tasks);
    Ok((tasks, warnings))
}

/// Load a snapshot from a file.
///
/// # Errors
///
/// Fails on I/O errors or if the file is not a JSON array of tasks. Graph
/// problems are returned as warnings, never as errors.
///
/// # Example
///
/// ```no_run
/// use sitework::loader::load_tasks;
/// use std::path::Path;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> anyhow::Result<()> {
///     let (tasks, warnings) = load_tasks(Path::new("tasks.json")).await?;
///
///     for warning in &warnings {
///         eprintln!("warning: {warning}");
///     }
///     println!("Loaded {} tasks", tasks.len());
///     Ok(())
/// }
/// ```
pub async fn load_tasks(path: &Path) -> Result<(Vec<Task>, Vec<LoadWarning>)> {
    let content = fs::read_to_string(path).await?;
    let (tasks, warnings) = parse_tasks(&content)?;
    tracing::debug!(
        path = %path.display(),
        tasks = tasks.len(),
        warnings = warnings.len(),
        "Loaded task snapshot"
    );
    Ok((tasks, warnings))
}

/// Write a snapshot to a file.
///
/// The data goes to a `.tmp` sibling first and is then renamed over the
/// target, so an interrupted write leaves the previous snapshot intact.
pub async fn save_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    let mut json = serde_json::to_string_pretty(tasks)?;
    json.push('\n');

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = Path::new(&temp);

    fs::write(temp, json).await?;
    fs::rename(temp, path).await?;
    tracing::debug!(path = %path.display(), tasks = tasks.len(), "Saved task snapshot");
    Ok(())
}
