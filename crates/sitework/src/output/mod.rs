//! Output formatting for CLI commands.
//!
//! Every view renders either human-readable text or JSON for programmatic
//! use. The `write_*` functions take any writer so they can be tested;
//! [`print_message`] and [`to_stdout`] write to stdout.

pub mod color;

use crate::domain::{Task, TaskId};
use crate::graph::{Readiness, TaskRelations, TreeEntry};
use crate::loader::LoadWarning;
use serde::Serialize;
use serde_json::json;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};

use color::{bold, colorize_id, colorize_priority, colorize_status, dimmed, status_icon};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Configuration for text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an OutputConfig with explicit values.
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `SITEWORK_ASCII`: Set to "1" or "true" for ASCII-only icons (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `SITEWORK_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        let use_ascii = match env::var("SITEWORK_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "SITEWORK_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("SITEWORK_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Everything the `deps` command shows about one task.
#[derive(Debug, Clone)]
pub struct TaskDetails<'a> {
    /// The task
    pub task: &'a Task,
    /// Direct prerequisites and dependents
    pub relations: TaskRelations<'a>,
    /// Strict one-hop readiness
    pub can_start: bool,
    /// Readiness report including overrides
    pub readiness: Readiness,
    /// Whether the task shows the blocked indicator
    pub blocked: bool,
}

/// A blocked task and the prerequisites it waits on.
pub type BlockedRow<'a> = (&'a Task, Vec<&'a Task>);

fn summary(task: &Task) -> serde_json::Value {
    json!({
        "id": task.id,
        "title": task.title,
        "status": task.status,
    })
}

fn task_line(task: &Task, blocked: bool, config: &OutputConfig) -> String {
    format!(
        "{} {}  {}  {}  {}",
        status_icon(task.status, blocked, config),
        colorize_id(&task.id.to_string(), config),
        colorize_status(task.status, config),
        colorize_priority(task.priority, config),
        task.title
    )
}

fn id_list(ids: &[TaskId], config: &OutputConfig) -> String {
    ids.iter()
        .map(|id| colorize_id(&id.to_string(), config))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Writers
// ============================================================================

/// Render a task with its dependencies and readiness.
pub fn write_task_details<W: Write>(
    w: &mut W,
    details: &TaskDetails<'_>,
    mode: OutputMode,
    config: &OutputConfig,
) -> io::Result<()> {
    if mode == OutputMode::Json {
        return write_json(
            w,
            &json!({
                "task": summary(details.task),
                "dependencies": details.relations.dependencies.iter().map(|t| summary(t)).collect::<Vec<_>>(),
                "dependents": details.relations.dependents.iter().map(|t| summary(t)).collect::<Vec<_>>(),
                "can_start": details.can_start,
                "readiness": details.readiness,
                "blocked": details.blocked,
            }),
        );
    }

    writeln!(w, "{}", task_line(details.task, details.blocked, config))?;

    if !details.relations.dependencies.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", bold("Depends on:", config))?;
        for dep in &details.relations.dependencies {
            writeln!(w, "  {}", task_line(dep, false, config))?;
        }
    }

    if !details.relations.dependents.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", bold("Required by:", config))?;
        for dep in &details.relations.dependents {
            writeln!(w, "  {}", task_line(dep, false, config))?;
        }
    }

    writeln!(w)?;
    let verdict = match &details.readiness {
        Readiness::Ready => success("Ready to start", config),
        Readiness::Waiting { on } => format!(
            "{} {}",
            warning("Waiting for dependencies:", config),
            id_list(on, config)
        ),
        Readiness::Override { waiting_on } => format!(
            "{} {}",
            warning("May start without dependencies, still waiting on:", config),
            id_list(waiting_on, config)
        ),
    };
    writeln!(w, "{verdict}")
}

/// Render a list of startable tasks.
pub fn write_ready<W: Write>(
    w: &mut W,
    tasks: &[&Task],
    mode: OutputMode,
    config: &OutputConfig,
) -> io::Result<()> {
    if mode == OutputMode::Json {
        let rows: Vec<_> = tasks.iter().map(|t| summary(t)).collect();
        return write_json(w, &rows);
    }

    if tasks.is_empty() {
        return writeln!(w, "No tasks ready to start.");
    }

    writeln!(w, "{} task(s) ready to start:", tasks.len())?;
    writeln!(w)?;
    for task in tasks {
        writeln!(w, "{}", task_line(task, false, config))?;
    }
    Ok(())
}

/// Render blocked tasks with what they wait on.
pub fn write_blocked<W: Write>(
    w: &mut W,
    blocked: &[BlockedRow<'_>],
    mode: OutputMode,
    config: &OutputConfig,
) -> io::Result<()> {
    if mode == OutputMode::Json {
        let rows: Vec<_> = blocked
            .iter()
            .map(|(task, waiting)| {
                json!({
                    "task": summary(task),
                    "waiting_on": waiting.iter().map(|t| summary(t)).collect::<Vec<_>>(),
                })
            })
            .collect();
        return write_json(w, &rows);
    }

    if blocked.is_empty() {
        return writeln!(w, "No blocked tasks found.");
    }

    writeln!(w, "Found {} blocked task(s):", blocked.len())?;
    writeln!(w)?;
    for (task, waiting) in blocked {
        writeln!(w, "{}", task_line(task, true, config))?;
        let waiting_on: Vec<String> = waiting
            .iter()
            .map(|t| {
                format!(
                    "{} ({})",
                    colorize_id(&t.id.to_string(), config),
                    colorize_status(t.status, config)
                )
            })
            .collect();
        writeln!(
            w,
            "  {} {}",
            dimmed("Waiting on:", config),
            waiting_on.join(", ")
        )?;
    }
    Ok(())
}

/// Render a transitive dependency tree.
///
/// `lookup` resolves ids to tasks for titles and statuses.
pub fn write_tree<'a, W, F>(
    w: &mut W,
    root: &Task,
    entries: &[TreeEntry],
    lookup: F,
    mode: OutputMode,
    config: &OutputConfig,
) -> io::Result<()>
where
    W: Write,
    F: Fn(TaskId) -> Option<&'a Task>,
{
    if mode == OutputMode::Json {
        return write_json(w, &json!({ "root": summary(root), "entries": entries }));
    }

    writeln!(w, "{}", task_line(root, false, config))?;
    write_tree_children(w, root.id, entries, &lookup, &mut String::new(), config)
}

fn write_tree_children<'a, W, F>(
    w: &mut W,
    parent: TaskId,
    entries: &[TreeEntry],
    lookup: &F,
    prefix: &mut String,
    config: &OutputConfig,
) -> io::Result<()>
where
    W: Write,
    F: Fn(TaskId) -> Option<&'a Task>,
{
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    let children: Vec<&TreeEntry> = entries.iter().filter(|e| e.parent == parent).collect();
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let connector = if is_last { corner } else { branch };
        let label = match lookup(child.id) {
            Some(task) => task_line(task, false, config),
            None => colorize_id(&child.id.to_string(), config),
        };
        writeln!(w, "{}{}{}", dimmed(prefix, config), dimmed(connector, config), label)?;

        let len = prefix.len();
        prefix.push_str(if is_last { space } else { pipe });
        write_tree_children(w, child.id, entries, lookup, prefix, config)?;
        prefix.truncate(len);
    }
    Ok(())
}

/// Render detected dependency cycles.
pub fn write_cycles<W: Write>(
    w: &mut W,
    cycles: &[Vec<TaskId>],
    mode: OutputMode,
    config: &OutputConfig,
) -> io::Result<()> {
    if mode == OutputMode::Json {
        return write_json(w, &cycles);
    }

    if cycles.is_empty() {
        return writeln!(w, "{}", success("No dependency cycles.", config));
    }

    writeln!(w, "{}", error(&format!("Found {} dependency cycle(s):", cycles.len()), config))?;
    for cycle in cycles {
        writeln!(w, "  {}", id_list(cycle, config))?;
    }
    Ok(())
}

/// Render load warnings.
pub fn write_warnings<W: Write>(
    w: &mut W,
    warnings: &[LoadWarning],
    mode: OutputMode,
    config: &OutputConfig,
) -> io::Result<()> {
    if mode == OutputMode::Json {
        let rows: Vec<String> = warnings.iter().map(ToString::to_string).collect();
        return write_json(w, &rows);
    }

    if warnings.is_empty() {
        return writeln!(w, "{}", success("No problems found.", config));
    }

    writeln!(w, "{} problem(s) found:", warnings.len())?;
    for item in warnings {
        writeln!(w, "  {} {}", warning("!", config), item)?;
    }
    Ok(())
}

/// Write any serializable value as pretty JSON.
pub fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(w, "{}", json)
}

// ============================================================================
// Stdout wrappers
// ============================================================================

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", msg)
}

/// Run a writer against locked stdout with the environment's output config.
pub fn to_stdout<F>(render: F) -> io::Result<()>
where
    F: FnOnce(&mut io::StdoutLock<'_>, &OutputConfig) -> io::Result<()>,
{
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();
    render(&mut handle, &config)
}
