//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands. Read-only
//! commands render from the loaded board; mutating commands apply the change
//! through the board, report what it published, and write the snapshot back.

use anyhow::Result;
use serde_json::json;
use std::sync::{Arc, Mutex};

use super::args::{DepsArgs, LinkArgs, ReadyArgs, StatusArgs, TreeArgs};
use crate::app::App;
use crate::board::{BoardEvent, TaskBoard};
use crate::domain::{Task, TaskId, TaskStatus};
use crate::error::Error;
use crate::graph::{self, ReadinessMode};
use crate::output::{self, OutputMode, TaskDetails};

fn require_task(board: &TaskBoard, id: TaskId) -> Result<&Task> {
    Ok(board.get(id).ok_or(Error::TaskNotFound(id))?)
}

/// Collects the tasks a mutation unblocked, in publish order.
fn watch_unblocked(board: &TaskBoard) -> (Arc<Mutex<Vec<TaskId>>>, crate::events::Subscription) {
    let unblocked = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&unblocked);
    let subscription = board.subscribe(move |event| {
        if let BoardEvent::Unblocked { task } = event {
            if let Ok(mut ids) = sink.lock() {
                ids.push(*task);
            }
        }
    });
    (unblocked, subscription)
}

fn take_ids(ids: &Mutex<Vec<TaskId>>) -> Vec<TaskId> {
    ids.lock().map(|mut v| std::mem::take(&mut *v)).unwrap_or_default()
}

fn print_unblocked(board: &TaskBoard, ids: &[TaskId]) -> Result<()> {
    for &id in ids {
        let title = board.get(id).map_or("", |t| t.title.as_str());
        output::print_message(&format!("Unblocked: {id} {title}"))?;
    }
    Ok(())
}

/// Execute the deps command
pub fn execute_deps(app: &App, args: &DepsArgs, output_mode: OutputMode) -> Result<()> {
    let board = app.board();
    let task = require_task(board, args.task)?;

    let details = TaskDetails {
        task,
        relations: board.relations(args.task),
        can_start: board.can_start(args.task),
        readiness: board.readiness(args.task),
        blocked: graph::is_blocked(args.task, board.tasks()),
    };

    output::to_stdout(|w, config| output::write_task_details(w, &details, output_mode, config))?;
    Ok(())
}

/// Execute the ready command
pub fn execute_ready(app: &App, args: &ReadyArgs, output_mode: OutputMode) -> Result<()> {
    let board = app.board();
    let mode = if args.transitive {
        ReadinessMode::Transitive
    } else {
        app.config().readiness
    };
    let max_depth = args.depth.unwrap_or(app.config().max_depth);

    let ready: Vec<&Task> = board
        .index()
        .ready_tasks(mode, max_depth)
        .into_iter()
        .filter_map(|id| board.get(id))
        .collect();

    output::to_stdout(|w, config| output::write_ready(w, &ready, output_mode, config))?;
    Ok(())
}

/// Execute the blocked command
pub fn execute_blocked(app: &App, output_mode: OutputMode) -> Result<()> {
    let board = app.board();
    let rows: Vec<output::BlockedRow<'_>> = board
        .index()
        .blocked_tasks()
        .into_iter()
        .filter_map(|(id, waiting)| {
            let task = board.get(id)?;
            let waiting = waiting.into_iter().filter_map(|dep| board.get(dep)).collect();
            Some((task, waiting))
        })
        .collect();

    output::to_stdout(|w, config| output::write_blocked(w, &rows, output_mode, config))?;
    Ok(())
}

/// Execute the link command
pub async fn execute_link(app: &mut App, args: &LinkArgs, output_mode: OutputMode) -> Result<()> {
    if app.board().get(args.dependency).is_none() {
        tracing::warn!(dependency = %args.dependency, "Dependency is not in the snapshot");
    }

    let changed = app.board_mut().add_dependency(args.task, args.dependency)?;
    if changed {
        app.save().await?;
    }

    match output_mode {
        OutputMode::Json => output::to_stdout(|w, _| {
            output::write_json(
                w,
                &json!({
                    "task": args.task,
                    "dependency": args.dependency,
                    "changed": changed,
                }),
            )
        })?,
        OutputMode::Text if changed => output::print_message(&format!(
            "Added dependency: {} now depends on {}",
            args.task, args.dependency
        ))?,
        OutputMode::Text => output::print_message(&format!(
            "{} already depends on {}",
            args.task, args.dependency
        ))?,
    }
    Ok(())
}

/// Execute the unlink command
pub async fn execute_unlink(
    app: &mut App,
    args: &LinkArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let (unblocked, subscription) = watch_unblocked(app.board());
    let changed = app.board_mut().remove_dependency(args.task, args.dependency)?;
    subscription.cancel();
    let unblocked = take_ids(&unblocked);

    if changed {
        app.save().await?;
    }

    match output_mode {
        OutputMode::Json => output::to_stdout(|w, _| {
            output::write_json(
                w,
                &json!({
                    "task": args.task,
                    "dependency": args.dependency,
                    "changed": changed,
                    "unblocked": unblocked,
                }),
            )
        })?,
        OutputMode::Text => {
            if changed {
                output::print_message(&format!(
                    "Removed dependency: {} no longer depends on {}",
                    args.task, args.dependency
                ))?;
            } else {
                output::print_message(&format!(
                    "{} does not depend on {}",
                    args.task, args.dependency
                ))?;
            }
            print_unblocked(app.board(), &unblocked)?;
        }
    }
    Ok(())
}

/// Execute the status command
pub async fn execute_status(
    app: &mut App,
    args: &StatusArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let status: TaskStatus = args.status.into();
    let previous = require_task(app.board(), args.task)?.status;

    let (unblocked, subscription) = watch_unblocked(app.board());
    app.board_mut().set_status(args.task, status)?;
    subscription.cancel();
    let unblocked = take_ids(&unblocked);

    let changed = previous != status;
    if changed {
        app.save().await?;
    }

    match output_mode {
        OutputMode::Json => output::to_stdout(|w, _| {
            output::write_json(
                w,
                &json!({
                    "task": args.task,
                    "from": previous,
                    "to": status,
                    "unblocked": unblocked,
                }),
            )
        })?,
        OutputMode::Text => {
            if changed {
                output::print_message(&format!("{}: {previous} -> {status}", args.task))?;
            } else {
                output::print_message(&format!("{} is already {status}", args.task))?;
            }
            print_unblocked(app.board(), &unblocked)?;
        }
    }
    Ok(())
}

/// Execute the tree command
pub fn execute_tree(app: &App, args: &TreeArgs, output_mode: OutputMode) -> Result<()> {
    let board = app.board();
    let root = require_task(board, args.task)?;
    let depth = args.depth.unwrap_or(app.config().max_depth);
    let entries = board.index().dependency_tree(args.task, Some(depth));

    output::to_stdout(|w, config| {
        output::write_tree(w, root, &entries, |id| board.get(id), output_mode, config)
    })?;
    Ok(())
}

/// Execute the cycles command
pub fn execute_cycles(app: &App, output_mode: OutputMode) -> Result<()> {
    let cycles = app.board().index().find_cycles();
    output::to_stdout(|w, config| output::write_cycles(w, &cycles, output_mode, config))?;
    Ok(())
}

/// Execute the check command
pub fn execute_check(app: &App, output_mode: OutputMode) -> Result<()> {
    output::to_stdout(|w, config| {
        output::write_warnings(w, app.warnings(), output_mode, config)
    })?;
    Ok(())
}
