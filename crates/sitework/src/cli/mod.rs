//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for sitework using clap's
//! derive API. Every command reads the task snapshot named by the
//! configuration (or `--file`); mutating commands write it back.
//!
//! # Commands
//!
//! - `deps`: Show a task's dependencies, dependents and readiness
//! - `ready`: List tasks that can start
//! - `blocked`: List tasks waiting on unfinished prerequisites
//! - `link`: Add a dependency
//! - `unlink`: Remove a dependency
//! - `status`: Record a status change
//! - `tree`: Show the transitive dependency tree of a task
//! - `cycles`: Report dependency cycles
//! - `check`: Report data-quality problems in the snapshot
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config`: Configuration file (default `sitework.yaml` if present)
//! - `--file`: Task snapshot, overriding the configured `tasks-file`
//!
//! # Example
//!
//! ```bash
//! sitework link 14 9
//! sitework ready --transitive
//! sitework --json deps 14
//! sitework status 9 completed
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{DepsArgs, LinkArgs, ReadyArgs, StatusArgs, TreeArgs};
pub use types::TaskStatusArg;

/// Sitework - task dependency tracking for construction projects
#[derive(Parser, Debug)]
#[command(name = "sitework")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Task snapshot file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a task's dependencies, dependents and readiness
    Deps(DepsArgs),

    /// List tasks that can start and are not completed
    Ready(ReadyArgs),

    /// List tasks waiting on unfinished prerequisites
    Blocked,

    /// Make a task depend on another
    Link(LinkArgs),

    /// Remove a dependency
    Unlink(LinkArgs),

    /// Record a task status change
    Status(StatusArgs),

    /// Show the transitive dependency tree of a task
    Tree(TreeArgs),

    /// Report dependency cycles
    Cycles,

    /// Report data-quality problems in the snapshot
    Check,
}

impl Cli {
    /// Parse CLI arguments from the environment
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let mut app = App::load(
            &std::env::current_dir()?,
            self.config.as_deref(),
            self.file.as_deref(),
        )
        .await?;

        match &self.command {
            Commands::Deps(args) => execute::execute_deps(&app, args, output_mode),
            Commands::Ready(args) => execute::execute_ready(&app, args, output_mode),
            Commands::Blocked => execute::execute_blocked(&app, output_mode),
            Commands::Link(args) => execute::execute_link(&mut app, args, output_mode).await,
            Commands::Unlink(args) => execute::execute_unlink(&mut app, args, output_mode).await,
            Commands::Status(args) => execute::execute_status(&mut app, args, output_mode).await,
            Commands::Tree(args) => execute::execute_tree(&app, args, output_mode),
            Commands::Cycles => execute::execute_cycles(&app, output_mode),
            Commands::Check => execute::execute_check(&app, output_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskId;
    use rstest::rstest;

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::try_parse_from(["sitework", "deps", "#4", "--json", "-f", "site.json"]).unwrap();

        assert!(cli.json);
        assert_eq!(cli.file, Some(PathBuf::from("site.json")));
        match cli.command {
            Commands::Deps(args) => assert_eq!(args.task, TaskId(4)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn link_takes_task_then_dependency() {
        let cli = Cli::try_parse_from(["sitework", "link", "2", "1"]).unwrap();
        match cli.command {
            Commands::Link(args) => {
                assert_eq!(args.task, TaskId(2));
                assert_eq!(args.dependency, TaskId(1));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn status_accepts_backend_spelling() {
        let cli = Cli::try_parse_from(["sitework", "status", "3", "in-progress"]).unwrap();
        match cli.command {
            Commands::Status(args) => assert_eq!(args.status, TaskStatusArg::InProgress),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[rstest]
    #[case(&["sitework"])]
    #[case(&["sitework", "deps"])]
    #[case(&["sitework", "deps", "abc"])]
    #[case(&["sitework", "link", "1"])]
    #[case(&["sitework", "tree", "1", "--depth", "0"])]
    #[case(&["sitework", "status", "1", "done"])]
    fn invalid_invocations_are_rejected(#[case] argv: &[&str]) {
        assert!(Cli::try_parse_from(argv.iter().copied()).is_err());
    }

    #[test]
    fn ready_defaults_to_configured_mode() {
        let cli = Cli::try_parse_from(["sitework", "ready"]).unwrap();
        match cli.command {
            Commands::Ready(args) => {
                assert!(!args.transitive);
                assert_eq!(args.depth, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
