//! Application context for CLI command execution.
//!
//! [`App`] resolves configuration, loads the task snapshot into a
//! [`TaskBoard`], and writes the snapshot back after mutating commands.
//!
//! # Example
//!
//! ```no_run
//! use sitework::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::load(Path::new("."), None, None).await?;
//!     println!("{} tasks", app.board().tasks().len());
//!     Ok(())
//! }
//! ```

use crate::board::TaskBoard;
use crate::config::{CONFIG_FILE_NAME, SiteworkConfig};
use crate::error::Result;
use crate::loader::{self, LoadWarning};
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
#[derive(Debug)]
pub struct App {
    config: SiteworkConfig,
    tasks_path: PathBuf,
    board: TaskBoard,
    warnings: Vec<LoadWarning>,
}

impl App {
    /// Load configuration and the task snapshot.
    ///
    /// # Arguments
    ///
    /// * `working_dir` - Directory relative paths are resolved against
    /// * `config_path` - Explicit config file; must exist when given.
    ///   Otherwise `sitework.yaml` in `working_dir` is used if present.
    /// * `tasks_file` - Overrides the configured snapshot path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicit configuration file cannot be read or is invalid
    /// - The snapshot cannot be read or parsed
    pub async fn load(
        working_dir: &Path,
        config_path: Option<&Path>,
        tasks_file: Option<&Path>,
    ) -> Result<Self> {
        let config = match config_path {
            Some(path) => SiteworkConfig::load(&working_dir.join(path)).await?,
            None => SiteworkConfig::load_or_default(&working_dir.join(CONFIG_FILE_NAME)).await?,
        };

        let tasks_path = working_dir.join(tasks_file.unwrap_or(config.tasks_file.as_path()));
        let (tasks, warnings) = loader::load_tasks(&tasks_path).await?;

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        let board = TaskBoard::new(tasks).with_cycle_rejection(config.reject_cycles);

        Ok(Self {
            config,
            tasks_path,
            board,
            warnings,
        })
    }

    /// The effective configuration.
    pub fn config(&self) -> &SiteworkConfig {
        &self.config
    }

    /// Path of the loaded snapshot.
    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }

    /// Warnings found while loading.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Get an immutable reference to the board.
    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    /// Get a mutable reference to the board.
    pub fn board_mut(&mut self) -> &mut TaskBoard {
        &mut self.board
    }

    /// Write the board back to the snapshot file.
    ///
    /// This should be called after any mutating operations.
    pub async fn save(&self) -> Result<()> {
        loader::save_tasks(&self.tasks_path, self.board.tasks()).await
    }
}
