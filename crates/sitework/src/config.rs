//! Configuration management for sitework.
//!
//! Configuration lives in a YAML file (`sitework.yaml` by default). Every key
//! is optional; a missing file yields the defaults.
//!
//! ```yaml
//! tasks-file: data/tasks.json
//! readiness: transitive
//! max-depth: 20
//! reject-cycles: true
//! ```

use crate::error::{Error, Result};
use crate::graph::{MAX_TRAVERSAL_DEPTH, ReadinessMode};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "sitework.yaml";

/// Default task snapshot file
pub const DEFAULT_TASKS_FILE: &str = "tasks.json";

/// Configuration file structure for sitework
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SiteworkConfig {
    /// Path to the task snapshot, relative to the working directory
    pub tasks_file: PathBuf,

    /// Readiness used by the `ready` listing
    pub readiness: ReadinessMode,

    /// Depth limit for transitive traversals
    pub max_depth: usize,

    /// Refuse `link` edges that would close a cycle
    pub reject_cycles: bool,
}

impl Default for SiteworkConfig {
    fn default() -> Self {
        Self {
            tasks_file: PathBuf::from(DEFAULT_TASKS_FILE),
            readiness: ReadinessMode::Direct,
            max_depth: MAX_TRAVERSAL_DEPTH,
            reject_cycles: false,
        }
    }
}

impl SiteworkConfig {
    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a file, falling back to defaults if it does not exist.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path).await {
            Ok(content) => Self::from_yaml(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {}", e)))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::Config("max-depth must be at least 1".to_string()));
        }
        if self.tasks_file.as_os_str().is_empty() {
            return Err(Error::Config("tasks-file cannot be empty".to_string()));
        }
        Ok(())
    }
}
