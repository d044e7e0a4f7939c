//! Where panel-stack keeps its files
//!
//! ```text
//! <root>/config.yaml
//! <root>/templates/
//! <root>/logs/
//! ```
//!
//! `<root>` is `$XDG_CONFIG_HOME/panel-stack` when that variable holds an
//! absolute path, otherwise the platform config directory from `dirs`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PanelError, Result};

const APP_DIR: &str = "panel-stack";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    root: PathBuf,
}

impl ConfigPaths {
    /// Locate the per-user directory, if the platform has one
    pub fn discover() -> Option<Self> {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .filter(|dir| dir.is_absolute())
            .or_else(dirs::config_dir)
            .map(|base| Self::at(base.join(APP_DIR)))
    }

    /// Use `root` directly, e.g. a portable install or a test fixture
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Create the logs directory if needed and return it
    pub fn ensure_logs_dir(&self) -> Result<PathBuf> {
        let logs = self.logs_dir();
        fs::create_dir_all(&logs).map_err(|e| {
            PanelError::Config(format!(
                "Failed to create log directory {}: {}",
                logs.display(),
                e
            ))
        })?;
        Ok(logs)
    }
}
