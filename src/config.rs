//! Panel manager configuration persistence
//!
//! Stores settings in `~/.config/panel-stack/config.yaml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config_paths::ConfigPaths;
use crate::error::{PanelError, Result};
use crate::host::ContainerSpec;
use crate::template::TemplateTable;

/// Settings the panel manager is initialized from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Directory scanned for templates (one file per view type)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,

    /// Manifest listing templates; takes precedence over `templates_dir`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    /// Shared container panels are parented under
    #[serde(default)]
    pub container: ContainerSpec,
}

impl PanelConfig {
    /// Load config from the default location, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = ConfigPaths::discover().map(|paths| paths.config_file()) else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any failure
    ///
    /// Relative template paths are resolved against the config file's
    /// directory.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<Self>(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config.relative_to(path.parent().unwrap_or_else(|| Path::new("")))
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = ConfigPaths::discover()
            .map(|paths| paths.config_file())
            .ok_or_else(|| PanelError::Config("No config directory available".to_string()))?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PanelError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = self.to_yaml()?;

        std::fs::write(path, content).map_err(|e| {
            PanelError::Config(format!(
                "Failed to write config to {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        self.templates_dir = self.templates_dir.map(resolve);
        self.manifest = self.manifest.map(resolve);
        self
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| PanelError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Directory templates are read from when no manifest is set
    pub fn effective_templates_dir(&self) -> Option<PathBuf> {
        self.templates_dir
            .clone()
            .or_else(|| ConfigPaths::discover().map(|paths| paths.templates_dir()))
    }

    /// Build the template table this config points at
    ///
    /// An absent source yields an empty table.
    pub fn load_templates(&self) -> Result<TemplateTable> {
        if let Some(manifest) = &self.manifest {
            return TemplateTable::from_manifest(manifest);
        }
        match self.effective_templates_dir() {
            Some(dir) if dir.is_dir() => TemplateTable::from_dir(&dir),
            Some(dir) => {
                tracing::warn!("Templates directory {} does not exist", dir.display());
                Ok(TemplateTable::new())
            }
            None => Ok(TemplateTable::new()),
        }
    }
}
