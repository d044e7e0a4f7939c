//! Template table
//!
//! Maps a view type name to the blueprint the visual host instantiates. The
//! table is filled once before the panel manager is initialized and is only
//! read afterwards.
//!
//! Sources:
//! - a templates directory, where every file becomes a template named after
//!   its file stem (`InventoryPanel.yaml` → `InventoryPanel`)
//! - a manifest file (YAML or JSON, chosen by extension) listing names and
//!   optional paths and child element names

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PanelError, Result};

/// A named instantiation blueprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// View type this template belongs to
    pub name: String,
    /// Asset backing the template, if it came from disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Named child elements views can look up inside their visual
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl Template {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            children: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }
}

/// On-disk manifest format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateManifest {
    #[serde(default)]
    pub templates: Vec<Template>,
}

/// View type → template lookup
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    entries: HashMap<String, Template>,
}

impl TemplateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template; names must be unique
    pub fn insert(&mut self, template: Template) -> Result<()> {
        if self.entries.contains_key(&template.name) {
            return Err(PanelError::DuplicateTemplate {
                name: template.name,
            });
        }
        self.entries.insert(template.name.clone(), template);
        Ok(())
    }

    /// Builder-style registration for tables assembled in code
    pub fn with(mut self, template: Template) -> Result<Self> {
        self.insert(template)?;
        Ok(self)
    }

    /// Build a table from every file in `dir` (non-recursive)
    ///
    /// Hidden files and subdirectories are skipped.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let read_err = |source| PanelError::TemplateSource {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(read_err)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| !n.starts_with('.'))
                    .unwrap_or(false)
            })
            .collect();
        // Directory order is platform dependent; keep duplicate reporting stable
        paths.sort();

        let mut table = Self::new();
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!("Skipping template with non UTF-8 name: {}", path.display());
                continue;
            };
            let template = Template::new(name).with_path(&path);
            table.insert(template)?;
        }

        tracing::info!(
            "Loaded {} templates from {}",
            table.len(),
            dir.display()
        );
        Ok(table)
    }

    /// Build a table from a YAML or JSON manifest
    ///
    /// Relative template paths are resolved against the manifest's directory.
    pub fn from_manifest(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| PanelError::TemplateSource {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let manifest: TemplateManifest = if is_json {
            serde_json::from_str(&content).map_err(|e| PanelError::Manifest {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| PanelError::Manifest {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let mut table = Self::new();
        for mut template in manifest.templates {
            if let Some(rel) = template.path.take() {
                template.path = Some(if rel.is_absolute() { rel } else { base.join(rel) });
            }
            table.insert(template)?;
        }

        tracing::info!("Loaded {} templates from {}", table.len(), path.display());
        Ok(table)
    }

    /// Look up the template for `view_type`
    pub fn resolve(&self, view_type: &str) -> Result<&Template> {
        self.entries
            .get(view_type)
            .ok_or_else(|| PanelError::TemplateNotFound {
                view_type: view_type.to_string(),
            })
    }

    pub fn get(&self, view_type: &str) -> Option<&Template> {
        self.entries.get(view_type)
    }

    pub fn contains(&self, view_type: &str) -> bool {
        self.entries.contains_key(view_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Template names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.entries.values()
    }
}
