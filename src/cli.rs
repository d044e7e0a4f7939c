//! Command-line argument parsing for the panel-stack tool
//!
//! Supports:
//! - Listing the templates a config resolves to
//! - Printing the effective configuration
//! - Writing a default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::PanelConfig;
use crate::config_paths::ConfigPaths;

/// Inspect panel templates and configuration
#[derive(Parser, Debug)]
#[command(name = "panel-stack", version, about = "Inspect panel templates and configuration")]
pub struct CliArgs {
    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List templates resolvable from the configured source
    Templates {
        /// Scan this directory instead of the configured one
        #[arg(long, value_name = "DIR", conflicts_with = "manifest")]
        dir: Option<PathBuf>,

        /// Read this manifest instead of the configured source
        #[arg(long, value_name = "PATH")]
        manifest: Option<PathBuf>,
    },
    /// Print the effective configuration as YAML
    Config,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl CliArgs {
    /// Config file path this invocation reads and writes
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config
            .clone()
            .or_else(|| ConfigPaths::discover().map(|paths| paths.config_file()))
    }

    /// Load the config, applying any template source overrides from the
    /// `templates` subcommand
    pub fn resolve_config(&self) -> PanelConfig {
        let mut config = match self.config_path() {
            Some(path) => PanelConfig::load_from(&path),
            None => PanelConfig::default(),
        };

        if let Command::Templates { dir, manifest } = &self.command {
            if let Some(dir) = dir {
                config.templates_dir = Some(dir.clone());
                config.manifest = None;
            }
            if let Some(manifest) = manifest {
                config.manifest = Some(manifest.clone());
            }
        }
        config
    }
}
