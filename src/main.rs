use anyhow::{bail, Context, Result};
use clap::Parser;

use panel_stack::cli::{CliArgs, Command};
use panel_stack::config::PanelConfig;
use panel_stack::config_paths::ConfigPaths;

fn main() -> Result<()> {
    let logs_dir = ConfigPaths::discover().and_then(|paths| match paths.ensure_logs_dir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {}", e);
            None
        }
    });
    let _log_guard = panel_stack::tracing::init(logs_dir.as_deref());

    let args = CliArgs::parse();
    let config = args.resolve_config();

    match &args.command {
        Command::Templates { .. } => {
            let table = config
                .load_templates()
                .context("Failed to load templates")?;
            if table.is_empty() {
                eprintln!("No templates found");
            }
            for name in table.names() {
                let path = table
                    .get(name)
                    .and_then(|t| t.path.as_ref())
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}\t{}", name, path);
            }
        }
        Command::Config => {
            print!("{}", config.to_yaml()?);
        }
        Command::Init { force } => {
            let Some(path) = args.config_path() else {
                bail!("No config directory available; pass --config");
            };
            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            PanelConfig::default()
                .save_to(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
