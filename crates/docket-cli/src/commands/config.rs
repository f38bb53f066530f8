//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::{Path, PathBuf};

/// Execute the config command.
pub fn execute_config(args: ConfigArgs, config: &Config, path: Option<&Path>, formatter: &Formatter) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init { force } => {
            let target = match path {
                Some(path) => path.to_path_buf(),
                None => Config::default_path()?,
            };
            init_config(&target, force)?;
            println!("{}", formatter.success(&format!("Wrote {}", target.display())));
        }
    }
    Ok(())
}

/// Write the default configuration to `path`.
pub fn init_config(path: &Path, force: bool) -> Result<PathBuf> {
    if path.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists; use --force to overwrite",
            path.display()
        )));
    }
    Config::default().save_to(path)?;
    Ok(path.to_path_buf())
}
