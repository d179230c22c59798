//! Command handler modules
//!
//! One module per CLI subcommand, plus the configuration and location
//! lookups they share.

pub mod check;
pub mod locations;
pub mod plan;
pub mod sync;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use inquire::Select;
use std::path::{Path, PathBuf};

use crate::config::{ConfigManager, SyncConfig};
use crate::pick::LocationArg;
use crate::selection;

pub use check::handle_check;
pub use locations::handle_locations;
pub use plan::{handle_plan, PlanFormat};
pub use sync::handle_sync;

/// Load the configuration from `--config` or the first default location.
pub fn load_config(config_path: Option<&Path>) -> Result<(PathBuf, SyncConfig)> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => ConfigManager::find_config_file()?,
    };

    let config = SyncConfig::load(&path)?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok((path, config))
}

/// Use the location given on the command line or let the operator pick one.
///
/// `other` is the location already chosen for the opposite side and is not
/// offered again.
pub fn resolve_location(
    arg: Option<LocationArg>,
    config: &SyncConfig,
    role: &str,
    other: Option<&str>,
) -> Result<LocationArg> {
    if let Some(arg) = arg {
        return Ok(arg);
    }

    if !selection::is_interactive() {
        bail!("No {role} location given and no terminal to ask for one");
    }

    let options: Vec<String> = config
        .location_names()
        .into_iter()
        .filter(|name| Some(*name) != other)
        .map(str::to_string)
        .collect();

    if options.is_empty() {
        bail!("No {role} location available in the configuration");
    }

    let location = Select::new(&format!("Select {role} location:"), options)
        .with_help_message("Use arrow keys to navigate, Enter to select")
        .prompt()
        .with_context(|| format!("Failed to select {role} location"))?;

    println!("  {} {} {}", "✓".green(), role, location.bold());
    Ok(LocationArg {
        location,
        path: None,
    })
}
