//! Locations command handler

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::load_config;

/// Handle locations command
pub fn handle_locations(config_path: Option<&Path>) -> Result<()> {
    let (path, config) = load_config(config_path)?;

    println!("{}", "Configured Locations".cyan().bold());
    println!("{}", "=".repeat(80).cyan());
    println!("{} {}", "Config:".dimmed(), path.display());

    if config.locations.is_empty() {
        println!("\n{}", "No locations configured.".yellow());
        return Ok(());
    }

    for (name, location) in &config.locations {
        let trust = if location.trusted {
            "trusted".green()
        } else {
            "untrusted".red()
        };
        println!("\n{} ({})", name.bold(), trust);
        println!("   {} {}", "Root:".dimmed(), location.root_dir.display());

        if let Some(ssh) = &location.ssh {
            match ssh.endpoint() {
                Ok(endpoint) => println!("   {} {}", "SSH:".dimmed(), endpoint.ssh_target()),
                Err(e) => println!("   {} {}", "SSH:".dimmed(), e.to_string().red()),
            }
        }

        for dir in &location.dirs {
            let marker = if dir.sensitive {
                " (sensitive)".yellow().to_string()
            } else {
                String::new()
            };
            println!("   - {}{}", dir.path, marker);
        }
    }

    Ok(())
}
