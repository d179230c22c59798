//! Check command handler

use anyhow::{bail, Result};
use colored::Colorize;

use crate::tools::{self, REQUIRED_BINARIES};

/// Handle check command
pub fn handle_check() -> Result<()> {
    let missing = tools::missing_binaries();

    for binary in REQUIRED_BINARIES {
        if missing.contains(binary) {
            println!("  {} {}", "✗".red(), binary);
        } else {
            println!("  {} {}", "✓".green(), binary);
        }
    }

    if !missing.is_empty() {
        bail!("Missing required tools: {}", missing.join(", "));
    }

    println!("\n{}", "All required tools are installed.".green());
    Ok(())
}
