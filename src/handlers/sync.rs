//! Sync command handler
//!
//! Wires the real collaborators (rsync, gpg, ssh) into a run and prints the
//! outcome.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::executor::RunReport;
use crate::logger;
use crate::matching::InquireChooser;
use crate::pick::{apply_pick_mode, LocationArg};
use crate::selection::{self, InteractiveSelector, JobSelector, SelectAll};
use crate::sync::{clean_up, sync_locations, Collaborators, RunOptions};
use crate::tools::{self, Encryptor, GpgCipher, GpgDecipher, RsyncTransfer, SystemFileSystem};

use super::{load_config, resolve_location};

/// Handle sync command
pub fn handle_sync(
    config_path: Option<&Path>,
    source: Option<LocationArg>,
    destination: Option<LocationArg>,
    options: RunOptions,
) -> Result<RunReport> {
    let (path, config) = load_config(config_path)?;
    print_banner(&path);

    let missing = tools::missing_binaries();
    if !missing.is_empty() {
        bail!(
            "Missing required tools: {}. Please install them and try again.",
            missing.join(", ")
        );
    }

    if !options.assume_yes && !selection::is_interactive() {
        bail!("Not running in a terminal. Use --yes to run all planned jobs without confirmation.");
    }

    let source = resolve_location(source, &config, "source", None)?;
    let destination =
        resolve_location(destination, &config, "destination", Some(&source.location))?;

    let config = apply_pick_mode(&config, &source, &destination, options.encrypt_on_pick)?;

    let fs = SystemFileSystem;
    let cipher = GpgCipher::new(&config.gpg).ok();
    let decipher = GpgDecipher;
    let transfer = RsyncTransfer;

    let collaborators = Collaborators {
        fs: &fs,
        encryptor: cipher.as_ref().map(|c| c as &dyn Encryptor),
        decryptor: &decipher,
        transfer: &transfer,
    };

    let mut chooser = InquireChooser;
    let mut selector: Box<dyn JobSelector> = if options.assume_yes {
        Box::new(SelectAll)
    } else {
        Box::new(InteractiveSelector)
    };

    let result = sync_locations(
        &config,
        &source.location,
        &destination.location,
        &options,
        &collaborators,
        &mut chooser,
        selector.as_mut(),
    );

    // staged ciphertexts never outlive the run
    clean_up(&config.gpg);

    let report = result.context("Synchronization failed")?;
    logger::log_run_summary(&source.to_string(), &destination.to_string(), &report)?;
    print_summary(&report);

    Ok(report)
}

fn print_banner(config_path: &Path) {
    println!("{}", "SyncBuddy".cyan().bold());
    println!("{} {}\n", "Config:".dimmed(), config_path.display());
}

fn print_summary(report: &RunReport) {
    println!();
    if report.attempted == 0 {
        println!("{}", "Nothing was synchronized.".yellow());
    } else if report.is_success() {
        println!(
            "{} {} job(s) completed",
            "SUCCESS".green().bold(),
            report.succeeded
        );
    } else {
        println!(
            "{} {} of {} job(s) completed, {} error(s)",
            "FAILED".red().bold(),
            report.succeeded,
            report.attempted,
            report.errors
        );
    }
}
