//! Run orchestration: preprocess, match, plan, select, execute.

use std::fs;

use crate::config::{CryptoConfig, SyncConfig};
use crate::error::{Result, SyncError};
use crate::executor::{JobExecutor, RunReport};
use crate::job::SyncJob;
use crate::matching::{match_automatic, match_manual, DestinationChooser};
use crate::planner::{build_sync_jobs, Plan};
use crate::preprocess::{preprocess_location, Role};
use crate::selection::JobSelector;
use crate::tools::{Decryptor, Encryptor, FileSystem, GpgCipher, Transfer};

/// Switches for a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Pass `--dry-run` to the transfer and skip every local side effect
    pub dry_run: bool,
    /// Remove files at the destination that the source no longer has
    pub delete_extraneous: bool,
    /// Pair directories interactively instead of by position
    pub manual_matching: bool,
    pub encrypt_on_pick: bool,
    /// Skip job review and confirmation
    pub assume_yes: bool,
}

/// The external side of a run
pub struct Collaborators<'a> {
    pub fs: &'a dyn FileSystem,
    pub encryptor: Option<&'a dyn Encryptor>,
    pub decryptor: &'a dyn Decryptor,
    pub transfer: &'a dyn Transfer,
}

/// Plan the jobs for `source` -> `destination` without executing anything.
///
/// Warnings from every stage are collected in the returned plan. A plan
/// with encrypting jobs is only returned when the crypto settings are
/// usable.
pub fn plan_locations(
    config: &SyncConfig,
    source: &str,
    destination: &str,
    options: &RunOptions,
    fs: &dyn FileSystem,
    chooser: &mut dyn DestinationChooser,
) -> Result<Plan> {
    let src_location = config.location(source)?;
    let dst_location = config.location(destination)?;

    if source == destination {
        return Err(SyncError::config(
            "source and destination location must not be equal",
        ));
    }

    let sources = preprocess_location(source, src_location, Role::Source, fs)?;
    let destinations = preprocess_location(destination, dst_location, Role::Destination, fs)?;

    let matched = if options.manual_matching {
        match_manual(&sources.descriptors, &destinations.descriptors, chooser)?
    } else {
        match_automatic(&sources.descriptors, &destinations.descriptors)?
    };

    let mut plan = build_sync_jobs(&matched, dst_location.trusted, fs)?;

    let mut warnings = sources.warnings;
    warnings.extend(destinations.warnings);
    warnings.extend(matched.warnings);
    warnings.append(&mut plan.warnings);
    plan.warnings = warnings;

    validate_crypto(&config.gpg, &plan.jobs)?;

    Ok(plan)
}

/// Fail with a configuration error when a job needs encryption but the
/// recipient or temporary directory is missing.
pub fn validate_crypto(crypto: &CryptoConfig, jobs: &[SyncJob]) -> Result<()> {
    if jobs.iter().any(|job| job.encrypt) {
        GpgCipher::new(crypto)?;
    }
    Ok(())
}

/// Synchronize two configured locations.
///
/// Nothing executes before every configuration and matching problem has
/// been reported. An empty plan or an aborted selection is a clean run with
/// zero jobs.
pub fn sync_locations(
    config: &SyncConfig,
    source: &str,
    destination: &str,
    options: &RunOptions,
    collaborators: &Collaborators<'_>,
    chooser: &mut dyn DestinationChooser,
    selector: &mut dyn JobSelector,
) -> Result<RunReport> {
    let plan = plan_locations(config, source, destination, options, collaborators.fs, chooser)?;

    if plan.jobs.is_empty() {
        log::info!("Nothing to synchronize!");
        return Ok(RunReport::default());
    }

    if collaborators.encryptor.is_none() && plan.jobs.iter().any(|job| job.encrypt) {
        return Err(SyncError::config(
            "encryption required but no encryptor available",
        ));
    }

    let selected = selector.select(&plan.jobs, options)?;
    if selected.is_empty() {
        log::info!("No jobs selected.");
        return Ok(RunReport::default());
    }

    let executor = JobExecutor::new(
        collaborators.fs,
        collaborators.encryptor,
        collaborators.decryptor,
        collaborators.transfer,
        options,
    );

    Ok(executor.execute(&selected))
}

/// Remove the temporary directory of a run. Failure is only a warning.
pub fn clean_up(crypto: &CryptoConfig) {
    let Some(tmp_dir) = crypto.tmp_dir.as_ref().filter(|dir| dir.exists()) else {
        return;
    };

    match fs::remove_dir_all(tmp_dir) {
        Ok(()) => log::debug!("Temporary directory {} removed.", tmp_dir.display()),
        Err(e) => log::warn!(
            "Failed to remove temporary directory {}: {e}",
            tmp_dir.display()
        ),
    }
}
