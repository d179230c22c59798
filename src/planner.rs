use std::path::Path;

use crate::directory::{DirectoryDescriptor, EncryptionMode};
use crate::error::Result;
use crate::job::SyncJob;
use crate::matching::MatchedPairs;
use crate::path::SyncPath;
use crate::security::check_security;
use crate::tools::FileSystem;

/// Ordered job list plus non-fatal findings
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub jobs: Vec<SyncJob>,
    pub warnings: Vec<String>,
}

/// Build the synchronization jobs for every matched pair.
///
/// Each pair yields one primary job. When the destination is untrusted, every
/// sensitive sub-path of the source becomes an extra, always-encrypted job and
/// is excluded from the primary one. Jobs keep pair order with the primary
/// job first.
pub fn build_sync_jobs(
    matched: &MatchedPairs,
    destination_trusted: bool,
    fs: &dyn FileSystem,
) -> Result<Plan> {
    let mut plan = Plan::default();

    for (source, destination) in &matched.pairs {
        for missing in source.missing_excludes(fs) {
            let warning = format!("Exclude directory {missing} does not exist.");
            log::warn!("{warning}");
            plan.warnings.push(warning);
        }

        let has_sensitive = !source.sensitive_subpaths().is_empty();
        let split_sensitive = !destination_trusted && has_sensitive;

        if destination_trusted && has_sensitive {
            log::debug!(
                "Sensitive sub-directories of {} travel with the primary job and are decrypted at the trusted destination.",
                source.root()
            );
        }

        let action = check_security(source, destination_trusted)?;

        plan.jobs.push(SyncJob {
            source: source.root().clone(),
            destination: destination.root().clone(),
            encrypt: action.encrypt,
            decrypt: action.decrypt,
            destination_trusted,
            excludes: source.exclude_patterns(split_sensitive),
            encryption_mode: source.encryption_mode(),
            endpoint: destination
                .endpoint()
                .or_else(|| source.endpoint())
                .cloned(),
        });

        if split_sensitive {
            for sensitive in source.sensitive_subpaths() {
                plan.jobs.push(sensitive_job(source, destination, sensitive));
            }
        }
    }

    log::debug!("Created {} synchronization job(s).", plan.jobs.len());
    Ok(plan)
}

/// Dedicated encrypted job for one sensitive sub-path.
///
/// Per-file ciphertexts land where the plaintext files would have; a
/// directory archive lands next to where the directory would have been.
fn sensitive_job(
    source: &DirectoryDescriptor,
    destination: &DirectoryDescriptor,
    sensitive: &SyncPath,
) -> SyncJob {
    let relative = sensitive.sub_path();
    let destination_sub = match source.encryption_mode() {
        EncryptionMode::PerFile => relative.to_path_buf(),
        EncryptionMode::DirectoryArchive => relative
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .to_path_buf(),
    };

    SyncJob {
        source: sensitive.clone(),
        destination: destination.root().with_sub_path(destination_sub),
        encrypt: true,
        decrypt: false,
        destination_trusted: false,
        excludes: Vec::new(),
        encryption_mode: source.encryption_mode(),
        endpoint: destination.endpoint().or_else(|| source.endpoint()).cloned(),
    }
}
