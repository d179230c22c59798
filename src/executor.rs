use colored::Colorize;
use serde::Serialize;

use crate::error::{Result, SyncError};
use crate::job::SyncJob;
use crate::path::SyncPath;
use crate::security::CIPHERTEXT_SUFFIX;
use crate::sync::RunOptions;
use crate::tools::{Decryptor, Encryptor, FileSystem, Transfer, TransferRequest};

/// Outcome of executing a job list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub errors: usize,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }
}

/// Runs jobs one after another against the external collaborators.
///
/// A failing stage skips the rest of its job and counts one error; the
/// remaining jobs still run.
pub struct JobExecutor<'a> {
    fs: &'a dyn FileSystem,
    encryptor: Option<&'a dyn Encryptor>,
    decryptor: &'a dyn Decryptor,
    transfer: &'a dyn Transfer,
    options: &'a RunOptions,
}

impl<'a> JobExecutor<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        encryptor: Option<&'a dyn Encryptor>,
        decryptor: &'a dyn Decryptor,
        transfer: &'a dyn Transfer,
        options: &'a RunOptions,
    ) -> Self {
        JobExecutor {
            fs,
            encryptor,
            decryptor,
            transfer,
            options,
        }
    }

    pub fn execute(&self, jobs: &[SyncJob]) -> RunReport {
        let mut report = RunReport::default();
        let total = jobs.len();

        for (idx, job) in jobs.iter().enumerate() {
            println!(
                "\n{} {}",
                format!("[{}/{}]", idx + 1, total).cyan().bold(),
                job.describe()
            );

            report.attempted += 1;
            let errors = self.run_job(job);
            if errors == 0 {
                report.succeeded += 1;
                println!("  {} Job finished", "✓".green());
            } else {
                println!("  {} Job finished with {} error(s)", "✗".red(), errors);
            }
            report.errors += errors;
        }

        report
    }

    /// Run every stage of one job and return the number of errors.
    fn run_job(&self, job: &SyncJob) -> usize {
        if let Err(e) = self.ensure_destination(job) {
            log::error!("Failed to create destination directory \"{}\": {e}", job.destination);
            return 1;
        }

        let source_is_file = !job.encrypt && self.fs.is_file(&job.source);

        let source = match self.prepare_source(job, source_is_file) {
            Ok(source) => source,
            Err(e) => {
                log::error!("Encryption of \"{}\" failed: {e}", job.source);
                return 1;
            }
        };

        let request = TransferRequest {
            source,
            destination: job.destination.render_with_trailing_slash(),
            excludes: &job.excludes,
            dry_run: self.options.dry_run,
            delete_extraneous: self.options.delete_extraneous,
            endpoint: job.endpoint.as_ref(),
        };

        if let Err(e) = self.transfer.transfer(&request) {
            log::error!("Transfer failed for current job: {e}");
            return 1;
        }

        self.decrypt_destination(job, job.decrypt && !source_is_file)
    }

    fn ensure_destination(&self, job: &SyncJob) -> Result<()> {
        if self.options.dry_run {
            log::debug!("Dry run: not creating {}", job.destination);
            return Ok(());
        }
        self.fs.create_dir(&job.destination)
    }

    /// Rendered transfer source, encrypting first when the job asks for it.
    ///
    /// Directories get a trailing slash so their contents are copied rather
    /// than the directory itself; single files (plain or an encrypted
    /// archive) do not.
    fn prepare_source(&self, job: &SyncJob, source_is_file: bool) -> Result<String> {
        if !job.encrypt {
            return Ok(render_source(&job.source, !source_is_file));
        }

        let encryptor = self.encryptor.ok_or_else(|| {
            SyncError::config("encryption requested but no gpg recipient/tmp_dir configured")
        })?;
        let encrypted = encryptor.encrypt(job)?;
        Ok(render_source(&encrypted.path, !encrypted.is_archive))
    }

    /// Decrypt every ciphertext that arrived at a trusted destination, local
    /// or remote.
    fn decrypt_destination(&self, job: &SyncJob, strip_top_level: bool) -> usize {
        if !job.destination_trusted || self.options.dry_run {
            return 0;
        }

        let ciphertexts = match self.fs.list_matching(&job.destination, CIPHERTEXT_SUFFIX) {
            Ok(found) => found,
            Err(e) => {
                log::error!("Failed to scan {} for ciphertexts: {e}", job.destination);
                return 1;
            }
        };

        let mut errors = 0;
        for found in ciphertexts {
            let ciphertext = job.destination.on_same_host(found);
            if let Err(e) = self.decryptor.decrypt(&ciphertext, strip_top_level) {
                log::error!("Failed to decrypt \"{ciphertext}\": {e}");
                errors += 1;
            }
        }
        errors
    }
}

fn render_source(path: &SyncPath, trailing_slash: bool) -> String {
    if trailing_slash {
        path.render_with_trailing_slash()
    } else {
        path.render()
    }
}
