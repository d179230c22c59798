//! External tool layer.
//!
//! The planner and executor only talk to the traits defined here. The
//! concrete implementations drive the rsync, gpg, tar and ssh command line
//! tools; tests substitute in-memory fakes.

pub mod fs;
pub mod gpg;
pub mod rsync;
pub mod ssh;

use std::path::PathBuf;
use std::process::{Command, Output};

use crate::error::{Result, SyncError};
use crate::job::SyncJob;
use crate::path::{RemoteEndpoint, SyncPath};

pub use fs::SystemFileSystem;
pub use gpg::{GpgCipher, GpgDecipher};
pub use rsync::RsyncTransfer;

/// Binaries a run may shell out to
pub const REQUIRED_BINARIES: &[&str] = &["rsync", "ssh", "gpg", "tar"];

/// Existence checks and directory creation, local or remote.
pub trait FileSystem {
    fn exists(&self, path: &SyncPath) -> bool;

    fn is_dir(&self, path: &SyncPath) -> bool;

    fn is_file(&self, path: &SyncPath) -> bool;

    /// Create a directory and its parents (`mkdir -p`).
    fn create_dir(&self, path: &SyncPath) -> Result<()>;

    /// All files below `path` whose name ends with `suffix`.
    fn list_matching(&self, path: &SyncPath, suffix: &str) -> Result<Vec<PathBuf>>;
}

/// Ciphertext ready to be transferred in place of a job's source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedSource {
    pub path: SyncPath,
    /// A single archive file rather than a tree of per-file ciphertexts
    pub is_archive: bool,
}

/// Archiver and cipher used before an untrusted transfer.
pub trait Encryptor {
    fn encrypt(&self, job: &SyncJob) -> Result<EncryptedSource>;
}

/// Decipher used on a trusted destination.
pub trait Decryptor {
    /// Decrypt one ciphertext in place, extracting it if it is an archive.
    ///
    /// The ciphertext lives on the same side as the destination, so it may
    /// be remote.
    fn decrypt(&self, ciphertext: &SyncPath, strip_top_level: bool) -> Result<()>;
}

/// Everything the transfer tool needs for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest<'a> {
    pub source: String,
    pub destination: String,
    pub excludes: &'a [String],
    pub dry_run: bool,
    pub delete_extraneous: bool,
    pub endpoint: Option<&'a RemoteEndpoint>,
}

/// Mirrors a source into a destination.
pub trait Transfer {
    fn transfer(&self, request: &TransferRequest<'_>) -> Result<()>;
}

/// Binaries from [`REQUIRED_BINARIES`] that are not on the PATH
pub fn missing_binaries() -> Vec<&'static str> {
    REQUIRED_BINARIES
        .iter()
        .copied()
        .filter(|binary| which::which(binary).is_err())
        .collect()
}

/// Run a command with inherited stdio and fail on a non-zero exit.
pub(crate) fn run_status(command: &mut Command, tool: &str) -> Result<()> {
    log::debug!("{command:?}");

    let status = command
        .status()
        .map_err(|e| SyncError::tool(tool, format!("failed to start: {e}")))?;

    if !status.success() {
        return Err(SyncError::tool(tool, format!("exited with {status}")));
    }

    Ok(())
}

/// Run a command capturing its output and fail on a non-zero exit.
pub(crate) fn run_output(command: &mut Command, tool: &str) -> Result<Output> {
    log::debug!("{command:?}");

    let output = command
        .output()
        .map_err(|e| SyncError::tool(tool, format!("failed to start: {e}")))?;

    if !output.status.success() {
        return Err(SyncError::tool(
            tool,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(output)
}
