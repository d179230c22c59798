//! Ad-hoc synchronization of a single path.
//!
//! `--src laptop:docs/report.pdf` replaces the configured directories of a
//! location with the one picked path for this run.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::{DirectoryConfig, SyncConfig};
use crate::error::{Result, SyncError};
use crate::security::CIPHERTEXT_SUFFIX;

/// `location[:path]` as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationArg {
    pub location: String,
    /// Path relative to the location's root
    pub path: Option<String>,
}

impl LocationArg {
    pub fn parse(raw: &str) -> Result<Self> {
        let (location, path) = match raw.split_once(':') {
            Some((location, path)) => (location.trim(), Some(path.trim())),
            None => (raw.trim(), None),
        };

        if location.is_empty() {
            return Err(SyncError::config(format!(
                "missing location name in \"{raw}\""
            )));
        }

        Ok(LocationArg {
            location: location.to_string(),
            path: path.filter(|p| !p.is_empty()).map(str::to_string),
        })
    }
}

impl FromStr for LocationArg {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for LocationArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}", self.location, path),
            None => write!(f, "{}", self.location),
        }
    }
}

/// Derive the configuration for a run with picked paths.
///
/// A picked path replaces every configured directory of its location. The
/// picked source location loses its trust. A picked ciphertext source going
/// into a directory is decrypted there, so both sides are marked sensitive.
/// `encrypt_on_pick` only applies with a picked destination: the destination
/// becomes untrusted and both sides sensitive.
pub fn apply_pick_mode(
    config: &SyncConfig,
    source: &LocationArg,
    destination: &LocationArg,
    encrypt_on_pick: bool,
) -> Result<SyncConfig> {
    config.location(&source.location)?;
    config.location(&destination.location)?;

    if source.location == destination.location {
        return Err(SyncError::config(
            "source and destination location must not be equal",
        ));
    }

    let mut picked = config.clone();

    let decryption = source
        .path
        .as_deref()
        .is_some_and(|path| path.ends_with(CIPHERTEXT_SUFFIX))
        && !destination.path.as_deref().is_some_and(looks_like_file);

    if let Some(path) = &source.path {
        log::debug!("Pick mode enabled for source.");
        let mut dir = DirectoryConfig::new(path.as_str());
        if decryption {
            log::debug!("Decryption enabled for source.");
            dir.sensitive = true;
        } else {
            log::debug!("Source now considered untrusted to prevent decryption.");
        }

        if let Some(location) = picked.locations.get_mut(&source.location) {
            location.trusted = false;
            location.dirs = vec![dir];
        }
    }

    let Some(path) = &destination.path else {
        if encrypt_on_pick {
            log::warn!("Ignoring --encrypt option as you did not pick a destination.");
        }
        return Ok(picked);
    };

    log::debug!("Pick mode enabled for destination.");
    let mut dir = DirectoryConfig::new(path.as_str());

    if encrypt_on_pick {
        log::debug!("Encryption enabled for source in pick mode.");
        if source.path.as_deref().is_some_and(|p| p.ends_with(CIPHERTEXT_SUFFIX)) {
            log::warn!("You are trying to encrypt an already encrypted source.");
        }
        if let Some(location) = picked.locations.get_mut(&source.location) {
            for dir in &mut location.dirs {
                dir.sensitive = true;
            }
        }
    }

    dir.sensitive = encrypt_on_pick || decryption;

    if let Some(location) = picked.locations.get_mut(&destination.location) {
        if encrypt_on_pick {
            location.trusted = false;
        }
        location.dirs = vec![dir];
    }

    Ok(picked)
}

/// A path with an extension names a file rather than a directory.
fn looks_like_file(path: &str) -> bool {
    !path.ends_with('/') && Path::new(path).extension().is_some()
}
