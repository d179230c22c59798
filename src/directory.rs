use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, SyncError};
use crate::path::{RemoteEndpoint, SyncPath};
use crate::tools::FileSystem;

/// How a sensitive directory is turned into ciphertext
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncryptionMode {
    /// Every file is encrypted on its own; the directory shape is kept
    #[default]
    #[serde(rename = "file")]
    PerFile,
    /// The whole directory is archived first and the archive encrypted
    #[serde(rename = "directory")]
    DirectoryArchive,
}

impl FromStr for EncryptionMode {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(EncryptionMode::PerFile),
            "directory" => Ok(EncryptionMode::DirectoryArchive),
            other => Err(SyncError::config(format!(
                "invalid encryption mode '{other}' (expected 'file' or 'directory')"
            ))),
        }
    }
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionMode::PerFile => write!(f, "file"),
            EncryptionMode::DirectoryArchive => write!(f, "directory"),
        }
    }
}

/// One configured directory inside a location.
///
/// Ordinary excludes and sensitive sub-paths are kept apart. Sensitive
/// sub-paths still count as excludes (see [`DirectoryDescriptor::exclude_subpaths`])
/// so they are never swept up by an unencrypted transfer of the parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryDescriptor {
    root: SyncPath,
    is_sensitive: bool,
    encryption_mode: EncryptionMode,
    sensitive_subpaths: Vec<SyncPath>,
    exclude_subpaths: Vec<SyncPath>,
}

impl DirectoryDescriptor {
    /// Build a descriptor from a configured directory path.
    ///
    /// The path must be relative to the location root. A single trailing
    /// separator is removed and reported through `warnings`.
    pub fn from_config(
        system_root: &Path,
        configured_path: &str,
        endpoint: Option<RemoteEndpoint>,
        is_sensitive: bool,
        encryption_mode: EncryptionMode,
        warnings: &mut Vec<String>,
    ) -> Result<Self> {
        if Path::new(configured_path).is_absolute() || configured_path.starts_with('/') {
            return Err(SyncError::config(format!(
                "directory '{configured_path}' must be relative to the location root"
            )));
        }

        let cleaned = configured_path
            .strip_suffix('/')
            .unwrap_or(configured_path);
        if cleaned.len() != configured_path.len() {
            let warning = format!(
                "Removed trailing slash from path {configured_path} to avoid misinterpretations."
            );
            log::warn!("{warning}");
            warnings.push(warning);
        }

        Ok(DirectoryDescriptor {
            root: SyncPath::new(system_root, cleaned, "", endpoint),
            is_sensitive,
            encryption_mode,
            sensitive_subpaths: Vec::new(),
            exclude_subpaths: Vec::new(),
        })
    }

    pub fn root(&self) -> &SyncPath {
        &self.root
    }

    pub fn is_sensitive(&self) -> bool {
        self.is_sensitive
    }

    pub fn encryption_mode(&self) -> EncryptionMode {
        self.encryption_mode
    }

    pub fn endpoint(&self) -> Option<&RemoteEndpoint> {
        self.root.endpoint()
    }

    pub fn sensitive_subpaths(&self) -> &[SyncPath] {
        &self.sensitive_subpaths
    }

    /// Ordinary excludes followed by the sensitive sub-paths not already listed
    pub fn exclude_subpaths(&self) -> Vec<&SyncPath> {
        self.excluded(true).collect()
    }

    fn excluded(&self, include_sensitive: bool) -> impl Iterator<Item = &SyncPath> {
        let sensitive = self
            .sensitive_subpaths
            .iter()
            .filter(move |path| include_sensitive && !self.exclude_subpaths.contains(path));
        self.exclude_subpaths.iter().chain(sensitive)
    }

    /// Sensitive data may only be paired with a destination flagged the same way
    pub fn is_syncable_with(&self, other: &DirectoryDescriptor) -> bool {
        self.is_sensitive == other.is_sensitive
    }

    /// Register exclude folders. Empty entries are skipped with a warning.
    pub fn register_exclude_paths(
        &mut self,
        entries: &[Option<String>],
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        for entry in entries {
            let Some(sub_path) = usable_entry(entry, "exclude", warnings)? else {
                continue;
            };
            let path = self.root.with_sub_path(sub_path);
            push_unique(&mut self.exclude_subpaths, path);
        }
        Ok(())
    }

    /// Register sensitive folders. They are excluded from the parent's
    /// transfer whenever it needs splitting.
    ///
    /// Does nothing when the whole directory is already sensitive.
    pub fn register_sensitive_paths(
        &mut self,
        entries: &[Option<String>],
        warnings: &mut Vec<String>,
    ) -> Result<()> {
        if self.is_sensitive {
            log::debug!(
                "Sensitive sub-folders of {} are ignored because the entire directory is marked sensitive.",
                self.root
            );
            return Ok(());
        }

        for entry in entries {
            let Some(sub_path) = usable_entry(entry, "sensitive", warnings)? else {
                continue;
            };
            let path = self.root.with_sub_path(sub_path);
            push_unique(&mut self.sensitive_subpaths, path);
        }
        Ok(())
    }

    /// Exclude patterns relative to the directory root, as the transfer tool
    /// expects them.
    ///
    /// With `include_sensitive == false` only ordinary excludes remain. A
    /// folder configured both as exclude and as sensitive stays excluded.
    pub fn exclude_patterns(&self, include_sensitive: bool) -> Vec<String> {
        self.excluded(include_sensitive)
            .map(|path| path.sub_path().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    /// Exclude paths that are not present on disk
    pub fn missing_excludes(&self, fs: &dyn FileSystem) -> Vec<&SyncPath> {
        self.excluded(true)
            .filter(|path| !fs.exists(path))
            .collect()
    }
}

fn usable_entry<'a>(
    entry: &'a Option<String>,
    kind: &str,
    warnings: &mut Vec<String>,
) -> Result<Option<&'a str>> {
    match entry.as_deref().map(str::trim) {
        None | Some("") => {
            let warning = format!("Ignoring empty {kind} directory.");
            log::warn!("{warning}");
            warnings.push(warning);
            Ok(None)
        }
        Some(sub_path) if sub_path.starts_with('/') => Err(SyncError::config(format!(
            "{kind} folder '{sub_path}' must be relative to its directory"
        ))),
        Some(sub_path) => Ok(Some(sub_path)),
    }
}

fn push_unique(paths: &mut Vec<SyncPath>, path: SyncPath) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(path: &str, sensitive: bool) -> DirectoryDescriptor {
        let mut warnings = Vec::new();
        DirectoryDescriptor::from_config(
            Path::new("/home/alice"),
            path,
            None,
            sensitive,
            EncryptionMode::PerFile,
            &mut warnings,
        )
        .unwrap()
    }

    fn entries(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(String::from)).collect()
    }

    #[test]
    fn test_encryption_mode_parsing() {
        assert_eq!("file".parse::<EncryptionMode>().unwrap(), EncryptionMode::PerFile);
        assert_eq!(
            "Directory".parse::<EncryptionMode>().unwrap(),
            EncryptionMode::DirectoryArchive
        );
        let err = "zip".parse::<EncryptionMode>().unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert_eq!(EncryptionMode::default(), EncryptionMode::PerFile);
    }

    #[test]
    fn test_absolute_path_rejected() {
        let mut warnings = Vec::new();
        let result = DirectoryDescriptor::from_config(
            Path::new("/home/alice"),
            "/etc",
            None,
            false,
            EncryptionMode::PerFile,
            &mut warnings,
        );
        assert!(matches!(result, Err(SyncError::Configuration(_))));
    }

    #[test]
    fn test_trailing_slash_stripped_with_warning() {
        let mut warnings = Vec::new();
        let dir = DirectoryDescriptor::from_config(
            Path::new("/home/alice"),
            "photos/",
            None,
            false,
            EncryptionMode::PerFile,
            &mut warnings,
        )
        .unwrap();
        assert_eq!(dir.root().render(), "/home/alice/photos");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_sensitive_paths_are_also_excluded() {
        let mut dir = descriptor("photos", false);
        let mut warnings = Vec::new();
        dir.register_exclude_paths(&entries(&[Some("cache")]), &mut warnings)
            .unwrap();
        dir.register_sensitive_paths(&entries(&[Some("private")]), &mut warnings)
            .unwrap();

        assert_eq!(dir.sensitive_subpaths().len(), 1);
        assert_eq!(dir.exclude_patterns(true), vec!["cache", "private"]);
        assert_eq!(dir.exclude_patterns(false), vec!["cache"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_fully_sensitive_directory_ignores_sensitive_subpaths() {
        let mut dir = descriptor("vault", true);
        let mut warnings = Vec::new();
        dir.register_sensitive_paths(&entries(&[Some("keys")]), &mut warnings)
            .unwrap();
        dir.register_exclude_paths(&entries(&[Some("tmp")]), &mut warnings)
            .unwrap();

        assert!(dir.sensitive_subpaths().is_empty());
        assert_eq!(dir.exclude_patterns(true), vec!["tmp"]);
    }

    #[test]
    fn test_empty_entries_skipped_with_warning() {
        let mut dir = descriptor("photos", false);
        let mut warnings = Vec::new();
        dir.register_exclude_paths(&entries(&[None, Some(""), Some("cache")]), &mut warnings)
            .unwrap();
        assert_eq!(dir.exclude_patterns(true), vec!["cache"]);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_duplicate_entries_registered_once() {
        let mut dir = descriptor("photos", false);
        let mut warnings = Vec::new();
        dir.register_exclude_paths(&entries(&[Some("private")]), &mut warnings)
            .unwrap();
        dir.register_sensitive_paths(&entries(&[Some("private"), Some("private")]), &mut warnings)
            .unwrap();
        assert_eq!(dir.exclude_subpaths().len(), 1);
        assert_eq!(dir.sensitive_subpaths().len(), 1);
    }

    #[test]
    fn test_explicit_exclude_survives_when_also_sensitive() {
        let mut dir = descriptor("photos", false);
        let mut warnings = Vec::new();
        dir.register_exclude_paths(&entries(&[Some("private")]), &mut warnings)
            .unwrap();
        dir.register_sensitive_paths(&entries(&[Some("private"), Some("family")]), &mut warnings)
            .unwrap();

        assert_eq!(dir.exclude_patterns(false), vec!["private"]);
        assert_eq!(dir.exclude_patterns(true), vec!["private", "family"]);
    }

    #[test]
    fn test_encryption_mode_serde_names() {
        assert_eq!(
            serde_json::to_string(&EncryptionMode::DirectoryArchive).unwrap(),
            "\"directory\""
        );
        let mode: EncryptionMode = serde_json::from_str("\"file\"").unwrap();
        assert_eq!(mode, EncryptionMode::PerFile);
        assert!(serde_json::from_str::<EncryptionMode>("\"perfile\"").is_err());
    }

    #[test]
    fn test_syncable_requires_equal_sensitivity() {
        assert!(descriptor("a", true).is_syncable_with(&descriptor("b", true)));
        assert!(!descriptor("a", true).is_syncable_with(&descriptor("b", false)));
    }
}
