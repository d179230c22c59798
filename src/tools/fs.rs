//! Filesystem checks that dispatch on the path's local/remote tag.

use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::error::Result;
use crate::path::SyncPath;

use super::{ssh, FileSystem};

/// Real filesystem: `std::fs` for local paths, ssh for remote ones
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystem;

impl SystemFileSystem {
    fn remote_test(path: &SyncPath, flag: &str) -> bool {
        match path.endpoint() {
            Some(endpoint) => {
                let target = ssh::quote(&path.absolute().to_string_lossy());
                ssh::remote_succeeds(endpoint, &format!("test {flag} {target}"))
            }
            None => false,
        }
    }
}

impl FileSystem for SystemFileSystem {
    fn exists(&self, path: &SyncPath) -> bool {
        match path {
            SyncPath::Local(_) => path.absolute().exists(),
            SyncPath::Remote { .. } => Self::remote_test(path, "-e"),
        }
    }

    fn is_dir(&self, path: &SyncPath) -> bool {
        match path {
            SyncPath::Local(_) => path.absolute().is_dir(),
            SyncPath::Remote { .. } => Self::remote_test(path, "-d"),
        }
    }

    fn is_file(&self, path: &SyncPath) -> bool {
        match path {
            SyncPath::Local(_) => path.absolute().is_file(),
            SyncPath::Remote { .. } => Self::remote_test(path, "-f"),
        }
    }

    fn create_dir(&self, path: &SyncPath) -> Result<()> {
        match path {
            SyncPath::Local(_) => {
                fs::create_dir_all(path.absolute())?;
            }
            SyncPath::Remote { endpoint, .. } => {
                let target = ssh::quote(&path.absolute().to_string_lossy());
                ssh::remote_output(endpoint, &format!("mkdir -p {target}"))?;
                log::debug!("Created remote directory {path}");
            }
        }
        Ok(())
    }

    fn list_matching(&self, path: &SyncPath, suffix: &str) -> Result<Vec<PathBuf>> {
        match path {
            SyncPath::Local(_) => {
                let root = path.absolute();
                let mut matches: Vec<PathBuf> = WalkDir::new(&root)
                    .follow_links(false)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .filter(|e| e.file_name().to_string_lossy().ends_with(suffix))
                    .map(|e| e.into_path())
                    .collect();
                matches.sort();
                Ok(matches)
            }
            SyncPath::Remote { endpoint, .. } => {
                let target = ssh::quote(&path.absolute().to_string_lossy());
                let pattern = ssh::quote(&format!("*{suffix}"));
                let stdout =
                    ssh::remote_output(endpoint, &format!("find {target} -type f -name {pattern}"))?;
                Ok(stdout
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(PathBuf::from)
                    .collect())
            }
        }
    }
}
