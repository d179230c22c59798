use std::fmt;

use crate::config::LocationConfig;
use crate::directory::{DirectoryDescriptor, EncryptionMode};
use crate::error::Result;
use crate::tools::FileSystem;

/// Which side of the transfer a location is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Source,
    Destination,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Source => write!(f, "source"),
            Role::Destination => write!(f, "destination"),
        }
    }
}

/// Descriptors built from one location, plus the non-fatal problems found
#[derive(Debug, Clone, Default)]
pub struct Preprocessed {
    pub descriptors: Vec<DirectoryDescriptor>,
    pub warnings: Vec<String>,
}

/// Turn a location's configured directories into descriptors.
///
/// Source directories that do not exist are skipped with a warning. Exclude
/// and sensitive folders are only resolved for sources; destinations just
/// mirror whatever the source sends.
pub fn preprocess_location(
    name: &str,
    location: &LocationConfig,
    role: Role,
    fs: &dyn FileSystem,
) -> Result<Preprocessed> {
    log::debug!("Processing {role} location \"{name}\"");

    let endpoint = location.ssh.as_ref().map(|ssh| ssh.endpoint()).transpose()?;
    let mut result = Preprocessed::default();

    for entry in &location.dirs {
        let mode = match entry.encryption_mode.as_deref() {
            Some(raw) => raw.parse::<EncryptionMode>()?,
            None => EncryptionMode::default(),
        };

        let mut descriptor = DirectoryDescriptor::from_config(
            &location.root_dir,
            &entry.path,
            endpoint.clone(),
            entry.sensitive,
            mode,
            &mut result.warnings,
        )?;

        if role == Role::Source {
            if !fs.exists(descriptor.root()) {
                let warning = format!(
                    "Source directory {} does not exist. Nothing to synchronize!",
                    descriptor.root()
                );
                log::warn!("{warning}");
                result.warnings.push(warning);
                continue;
            }
            log::debug!("Directory {} exists.", descriptor.root());

            if let Some(excludes) = &entry.exclude_folders {
                descriptor.register_exclude_paths(excludes, &mut result.warnings)?;
            }
            if let Some(sensitive) = &entry.sensitive_folders {
                descriptor.register_sensitive_paths(sensitive, &mut result.warnings)?;
            }
        }

        result.descriptors.push(descriptor);
    }

    Ok(result)
}
