use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::path::RemoteEndpoint;

/// File name looked up in every default configuration directory
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// System-wide configuration directory, checked last
const SYSTEM_CONFIG_DIR: &str = "/etc/syncbuddy";

/// Cross-platform configuration directory manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the main configuration directory path following platform conventions:
    /// - Linux: $XDG_CONFIG_HOME/syncbuddy or ~/.config/syncbuddy
    /// - macOS: ~/Library/Application Support/syncbuddy
    /// - Windows: %APPDATA%\syncbuddy
    pub fn config_dir() -> Result<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
                Ok(PathBuf::from(xdg_config).join("syncbuddy"))
            } else {
                let home = dirs::home_dir().context("Failed to get home directory")?;
                Ok(home.join(".config").join("syncbuddy"))
            }
        }

        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join("Library").join("Application Support").join("syncbuddy"))
        }

        #[cfg(target_os = "windows")]
        {
            Ok(dirs::config_dir()
                .context("Failed to get Windows config directory")?
                .join("syncbuddy"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join(".syncbuddy"))
        }
    }

    /// Get the log file path
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("syncbuddy.log"))
    }

    /// Configuration files tried when `--config` is not given, in order:
    /// the working directory, the user config directory, then /etc.
    pub fn default_config_candidates() -> Result<Vec<PathBuf>> {
        Ok(vec![
            PathBuf::from(".").join(DEFAULT_CONFIG_FILE),
            Self::config_dir()?.join(DEFAULT_CONFIG_FILE),
            PathBuf::from(SYSTEM_CONFIG_DIR).join(DEFAULT_CONFIG_FILE),
        ])
    }

    /// First existing default configuration file
    pub fn find_config_file() -> Result<PathBuf> {
        let candidates = Self::default_config_candidates()?;
        candidates
            .iter()
            .find(|candidate| candidate.is_file())
            .cloned()
            .with_context(|| {
                let tried: Vec<String> = candidates
                    .iter()
                    .map(|c| c.display().to_string())
                    .collect();
                format!("No configuration file found (tried: {})", tried.join(", "))
            })
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
        Ok(config_dir)
    }
}

/// Encryption settings shared by every job of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// GPG key (id, fingerprint or e-mail) data is encrypted for
    #[serde(default)]
    pub recipient: Option<String>,

    /// Scratch space for archives and ciphertexts, removed after the run
    #[serde(default)]
    pub tmp_dir: Option<PathBuf>,
}

/// SSH settings of a remote location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshConfig {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

impl SshConfig {
    pub fn endpoint(&self) -> crate::error::Result<RemoteEndpoint> {
        RemoteEndpoint::new(
            self.username.as_deref().unwrap_or_default(),
            self.hostname.as_deref().unwrap_or_default(),
            self.port,
        )
    }
}

/// One directory entry of a location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Path relative to the location's root
    pub path: String,

    #[serde(default)]
    pub sensitive: bool,

    /// `file` (default) or `directory`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_folders: Option<Vec<Option<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitive_folders: Option<Vec<Option<String>>>,
}

impl DirectoryConfig {
    pub fn new(path: impl Into<String>) -> Self {
        DirectoryConfig {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// A named root holding directories to synchronize
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub root_dir: PathBuf,

    /// Sensitive data may be stored here unencrypted
    #[serde(default)]
    pub trusted: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshConfig>,

    #[serde(default)]
    pub dirs: Vec<DirectoryConfig>,
}

/// The whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub gpg: CryptoConfig,

    #[serde(default)]
    pub locations: BTreeMap<String, LocationConfig>,
}

impl SyncConfig {
    /// Load a configuration file. `.toml` files are read as TOML, everything
    /// else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = if path.extension().and_then(|e| e.to_str()) == Some("toml") {
            Self::from_toml(&content)
        } else {
            Self::from_yaml(&content)
        }
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Configuration contains {} locations.", config.locations.len());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yml::from_str(content)?)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn location_names(&self) -> Vec<&str> {
        self.locations.keys().map(String::as_str).collect()
    }

    /// Look up a location by name
    pub fn location(&self, name: &str) -> crate::error::Result<&LocationConfig> {
        self.locations.get(name).ok_or_else(|| {
            SyncError::config(format!(
                "location \"{name}\" not found in configuration (available: {})",
                self.location_names().join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const SAMPLE: &str = r#"
gpg:
  recipient: alice@example.org
  tmp_dir: /tmp/syncbuddy
locations:
  laptop:
    root_dir: /home/alice
    trusted: true
    dirs:
      - path: photos
        exclude_folders: [cache, ~]
        sensitive_folders: [private]
      - path: vault
        sensitive: true
        encryption_mode: directory
  nas:
    root_dir: /srv/backup
    ssh:
      username: alice
      hostname: nas.local
      port: 2222
    dirs:
      - path: photos
      - path: vault
        sensitive: true
"#;

    #[test]
    fn test_parse_yaml() {
        let config = SyncConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.gpg.recipient.as_deref(), Some("alice@example.org"));
        assert_eq!(config.location_names(), vec!["laptop", "nas"]);

        let laptop = config.location("laptop").unwrap();
        assert!(laptop.trusted);
        assert_eq!(laptop.dirs.len(), 2);
        assert_eq!(
            laptop.dirs[0].exclude_folders,
            Some(vec![Some("cache".to_string()), None])
        );
        assert_eq!(laptop.dirs[1].encryption_mode.as_deref(), Some("directory"));

        let nas = config.location("nas").unwrap();
        assert!(!nas.trusted);
        let endpoint = nas.ssh.as_ref().unwrap().endpoint().unwrap();
        assert_eq!(endpoint.port, Some(2222));
    }

    #[test]
    fn test_parse_toml() {
        let content = r#"
[gpg]
recipient = "alice@example.org"

[locations.usb]
root_dir = "/mnt/usb"

[[locations.usb.dirs]]
path = "photos"
sensitive_folders = ["private"]
"#;
        let config = SyncConfig::from_toml(content).unwrap();
        let usb = config.location("usb").unwrap();
        assert_eq!(usb.dirs[0].path, "photos");
        assert!(config.gpg.tmp_dir.is_none());
    }

    #[test]
    fn test_unknown_location_is_configuration_error() {
        let config = SyncConfig::from_yaml(SAMPLE).unwrap();
        let err = config.location("cloud").unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(err.to_string().contains("laptop, nas"));
    }

    #[test]
    fn test_load_by_extension() {
        let temp = tempfile::TempDir::new().unwrap();
        let yaml = temp.path().join("config.yaml");
        fs::write(&yaml, SAMPLE).unwrap();
        assert_eq!(SyncConfig::load(&yaml).unwrap().locations.len(), 2);

        let toml_path = temp.path().join("config.toml");
        fs::write(&toml_path, "[locations.a]\nroot_dir = \"/a\"\n").unwrap();
        assert_eq!(SyncConfig::load(&toml_path).unwrap().locations.len(), 1);

        assert!(SyncConfig::load(&temp.path().join("missing.yaml")).is_err());
    }

    #[test]
    #[serial]
    fn test_config_paths() {
        let config_dir = ConfigManager::config_dir().unwrap();
        assert!(config_dir.to_string_lossy().contains("syncbuddy"));

        let log = ConfigManager::log_file_path().unwrap();
        assert!(log.to_string_lossy().ends_with("syncbuddy.log"));

        let candidates = ConfigManager::default_config_candidates().unwrap();
        assert_eq!(candidates.len(), 3);
        assert!(candidates[2].starts_with("/etc/syncbuddy"));
    }

    #[test]
    #[serial]
    #[cfg(target_os = "linux")]
    fn test_xdg_config_home_respected() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test-xdg-config");
        let config_dir = ConfigManager::config_dir().unwrap();
        assert!(config_dir.to_string_lossy().contains("/tmp/test-xdg-config/syncbuddy"));
        std::env::remove_var("XDG_CONFIG_HOME");
    }
}
