use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SyncError};

/// SSH endpoint of a remote location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEndpoint {
    pub username: String,
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl RemoteEndpoint {
    /// Create an endpoint, rejecting an empty username or hostname.
    pub fn new(username: &str, hostname: &str, port: Option<u16>) -> Result<Self> {
        if username.trim().is_empty() {
            return Err(SyncError::config("please provide an SSH username"));
        }
        if hostname.trim().is_empty() {
            return Err(SyncError::config("please provide an SSH hostname"));
        }

        Ok(RemoteEndpoint {
            username: username.trim().to_string(),
            hostname: hostname.trim().to_string(),
            port,
        })
    }

    /// `user@host`, as used by ssh and rsync
    pub fn ssh_target(&self) -> String {
        format!("{}@{}", self.username, self.hostname)
    }
}

/// The three segments that make up an absolute path.
///
/// `system_root` is the location root, `path_root` the configured directory
/// relative to it, and `sub_path` a path inside that directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegments {
    pub system_root: PathBuf,
    pub path_root: PathBuf,
    pub sub_path: PathBuf,
}

impl PathSegments {
    pub fn absolute(&self) -> PathBuf {
        let mut path = self.system_root.clone();
        push_relative(&mut path, &self.path_root);
        push_relative(&mut path, &self.sub_path);
        path
    }
}

/// Push a segment without letting a leading `/` replace the whole buffer.
fn push_relative(buf: &mut PathBuf, segment: &Path) {
    for component in segment.components() {
        match component {
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
            other => buf.push(other.as_os_str()),
        }
    }
}

/// A filesystem location, either on this machine or reachable over SSH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPath {
    Local(PathSegments),
    Remote {
        segments: PathSegments,
        endpoint: RemoteEndpoint,
    },
}

impl SyncPath {
    pub fn new(
        system_root: impl Into<PathBuf>,
        path_root: impl Into<PathBuf>,
        sub_path: impl Into<PathBuf>,
        endpoint: Option<RemoteEndpoint>,
    ) -> Self {
        let segments = PathSegments {
            system_root: system_root.into(),
            path_root: path_root.into(),
            sub_path: sub_path.into(),
        };

        match endpoint {
            Some(endpoint) => SyncPath::Remote { segments, endpoint },
            None => SyncPath::Local(segments),
        }
    }

    /// A local path with no root/sub split
    pub fn local(path: impl Into<PathBuf>) -> Self {
        SyncPath::new(path, "", "", None)
    }

    /// Another absolute path on the same machine as this one
    pub fn on_same_host(&self, path: impl Into<PathBuf>) -> Self {
        SyncPath::new(path, "", "", self.endpoint().cloned())
    }

    pub fn segments(&self) -> &PathSegments {
        match self {
            SyncPath::Local(segments) => segments,
            SyncPath::Remote { segments, .. } => segments,
        }
    }

    pub fn endpoint(&self) -> Option<&RemoteEndpoint> {
        match self {
            SyncPath::Local(_) => None,
            SyncPath::Remote { endpoint, .. } => Some(endpoint),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SyncPath::Remote { .. })
    }

    pub fn absolute(&self) -> PathBuf {
        self.segments().absolute()
    }

    pub fn sub_path(&self) -> &Path {
        &self.segments().sub_path
    }

    /// Same roots and endpoint, different sub path
    pub fn with_sub_path(&self, sub_path: impl Into<PathBuf>) -> Self {
        let segments = self.segments();
        SyncPath::new(
            segments.system_root.clone(),
            segments.path_root.clone(),
            sub_path,
            self.endpoint().cloned(),
        )
    }

    /// Case-insensitive check of the final path component's ending.
    pub fn has_suffix(&self, suffix: &str) -> bool {
        self.absolute()
            .file_name()
            .map(|name| {
                name.to_string_lossy()
                    .to_lowercase()
                    .ends_with(&suffix.to_lowercase())
            })
            .unwrap_or(false)
    }

    /// POSIX path for local paths, `user@host:path` for remote ones.
    pub fn render(&self) -> String {
        let posix = posix_string(&self.absolute());
        match self {
            SyncPath::Local(_) => posix,
            SyncPath::Remote { endpoint, .. } => format!("{}:{}", endpoint.ssh_target(), posix),
        }
    }

    pub fn render_with_trailing_slash(&self) -> String {
        let mut rendered = self.render();
        if !rendered.ends_with('/') {
            rendered.push('/');
        }
        rendered
    }
}

fn posix_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

impl fmt::Display for SyncPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl Serialize for SyncPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> RemoteEndpoint {
        RemoteEndpoint::new("alice", "nas.local", Some(2222)).unwrap()
    }

    #[test]
    fn test_on_same_host_keeps_endpoint() {
        let nas = RemoteEndpoint::new("alice", "nas", None).unwrap();
        let root = SyncPath::new("/srv", "photos", "", Some(nas));
        let found = root.on_same_host("/srv/photos/private/a.jpg.crypt");
        assert_eq!(found.render(), "alice@nas:/srv/photos/private/a.jpg.crypt");
        assert!(!SyncPath::local("/a").on_same_host("/b").is_remote());
    }

    #[test]
    fn test_absolute_concatenates_segments() {
        let path = SyncPath::new("/home/alice", "photos", "private/2024", None);
        assert_eq!(path.absolute(), PathBuf::from("/home/alice/photos/private/2024"));
    }

    #[test]
    fn test_empty_segments_add_no_separator() {
        let path = SyncPath::new("/home/alice", "photos", "", None);
        assert_eq!(path.render(), "/home/alice/photos");
    }

    #[test]
    fn test_leading_slash_does_not_replace_root() {
        let path = SyncPath::new("/mnt/backup", "/photos", "", None);
        assert_eq!(path.absolute(), PathBuf::from("/mnt/backup/photos"));
    }

    #[test]
    fn test_remote_render() {
        let path = SyncPath::new("/srv", "photos", "", Some(endpoint()));
        assert!(path.is_remote());
        assert_eq!(path.render(), "alice@nas.local:/srv/photos");
        assert_eq!(path.render_with_trailing_slash(), "alice@nas.local:/srv/photos/");
    }

    #[test]
    fn test_with_sub_path_keeps_endpoint() {
        let root = SyncPath::new("/srv", "photos", "", Some(endpoint()));
        let sub = root.with_sub_path("private");
        assert_eq!(sub.sub_path(), Path::new("private"));
        assert_eq!(sub.endpoint(), Some(&endpoint()));
        assert_eq!(sub.absolute(), PathBuf::from("/srv/photos/private"));
    }

    #[test]
    fn test_has_suffix_is_case_insensitive() {
        assert!(SyncPath::local("/tmp/docs.synchive.CRYPT").has_suffix(".crypt"));
        assert!(!SyncPath::local("/tmp/docs").has_suffix(".crypt"));
    }

    #[test]
    fn test_endpoint_requires_user_and_host() {
        assert!(RemoteEndpoint::new("", "host", None).is_err());
        assert!(RemoteEndpoint::new("user", " ", None).is_err());
        assert_eq!(endpoint().ssh_target(), "alice@nas.local");
    }

    #[test]
    fn test_serializes_as_rendered_string() {
        let path = SyncPath::new("/srv", "photos", "", None);
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"/srv/photos\"");
    }
}
