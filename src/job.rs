use serde::Serialize;
use std::fmt;

use crate::directory::EncryptionMode;
use crate::path::{RemoteEndpoint, SyncPath};

/// One unit of work produced by the planner.
///
/// `encrypt` and `decrypt` are never both set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncJob {
    pub source: SyncPath,
    pub destination: SyncPath,
    pub encrypt: bool,
    pub decrypt: bool,
    /// Ciphertexts arriving at the destination may be decrypted in place
    pub destination_trusted: bool,
    /// Paths relative to `source` that the transfer skips
    pub excludes: Vec<String>,
    pub encryption_mode: EncryptionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<RemoteEndpoint>,
}

impl SyncJob {
    /// One-line summary used when presenting the plan
    pub fn describe(&self) -> String {
        if self.encrypt {
            format!("{} ---(encrypt)--> {}", self.source, self.destination)
        } else if self.decrypt {
            format!("{} ---(decrypt)--> {}", self.source, self.destination)
        } else {
            format!("{}  -->  {}", self.source, self.destination)
        }
    }
}

impl fmt::Display for SyncJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}
