//! rsync-backed transfer.

use std::process::Command;

use crate::error::Result;

use super::{run_status, ssh, Transfer, TransferRequest};

/// Transfer implementation invoking `rsync -avz`
#[derive(Debug, Default, Clone, Copy)]
pub struct RsyncTransfer;

impl RsyncTransfer {
    /// Full argument list for one transfer
    pub fn build_args(request: &TransferRequest<'_>) -> Vec<String> {
        let mut args: Vec<String> = vec!["-avz".into(), "--info=progress2".into()];

        for exclude in request.excludes {
            args.push("--exclude".into());
            args.push(exclude.clone());
        }

        if request.dry_run {
            args.push("--dry-run".into());
        }

        if request.delete_extraneous {
            args.push("--delete".into());
        }

        if let Some(shell) = request.endpoint.and_then(ssh::rsync_shell) {
            args.push("-e".into());
            args.push(shell);
        }

        args.push(request.source.clone());
        args.push(request.destination.clone());
        args
    }
}

impl Transfer for RsyncTransfer {
    fn transfer(&self, request: &TransferRequest<'_>) -> Result<()> {
        let mut command = Command::new("rsync");
        command.args(Self::build_args(request));
        run_status(&mut command, "rsync")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::RemoteEndpoint;

    #[test]
    fn test_build_args_local() {
        let excludes = vec!["cache".to_string(), "private".to_string()];
        let request = TransferRequest {
            source: "/home/alice/photos/".into(),
            destination: "/mnt/usb/photos/".into(),
            excludes: &excludes,
            dry_run: true,
            delete_extraneous: false,
            endpoint: None,
        };

        assert_eq!(
            RsyncTransfer::build_args(&request),
            vec![
                "-avz",
                "--info=progress2",
                "--exclude",
                "cache",
                "--exclude",
                "private",
                "--dry-run",
                "/home/alice/photos/",
                "/mnt/usb/photos/",
            ]
        );
    }

    #[test]
    fn test_build_args_remote_with_port() {
        let endpoint = RemoteEndpoint::new("alice", "nas", Some(2222)).unwrap();
        let request = TransferRequest {
            source: "/home/alice/photos/".into(),
            destination: "alice@nas:/srv/photos/".into(),
            excludes: &[],
            dry_run: false,
            delete_extraneous: true,
            endpoint: Some(&endpoint),
        };

        let args = RsyncTransfer::build_args(&request);
        assert!(args.contains(&"--delete".to_string()));
        let e = args.iter().position(|a| a == "-e").unwrap();
        assert_eq!(args[e + 1], "ssh -p 2222");
        assert_eq!(args.last().unwrap(), "alice@nas:/srv/photos/");
    }
}
