//! SSH command construction for remote locations.

use std::process::Command;

use crate::error::Result;
use crate::path::RemoteEndpoint;

use super::run_output;

/// Arguments of the base ssh command, e.g. `["-p2222", "alice@nas"]`
pub fn base_args(endpoint: &RemoteEndpoint) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(port) = endpoint.port {
        args.push(format!("-p{port}"));
    }
    args.push(endpoint.ssh_target());
    args
}

/// `ssh [-pPORT] user@host`
pub fn base_command(endpoint: &RemoteEndpoint) -> Command {
    let mut command = Command::new("ssh");
    command.args(base_args(endpoint));
    command
}

/// Remote shell used by rsync when the endpoint needs a non-default port
pub fn rsync_shell(endpoint: &RemoteEndpoint) -> Option<String> {
    endpoint.port.map(|port| format!("ssh -p {port}"))
}

/// Single-quote a value for the remote POSIX shell.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Run a script on the remote host and report whether it exited cleanly
pub fn remote_succeeds(endpoint: &RemoteEndpoint, script: &str) -> bool {
    base_command(endpoint)
        .arg(script)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run a script on the remote host and return its stdout
pub fn remote_output(endpoint: &RemoteEndpoint, script: &str) -> Result<String> {
    let output = run_output(base_command(endpoint).arg(script), "ssh")?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
