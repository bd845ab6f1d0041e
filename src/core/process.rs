//! Process execution utilities with timeout support
//!
//! External tools (yt-dlp) run as child processes with a hard deadline so a stalled
//! source cannot hold a run's resources indefinitely.

use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::download::error::RelayError;

/// Run an async Command with a timeout.
///
/// The child is spawned with `kill_on_drop`, so when the deadline passes the
/// pending future is dropped and the process is killed with it. Both spawn failures
/// and timeouts come back as `RelayError::Extraction`.
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, RelayError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .map_err(|e| RelayError::Extraction(format!("Failed to start process: {}", e)))?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(RelayError::Extraction(format!("Process I/O failed: {}", e))),
        Err(_) => {
            log::error!("Process timed out after {}s, killing", timeout.as_secs());
            Err(RelayError::Extraction(format!(
                "Process timed out after {}s",
                timeout.as_secs()
            )))
        }
    }
}
