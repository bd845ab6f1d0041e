//! Post-download size ceiling.

use crate::download::error::RelayError;
use crate::download::stager::StagedArtifact;

/// Rejects artifacts strictly larger than `max_bytes`.
///
/// Runs after the download finished, so it can only stop the relay, not the fetch.
pub fn check(artifact: &StagedArtifact, max_bytes: u64) -> Result<(), RelayError> {
    if artifact.size_bytes > max_bytes {
        log::warn!(
            "Artifact {} rejected: {} bytes > limit {} bytes",
            artifact.file_path.display(),
            artifact.size_bytes,
            max_bytes
        );
        return Err(RelayError::TooLarge {
            size_bytes: artifact.size_bytes,
            limit_bytes: max_bytes,
        });
    }
    Ok(())
}
