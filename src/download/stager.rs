//! Runs the extraction engine into a workspace and picks up the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::download::error::RelayError;
use crate::download::format;
use crate::download::intent::DownloadIntent;
use crate::download::workspace::RunWorkspace;
use crate::download::ytdlp::{ExtractionEngine, ExtractionRequest};

/// A downloaded file plus the metadata needed to relay it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedArtifact {
    /// Lives inside the run workspace and goes away with it
    pub file_path: PathBuf,
    pub size_bytes: u64,
    pub title: String,
    pub description: String,
}

/// Output file name template inside a workspace
const OUTPUT_TEMPLATE: &str = "%(id)s.%(ext)s";

/// Fetches the media for `intent` into `workspace`.
///
/// # Errors
/// - `RelayError::Extraction` when the engine fails (message preserved)
/// - `RelayError::NotFound` when the engine succeeded but left no file behind
pub async fn stage(
    engine: &dyn ExtractionEngine,
    intent: &DownloadIntent,
    workspace: &RunWorkspace,
    timeout: Duration,
) -> Result<StagedArtifact, RelayError> {
    let selection = format::select(intent.target_resolution);
    let request = ExtractionRequest::standard(
        intent.source_url.clone(),
        selection,
        workspace.path().join(OUTPUT_TEMPLATE),
        timeout,
    );

    log::info!(
        "Staging {} at {} via {} (format: {})",
        intent.source_url,
        intent.target_resolution,
        engine.name(),
        request.format
    );

    let info = engine.extract(&request).await?;

    let (file_path, size_bytes) = find_largest_file(workspace.path()).await?.ok_or_else(|| {
        log::error!(
            "{} reported success for {} but {} is empty",
            engine.name(),
            intent.source_url,
            workspace.path().display()
        );
        RelayError::NotFound("download finished but produced no file".to_string())
    })?;

    let primary = info.primary();
    let title = primary
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| file_stem(&file_path));
    let description = primary.description.clone().unwrap_or_default();

    log::info!("Staged '{}' ({} bytes) at {}", title, size_bytes, file_path.display());

    Ok(StagedArtifact {
        file_path,
        size_bytes,
        title,
        description,
    })
}

/// Returns the largest regular file directly inside `dir`, with its size.
///
/// This is how the produced artifact is identified: a fresh workspace only holds what
/// the engine wrote, and the merged media file dwarfs any sidecar (thumbnails,
/// `.part` leftovers). Ties resolve to whichever maximal file is seen last.
pub async fn find_largest_file(dir: &Path) -> Result<Option<(PathBuf, u64)>, RelayError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut largest: Option<(PathBuf, u64)> = None;

    while let Some(entry) = entries.next_entry().await? {
        let metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let size = metadata.len();
        if largest.as_ref().map_or(true, |(_, best)| size >= *best) {
            largest = Some((entry.path(), size));
        }
    }

    Ok(largest)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string())
}
