//! Extraction engine interface and the yt-dlp backed implementation.
//!
//! The relay never talks to media sites itself. It hands an `ExtractionRequest` to an
//! `ExtractionEngine`, which fetches the media into the given directory and returns the
//! metadata it resolved along the way.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use url::Url;

use crate::core::config::download::MERGE_OUTPUT_FORMAT;
use crate::core::process::run_with_timeout;
use crate::download::error::RelayError;
use crate::download::format::SelectionExpression;
use crate::download::ytdlp_errors::{analyze_ytdlp_error, extract_error_cause, needs_operator_attention};

/// Parameters for a single extraction call.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub url: Url,
    pub format: SelectionExpression,
    /// yt-dlp output template, e.g. `/tmp/relay-<uuid>/%(id)s.%(ext)s`
    pub output_template: PathBuf,
    pub no_playlist: bool,
    pub quiet: bool,
    /// Container for merged video+audio (`--merge-output-format`)
    pub merge_output_format: Option<String>,
    pub timeout: Duration,
}

impl ExtractionRequest {
    /// Request with the relay's standard flags: no playlists, quiet, merged into mp4.
    pub fn standard(url: Url, format: SelectionExpression, output_template: PathBuf, timeout: Duration) -> Self {
        Self {
            url,
            format,
            output_template,
            no_playlist: true,
            quiet: true,
            merge_output_format: Some(MERGE_OUTPUT_FORMAT.to_string()),
            timeout,
        }
    }
}

/// Metadata resolved by the engine (the subset of yt-dlp's info dict we use).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Present for playlists / carousels
    #[serde(default)]
    pub entries: Option<Vec<EngineInfo>>,
}

impl EngineInfo {
    /// The info for the item actually relayed: the first entry of a multi-entry
    /// result, or the result itself.
    pub fn primary(&self) -> &EngineInfo {
        self.entries
            .as_deref()
            .and_then(|entries| entries.first())
            .unwrap_or(self)
    }
}

/// Anything able to fetch media for a URL into a directory.
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Human-readable name, used in logs
    fn name(&self) -> &str;

    /// Fetches the media described by `request`, writing file(s) next to the output
    /// template, and returns the resolved metadata.
    async fn extract(&self, request: &ExtractionRequest) -> Result<EngineInfo, RelayError>;
}

/// Extraction engine backed by the yt-dlp binary.
pub struct YtDlpEngine {
    ytdl_bin: String,
}

impl YtDlpEngine {
    pub fn new(ytdl_bin: impl Into<String>) -> Self {
        Self {
            ytdl_bin: ytdl_bin.into(),
        }
    }

    /// Command-line arguments for `request`.
    ///
    /// `--dump-single-json --no-simulate` makes yt-dlp download and still print the
    /// final info dict on stdout, so metadata comes from the same invocation.
    pub fn build_args(request: &ExtractionRequest) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-f".to_string(),
            request.format.to_string(),
            "-o".to_string(),
            request.output_template.to_string_lossy().into_owned(),
            "--dump-single-json".to_string(),
            "--no-simulate".to_string(),
            "--no-progress".to_string(),
        ];
        if request.no_playlist {
            args.push("--no-playlist".to_string());
        }
        if request.quiet {
            args.push("--quiet".to_string());
            args.push("--no-warnings".to_string());
        }
        if let Some(ref container) = request.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(container.clone());
        }
        // End of options: a URL can never be taken as a flag
        args.push("--".to_string());
        args.push(request.url.to_string());
        args
    }
}

#[async_trait]
impl ExtractionEngine for YtDlpEngine {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn extract(&self, request: &ExtractionRequest) -> Result<EngineInfo, RelayError> {
        let args = Self::build_args(request);
        log::debug!("yt-dlp command: {} {}", self.ytdl_bin, args.join(" "));

        let mut cmd = Command::new(&self.ytdl_bin);
        cmd.args(&args);

        let output = run_with_timeout(&mut cmd, request.timeout).await?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let error_type = analyze_ytdlp_error(&stderr);
            if needs_operator_attention(&error_type) {
                log::error!(
                    "yt-dlp failed for {} ({:?}, exit {:?}): {}",
                    request.url,
                    error_type,
                    output.status.code(),
                    stderr.trim()
                );
            } else {
                log::warn!("yt-dlp failed for {} ({:?})", request.url, error_type);
            }
            let cause = extract_error_cause(&stderr)
                .unwrap_or_else(|| format!("yt-dlp exited with status {}", output.status));
            return Err(RelayError::Extraction(cause));
        }

        parse_info_json(&output.stdout)
    }
}

/// Parses yt-dlp's `--dump-single-json` output.
///
/// yt-dlp prints one JSON document; anything unparseable after a successful exit is
/// logged and treated as "no metadata" since the file may still be there.
pub fn parse_info_json(stdout: &[u8]) -> Result<EngineInfo, RelayError> {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        log::warn!("yt-dlp produced no metadata output");
        return Ok(EngineInfo::default());
    }
    // Only the last line is the info dict if anything else slipped onto stdout
    let json_line = trimmed.lines().last().unwrap_or(trimmed);
    match serde_json::from_str::<EngineInfo>(json_line) {
        Ok(info) => Ok(info),
        Err(e) => {
            log::warn!("Failed to parse yt-dlp metadata: {}", e);
            Ok(EngineInfo::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::format::select;
    use crate::download::intent::Resolution;
    use pretty_assertions::assert_eq;

    fn request() -> ExtractionRequest {
        ExtractionRequest::standard(
            Url::parse("https://youtu.be/abc123").unwrap(),
            select(Resolution::P720),
            PathBuf::from("/tmp/relay-x/%(id)s.%(ext)s"),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_build_args() {
        let args = YtDlpEngine::build_args(&request());
        assert_eq!(
            args,
            vec![
                "-f",
                "bestvideo[height<=720]+bestaudio/best[height<=720]/best",
                "-o",
                "/tmp/relay-x/%(id)s.%(ext)s",
                "--dump-single-json",
                "--no-simulate",
                "--no-progress",
                "--no-playlist",
                "--quiet",
                "--no-warnings",
                "--merge-output-format",
                "mp4",
                "--",
                "https://youtu.be/abc123",
            ]
        );
    }

    #[test]
    fn test_build_args_without_optional_flags() {
        let mut req = request();
        req.no_playlist = false;
        req.quiet = false;
        req.merge_output_format = None;
        let args = YtDlpEngine::build_args(&req);
        assert!(!args.contains(&"--no-playlist".to_string()));
        assert!(!args.contains(&"--quiet".to_string()));
        assert!(!args.contains(&"--merge-output-format".to_string()));
    }

    #[test]
    fn test_parse_info_json() {
        let json = br#"{"id":"abc123","title":"Clip","description":"About","formats":[{"format_id":"18"}]}"#;
        let info = parse_info_json(json).unwrap();
        assert_eq!(info.title.as_deref(), Some("Clip"));
        assert_eq!(info.description.as_deref(), Some("About"));
        assert!(info.entries.is_none());
    }

    #[test]
    fn test_primary_uses_first_entry() {
        let json = br#"{"title":"Carousel","entries":[{"title":"First","description":null},{"title":"Second"}]}"#;
        let info = parse_info_json(json).unwrap();
        let primary = info.primary();
        assert_eq!(primary.title.as_deref(), Some("First"));
        assert_eq!(primary.description, None);
    }

    #[test]
    fn test_primary_with_empty_entries_is_self() {
        let info = EngineInfo {
            title: Some("Playlist".into()),
            description: None,
            entries: Some(vec![]),
        };
        assert_eq!(info.primary().title.as_deref(), Some("Playlist"));
    }

    #[test]
    fn test_parse_info_json_tolerates_garbage() {
        assert_eq!(parse_info_json(b"").unwrap(), EngineInfo::default());
        assert_eq!(parse_info_json(b"not json").unwrap(), EngineInfo::default());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_reports_missing_binary() {
        let engine = YtDlpEngine::new("definitely-not-yt-dlp-4f5e6d");
        let err = engine.extract(&request()).await.unwrap_err();
        assert!(matches!(err, RelayError::Extraction(_)));
    }
}
