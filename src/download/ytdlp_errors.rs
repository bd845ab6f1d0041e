//! yt-dlp stderr analysis
//!
//! Classifies failures for operator logs and pulls a short, user-presentable cause out
//! of yt-dlp's diagnostic output.

/// yt-dlp error categories
#[derive(Debug, Clone, PartialEq)]
pub enum YtDlpErrorType {
    /// Cookies are missing, invalid or rotated
    InvalidCookies,
    /// The site flagged the request as automated
    BotDetection,
    /// Video is private, removed or geo-blocked
    VideoUnavailable,
    /// Timeouts, DNS, refused connections
    NetworkError,
    /// Site is not supported by the extractor
    UnsupportedUrl,
    Unknown,
}

/// Determines the error category from yt-dlp stderr
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorType {
    let stderr_lower = stderr.to_lowercase();

    if stderr_lower.contains("cookies are no longer valid")
        || stderr_lower.contains("cookies have likely been rotated")
        || stderr_lower.contains("sign in to confirm you're not a bot")
        || stderr_lower.contains("please sign in")
        || stderr_lower.contains("use --cookies-from-browser")
        || stderr_lower.contains("use --cookies for the authentication")
    {
        return YtDlpErrorType::InvalidCookies;
    }

    if stderr_lower.contains("bot detection")
        || stderr_lower.contains("http error 403")
        || stderr_lower.contains("signature extraction failed")
    {
        return YtDlpErrorType::BotDetection;
    }

    if stderr_lower.contains("private video")
        || stderr_lower.contains("video unavailable")
        || stderr_lower.contains("this video is not available")
        || stderr_lower.contains("video is private")
        || stderr_lower.contains("video has been removed")
        || stderr_lower.contains("this video does not exist")
    {
        return YtDlpErrorType::VideoUnavailable;
    }

    if stderr_lower.contains("unsupported url") {
        return YtDlpErrorType::UnsupportedUrl;
    }

    if stderr_lower.contains("timed out")
        || stderr_lower.contains("timeout")
        || stderr_lower.contains("connection")
        || stderr_lower.contains("network")
        || stderr_lower.contains("name resolution")
        || stderr_lower.contains("failed to connect")
    {
        return YtDlpErrorType::NetworkError;
    }

    YtDlpErrorType::Unknown
}

/// Whether operators should look at this failure (as opposed to a bad link)
pub fn needs_operator_attention(error_type: &YtDlpErrorType) -> bool {
    matches!(
        error_type,
        YtDlpErrorType::InvalidCookies | YtDlpErrorType::BotDetection | YtDlpErrorType::Unknown
    )
}

/// Maximum length of a cause forwarded to the chat
const MAX_CAUSE_CHARS: usize = 300;

/// Extracts the human-readable cause from yt-dlp stderr.
///
/// Takes the last `ERROR:` line (yt-dlp prints the fatal one last), strips the
/// `ERROR: [extractor] id:` prefix noise, and falls back to the last non-empty line.
///
/// # Example
/// ```
/// use mediarelay::download::ytdlp_errors::extract_error_cause;
///
/// let stderr = "WARNING: something\nERROR: [youtube] abc123: Video unavailable\n";
/// assert_eq!(extract_error_cause(stderr), Some("Video unavailable".to_string()));
/// ```
pub fn extract_error_cause(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let line = lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())?;

    let mut cause = line.trim_start_matches("ERROR:").trim();

    // "[youtube] abc123: Video unavailable" -> "Video unavailable"
    if cause.starts_with('[') {
        if let Some(end) = cause.find(']') {
            cause = cause[end + 1..].trim();
            if let Some((head, tail)) = cause.split_once(": ") {
                if !head.contains(' ') {
                    cause = tail.trim();
                }
            }
        }
    }

    if cause.is_empty() {
        return None;
    }
    Some(crate::core::utils::truncate_chars(cause, MAX_CAUSE_CHARS))
}
