//! Process configuration
//!
//! Everything is read once at startup (`Config::from_env`) and handed down as plain
//! values. Nothing below reads the environment after that point.

use secrecy::SecretString;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

/// Download configuration
pub mod download {
    use super::Duration;

    /// Timeout for yt-dlp commands (in seconds)
    pub const YTDLP_TIMEOUT_SECS: u64 = 240; // 4 minutes, slow sources spend most of it on metadata

    /// yt-dlp command timeout duration
    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(YTDLP_TIMEOUT_SECS)
    }

    /// Container that merged video+audio streams are remuxed into
    pub const MERGE_OUTPUT_FORMAT: &str = "mp4";

    /// Prefix of per-run workspace directories
    pub const WORKSPACE_PREFIX: &str = "relay-";
}

/// Validation configuration
pub mod validation {
    /// Maximum URL length (RFC 7230 recommends 8000, but we use 2048 for safety)
    pub const MAX_URL_LENGTH: usize = 2048;

    /// Maximum file size for Telegram (50MB)
    /// Telegram Bot API allows up to 50MB for files sent by bots
    pub const MAX_FILE_SIZE_MB: u64 = 50;
}

/// Caption configuration
pub mod caption {
    /// Telegram rejects media captions longer than this (in characters)
    pub const MAX_CAPTION_CHARS: usize = 1024;

    /// How much of the source description is previewed in a caption
    pub const DESCRIPTION_PREVIEW_CHARS: usize = 1500;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for HTTP requests (in seconds)
    /// Large video uploads through the Bot API can take several minutes
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Runtime configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot token from BOT_TOKEN or TELOXIDE_TOKEN. Only `run` requires it.
    pub bot_token: Option<SecretString>,
    /// Custom Bot API server (BOT_API_URL)
    pub bot_api_url: Option<String>,
    /// yt-dlp binary (YTDL_BIN), defaults to "yt-dlp"
    pub ytdl_bin: String,
    /// Root directory for per-run workspaces (TEMP_FILES_DIR), tilde-expanded
    pub temp_root: PathBuf,
    /// Artifact size ceiling in megabytes (MAX_FILE_SIZE_MB)
    pub max_file_size_mb: u64,
    /// Extraction timeout (YTDLP_TIMEOUT_SECS)
    pub extraction_timeout: Duration,
    /// Log file path (LOG_FILE_PATH), defaults to "app.log"
    pub log_file_path: String,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` beforehand if `.env` files should be honored.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bot_token = get("BOT_TOKEN")
            .or_else(|| get("TELOXIDE_TOKEN"))
            .map(SecretString::from);

        let temp_root = match get("TEMP_FILES_DIR") {
            Some(dir) => PathBuf::from(shellexpand::tilde(&dir).into_owned()),
            None => env::temp_dir(),
        };

        let max_file_size_mb = match get("MAX_FILE_SIZE_MB") {
            Some(raw) => parse_positive(&raw, "MAX_FILE_SIZE_MB")?,
            None => validation::MAX_FILE_SIZE_MB,
        };

        let extraction_timeout = match get("YTDLP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive(&raw, "YTDLP_TIMEOUT_SECS")?),
            None => download::ytdlp_timeout(),
        };

        Ok(Self {
            bot_token,
            bot_api_url: get("BOT_API_URL"),
            ytdl_bin: get("YTDL_BIN").unwrap_or_else(|| "yt-dlp".to_string()),
            temp_root,
            max_file_size_mb,
            extraction_timeout,
            log_file_path: get("LOG_FILE_PATH").unwrap_or_else(|| "app.log".to_string()),
        })
    }

    /// Size ceiling in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    /// Returns the token or a configuration error naming the variables to set.
    pub fn require_bot_token(&self) -> Result<&SecretString, AppError> {
        self.bot_token
            .as_ref()
            .ok_or_else(|| AppError::Config("BOT_TOKEN environment variable not set".to_string()))
    }
}

fn parse_positive(raw: &str, key: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(AppError::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.bot_token.is_none());
        assert_eq!(config.ytdl_bin, "yt-dlp");
        assert_eq!(config.max_file_size_mb, 50);
        assert_eq!(config.max_file_size_bytes(), 50 * 1024 * 1024);
        assert_eq!(config.extraction_timeout, Duration::from_secs(240));
        assert_eq!(config.log_file_path, "app.log");
        assert_eq!(config.temp_root, env::temp_dir());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("TELOXIDE_TOKEN", "123:abc"),
            ("YTDL_BIN", "/usr/local/bin/yt-dlp"),
            ("TEMP_FILES_DIR", "/var/tmp/relay"),
            ("MAX_FILE_SIZE_MB", "20"),
            ("YTDLP_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.require_bot_token().unwrap().expose_secret(), "123:abc");
        assert_eq!(config.ytdl_bin, "/usr/local/bin/yt-dlp");
        assert_eq!(config.temp_root, PathBuf::from("/var/tmp/relay"));
        assert_eq!(config.max_file_size_bytes(), 20 * 1024 * 1024);
        assert_eq!(config.extraction_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_bot_token_takes_priority() {
        let config = Config::from_lookup(lookup_from(&[("BOT_TOKEN", "first"), ("TELOXIDE_TOKEN", "second")])).unwrap();
        assert_eq!(config.require_bot_token().unwrap().expose_secret(), "first");
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let config = Config::from_lookup(lookup_from(&[("BOT_TOKEN", "  ")])).unwrap();
        assert!(matches!(config.require_bot_token(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("MAX_FILE_SIZE_MB", "lots")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("YTDLP_TIMEOUT_SECS", "0")])).is_err());
    }
}
