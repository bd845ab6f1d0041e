//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A one-shot dump of the effective configuration

use anyhow::Result;
use simplelog::*;
use std::fs::File;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger is already installed
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup.
///
/// The bot token is never printed, only whether it is present.
pub fn log_configuration(config: &crate::core::config::Config) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("⚙️  Relay configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("YTDL_BIN: {}", config.ytdl_bin);
    log::info!("TEMP_FILES_DIR: {}", config.temp_root.display());
    log::info!("MAX_FILE_SIZE_MB: {}", config.max_file_size_mb);
    log::info!("YTDLP_TIMEOUT_SECS: {}", config.extraction_timeout.as_secs());
    match config.bot_api_url {
        Some(ref url) => log::info!("BOT_API_URL: {}", url),
        None => log::info!("BOT_API_URL: not set (using api.telegram.org)"),
    }
    if config.bot_token.is_some() {
        log::info!("✅ Bot token configured");
    } else {
        log::warn!("⚠️  BOT_TOKEN / TELOXIDE_TOKEN: not set");
    }
    if !config.temp_root.exists() {
        log::warn!(
            "⚠️  TEMP_FILES_DIR {} does not exist yet, it will be created on first run",
            config.temp_root.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::NamedTempFile;

    #[test]
    fn test_init_logger_creates_log_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        // A logger may already be installed by another test in this binary,
        // so only the file creation is asserted.
        let _ = init_logger(path);
        assert!(temp_file.path().exists());
    }

    #[test]
    fn test_init_logger_rejects_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("app.log");
        assert!(init_logger(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_log_configuration_runs_without_logger() {
        let config = crate::core::config::Config::from_lookup(|_| None).unwrap();
        log_configuration(&config);
    }
}
