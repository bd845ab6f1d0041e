use thiserror::Error;

use crate::download::error::RelayError;

/// Centralized error types for the application
///
/// Everything outside a single relay run (bot startup, configuration, transport calls)
/// converges on this enum. Failures inside a run are `RelayError`s and never leave the
/// pipeline; they only show up here when a sink call wraps them.
///
/// # Example
///
/// ```no_run
/// use mediarelay::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or malformed configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Relay run errors
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    /// Anyhow errors (for general error handling)
    #[error("Application error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
