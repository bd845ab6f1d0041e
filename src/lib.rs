//! mediarelay - Telegram bot that relays short-lived media downloads
//!
//! A user sends a link (and optionally a quality), the bot downloads the matching
//! stream with yt-dlp into a per-run temporary directory, checks the size, sends the
//! file back and removes everything it staged.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, process helpers
//! - `download`: intent parsing, format selection, staging, size policy, pipeline
//! - `telegram`: bot construction, dispatcher schema, Telegram reply sink
//! - `cli`: command line interface and the local console sink

pub mod cli;
pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, Config};
pub use crate::download::{RelayError, RelayPipeline, RelaySettings, ReplySink, RunOutcome};
