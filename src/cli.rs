use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::core::error::AppError;
use crate::core::utils::escape_filename;
use crate::download::pipeline::{ReplySink, SentMessage};
use crate::download::stager::StagedArtifact;

#[derive(Parser)]
#[command(name = "mediarelay")]
#[command(author, version, about = "Telegram bot that relays media downloads back into the chat", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (long polling)
    Run,

    /// Run one relay locally, exactly as if the text had been sent to the bot
    Fetch {
        /// Source URL
        url: String,

        /// Target quality (144, 240, 360, 720, 1080); anything else means 360
        quality: Option<String>,

        /// Directory the delivered file is copied into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Print the yt-dlp format expression used for every supported quality
    Formats,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Commands {
    /// Message text equivalent of a `fetch` invocation
    pub fn fetch_text(url: &str, quality: Option<&str>) -> String {
        match quality {
            Some(q) => format!("{} {}", url, q),
            None => url.to_string(),
        }
    }
}

/// `ReplySink` for local runs: replies go to stdout, media is copied to a directory.
pub struct ConsoleSink {
    output_dir: PathBuf,
    next_id: AtomicI32,
}

impl ConsoleSink {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            next_id: AtomicI32::new(1),
        }
    }

    fn next(&self) -> SentMessage {
        SentMessage(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[async_trait]
impl ReplySink for ConsoleSink {
    async fn send_text(&self, text: &str) -> Result<SentMessage, AppError> {
        println!("{}", text);
        Ok(self.next())
    }

    async fn send_media(&self, artifact: &StagedArtifact, caption: &str) -> Result<SentMessage, AppError> {
        let extension = artifact
            .file_path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mp4".to_string());
        let target = self
            .output_dir
            .join(format!("{}.{}", escape_filename(&artifact.title), extension));

        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::copy(&artifact.file_path, &target).await?;

        println!("✅ Saved {}", target.display());
        println!("{}", caption);
        Ok(self.next())
    }

    async fn delete_message(&self, _message: SentMessage) -> Result<(), AppError> {
        Ok(())
    }
}
