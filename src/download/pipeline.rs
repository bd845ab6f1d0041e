//! Relay pipeline orchestrator.
//!
//! One `run` handles one inbound message end to end:
//!   parse → workspace + ack → stage → size check → deliver → retract ack → cleanup
//!
//! Every failure is turned into exactly one reply to the sender and never escapes
//! `run`. The workspace is removed on every exit path.

use async_trait::async_trait;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::{caption, Config};
use crate::core::error::AppError;
use crate::core::utils::{build_caption, format_megabytes};
use crate::download::error::RelayError;
use crate::download::intent::{self, DownloadIntent};
use crate::download::size_guard;
use crate::download::stager::{self, StagedArtifact};
use crate::download::workspace::RunWorkspace;
use crate::download::ytdlp::ExtractionEngine;

/// Handle to a message previously sent through a `ReplySink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage(pub i32);

/// Outbound side of the chat transport, scoped to one inbound message.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<SentMessage, AppError>;

    /// Sends the artifact's file content with a caption.
    async fn send_media(&self, artifact: &StagedArtifact, caption: &str) -> Result<SentMessage, AppError>;

    /// Retracts an earlier message. Transports that cannot delete return `Ok(())`.
    async fn delete_message(&self, message: SentMessage) -> Result<(), AppError>;
}

/// Pipeline states. `Failed` can follow any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Received,
    Parsed,
    Staged,
    Validated,
    Delivered,
}

/// Terminal result of a run.
#[derive(Debug)]
pub enum RunOutcome {
    Delivered { title: String, size_bytes: u64 },
    /// `stage` is the last state reached before the failure
    Failed { stage: RunStage, error: RelayError },
}

impl RunOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, RunOutcome::Delivered { .. })
    }

    pub fn error(&self) -> Option<&RelayError> {
        match self {
            RunOutcome::Delivered { .. } => None,
            RunOutcome::Failed { error, .. } => Some(error),
        }
    }
}

/// Plain values the pipeline needs from configuration.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub temp_root: PathBuf,
    pub max_file_size_bytes: u64,
    pub extraction_timeout: Duration,
}

impl From<&Config> for RelaySettings {
    fn from(config: &Config) -> Self {
        Self {
            temp_root: config.temp_root.clone(),
            max_file_size_bytes: config.max_file_size_bytes(),
            extraction_timeout: config.extraction_timeout,
        }
    }
}

/// Download-and-relay orchestrator. Cheap to clone and share between tasks; runs
/// share nothing but the engine handle.
#[derive(Clone)]
pub struct RelayPipeline {
    engine: Arc<dyn ExtractionEngine>,
    settings: RelaySettings,
}

impl RelayPipeline {
    pub fn new(engine: Arc<dyn ExtractionEngine>, settings: RelaySettings) -> Self {
        Self { engine, settings }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Handles one inbound message.
    pub async fn run(&self, raw_text: &str, sink: &dyn ReplySink) -> RunOutcome {
        // Received → Parsed
        let intent = match intent::parse(raw_text) {
            Ok(intent) => intent,
            Err(e) => {
                log::info!("Rejected message ({}): {}", e.subcategory(), e);
                reply(sink, &rejection_text(&e)).await;
                return RunOutcome::Failed {
                    stage: RunStage::Received,
                    error: e,
                };
            }
        };
        log::info!("Run started: {} at {}", intent.source_url, intent.target_resolution);

        let workspace = match RunWorkspace::create(&self.settings.temp_root).await {
            Ok(ws) => ws,
            Err(e) => {
                log::error!("Failed to create workspace in {}: {}", self.settings.temp_root.display(), e);
                let error = RelayError::Extraction(format!("could not prepare a download directory: {}", e));
                reply(sink, &failure_text(&error)).await;
                return RunOutcome::Failed {
                    stage: RunStage::Parsed,
                    error,
                };
            }
        };

        let ack = match sink
            .send_text(&format!("⏳ Downloading at {}…", intent.target_resolution))
            .await
        {
            Ok(sent) => Some(sent),
            Err(e) => {
                log::warn!("Failed to send progress acknowledgement: {}", e);
                None
            }
        };

        let outcome = match AssertUnwindSafe(self.relay(&intent, &workspace, sink))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                log::error!("Relay of {} panicked: {}", intent.source_url, detail);
                RunOutcome::Failed {
                    stage: RunStage::Parsed,
                    error: RelayError::Extraction("internal error".to_string()),
                }
            }
        };

        if let RunOutcome::Failed { stage, ref error } = outcome {
            let level = if error.is_user_error() {
                log::Level::Info
            } else {
                log::Level::Warn
            };
            log::log!(
                level,
                "Run failed after {:?} for {} ({}): {}",
                stage,
                intent.source_url,
                error.subcategory(),
                error
            );
            reply(sink, &failure_text(error)).await;
        }

        if let Some(sent) = ack {
            if let Err(e) = sink.delete_message(sent).await {
                log::debug!("Could not retract acknowledgement: {}", e);
            }
        }

        workspace.remove().await;
        outcome
    }

    /// Parsed → Staged → Validated → Delivered. Reporting and cleanup stay with `run`.
    async fn relay(&self, intent: &DownloadIntent, workspace: &RunWorkspace, sink: &dyn ReplySink) -> RunOutcome {
        let artifact = match stager::stage(
            self.engine.as_ref(),
            intent,
            workspace,
            self.settings.extraction_timeout,
        )
        .await
        {
            Ok(artifact) => artifact,
            Err(error) => {
                return RunOutcome::Failed {
                    stage: RunStage::Parsed,
                    error,
                }
            }
        };

        if let Err(error) = size_guard::check(&artifact, self.settings.max_file_size_bytes) {
            return RunOutcome::Failed {
                stage: RunStage::Staged,
                error,
            };
        }

        let caption = build_caption(
            &artifact.title,
            &artifact.description,
            caption::DESCRIPTION_PREVIEW_CHARS,
            caption::MAX_CAPTION_CHARS,
        );

        match sink.send_media(&artifact, &caption).await {
            Ok(_) => {
                log::info!(
                    "Delivered '{}' ({}) from {}",
                    artifact.title,
                    format_megabytes(artifact.size_bytes),
                    intent.source_url
                );
                RunOutcome::Delivered {
                    title: artifact.title,
                    size_bytes: artifact.size_bytes,
                }
            }
            Err(e) => {
                log::error!("Failed to deliver {}: {:?}", artifact.file_path.display(), e);
                RunOutcome::Failed {
                    stage: RunStage::Validated,
                    error: RelayError::Delivery(e.to_string()),
                }
            }
        }
    }
}

/// Sends a reply, logging (not propagating) transport failures.
async fn reply(sink: &dyn ReplySink, text: &str) {
    if let Err(e) = sink.send_text(text).await {
        log::error!("Failed to send reply: {}", e);
    }
}

/// Reply for messages that never made it past parsing.
pub fn rejection_text(error: &RelayError) -> String {
    format!(
        "❌ {}.\n\nSend a link, optionally followed by a quality, e.g.:\nhttps://youtu.be/abcd1234 720",
        capitalize(&error.to_string())
    )
}

/// Reply for failures after parsing.
pub fn failure_text(error: &RelayError) -> String {
    match error {
        RelayError::InvalidInput(_) => rejection_text(error),
        RelayError::Extraction(cause) | RelayError::Delivery(cause) => {
            format!("❌ Download failed: {}", cause)
        }
        RelayError::NotFound(_) => "❌ Download failed: the source produced no file. Try again later.".to_string(),
        RelayError::TooLarge {
            size_bytes,
            limit_bytes,
        } => format!(
            "❌ The file is too large to send: {} (limit {}). Try a lower quality, e.g. 360.",
            format_megabytes(*size_bytes),
            format_megabytes(*limit_bytes)
        ),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
