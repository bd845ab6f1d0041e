//! Reply sink that records calls

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;

use mediarelay::download::{ReplySink, SentMessage, StagedArtifact};
use mediarelay::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Text(String),
    Media {
        file_path: PathBuf,
        /// Whether the file still existed when it was handed over
        existed: bool,
        size_bytes: u64,
        caption: String,
    },
    Delete(i32),
}

pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    next_id: AtomicI32,
    fail_media: bool,
    fail_delete: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(100),
            fail_media: false,
            fail_delete: false,
        }
    }

    /// Sink whose media upload always fails
    pub fn failing_media() -> Self {
        Self {
            fail_media: true,
            ..Self::new()
        }
    }

    /// Sink that cannot delete messages
    pub fn failing_delete() -> Self {
        Self {
            fail_delete: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SinkCall::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn media_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SinkCall::Media { .. }))
            .count()
    }

    fn record(&self, call: SinkCall) -> SentMessage {
        self.calls.lock().unwrap().push(call);
        SentMessage(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn send_text(&self, text: &str) -> Result<SentMessage, AppError> {
        Ok(self.record(SinkCall::Text(text.to_string())))
    }

    async fn send_media(&self, artifact: &StagedArtifact, caption: &str) -> Result<SentMessage, AppError> {
        let call = SinkCall::Media {
            file_path: artifact.file_path.clone(),
            existed: artifact.file_path.exists(),
            size_bytes: artifact.size_bytes,
            caption: caption.to_string(),
        };
        let sent = self.record(call);
        if self.fail_media {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "upload interrupted",
            )));
        }
        Ok(sent)
    }

    async fn delete_message(&self, message: SentMessage) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(SinkCall::Delete(message.0));
        if self.fail_delete {
            return Err(AppError::Config("deleting is not supported".to_string()));
        }
        Ok(())
    }
}
