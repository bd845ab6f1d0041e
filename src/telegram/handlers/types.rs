//! Handler types and dependencies

use teloxide::types::UserId;
use tokio_util::task::TaskTracker;

use crate::download::pipeline::RelayPipeline;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub pipeline: RelayPipeline,
    /// In-flight relay runs; drained on shutdown so every run gets to clean up
    pub runs: TaskTracker,
    pub bot_username: Option<String>,
    pub bot_id: UserId,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(pipeline: RelayPipeline, runs: TaskTracker, bot_username: Option<String>, bot_id: UserId) -> Self {
        Self {
            pipeline,
            runs,
            bot_username,
            bot_id,
        }
    }
}
