//! Download-and-relay core: intent parsing, format selection, staging, size policy
//! and the pipeline that ties them together.

pub mod error;
pub mod format;
pub mod intent;
pub mod pipeline;
pub mod size_guard;
pub mod stager;
pub mod workspace;
pub mod ytdlp;
pub mod ytdlp_errors;

// Re-exports for convenience
pub use error::RelayError;
pub use intent::{DownloadIntent, Resolution};
pub use pipeline::{RelayPipeline, RelaySettings, ReplySink, RunOutcome, RunStage, SentMessage};
pub use stager::StagedArtifact;
pub use workspace::RunWorkspace;
pub use ytdlp::{EngineInfo, ExtractionEngine, ExtractionRequest, YtDlpEngine};
