//! Mock collaborators for pipeline tests
//!
//! A scripted extraction engine that writes files into the workspace (or fails) and a
//! reply sink that records every call, so runs can be exercised without network or
//! Telegram access.

pub mod mock_engine;
pub mod recording_sink;

pub use mock_engine::{EngineScript, MockEngine};
pub use recording_sink::{RecordingSink, SinkCall};
