//! Scripted extraction engine

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;

use mediarelay::download::{EngineInfo, ExtractionEngine, ExtractionRequest, RelayError};

/// What the engine does when called
#[derive(Debug, Clone)]
pub enum EngineScript {
    /// Write `(file name, size)` files next to the output template and return the info
    Produce {
        files: Vec<(String, u64)>,
        info: EngineInfo,
    },
    /// Return an engine error without writing anything
    Fail(String),
    /// Write the files, then fail (partial download)
    ProduceThenFail { files: Vec<(String, u64)>, message: String },
    /// Panic inside the engine
    Panic,
}

pub struct MockEngine {
    script: EngineScript,
    requests: Mutex<Vec<ExtractionRequest>>,
    workspaces: Mutex<Vec<PathBuf>>,
}

impl MockEngine {
    pub fn new(script: EngineScript) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
            workspaces: Mutex::new(Vec::new()),
        }
    }

    /// Produces one file of `size` bytes with the given title/description
    pub fn producing(size: u64, title: &str, description: &str) -> Self {
        Self::new(EngineScript::Produce {
            files: vec![("abc123.mp4".to_string(), size)],
            info: EngineInfo {
                title: Some(title.to_string()),
                description: Some(description.to_string()),
                entries: None,
            },
        })
    }

    pub fn failing(message: &str) -> Self {
        Self::new(EngineScript::Fail(message.to_string()))
    }

    pub fn requests(&self) -> Vec<ExtractionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Workspace directories the engine was pointed at
    pub fn workspaces(&self) -> Vec<PathBuf> {
        self.workspaces.lock().unwrap().clone()
    }

    fn write_files(dir: &std::path::Path, files: &[(String, u64)]) {
        for (name, size) in files {
            let file = std::fs::File::create(dir.join(name)).unwrap();
            // Sparse file: the size is what matters, not the content
            file.set_len(*size).unwrap();
        }
    }
}

#[async_trait]
impl ExtractionEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(&self, request: &ExtractionRequest) -> Result<EngineInfo, RelayError> {
        let dir = request.output_template.parent().unwrap().to_path_buf();
        self.requests.lock().unwrap().push(request.clone());
        self.workspaces.lock().unwrap().push(dir.clone());

        match &self.script {
            EngineScript::Produce { files, info } => {
                Self::write_files(&dir, files);
                Ok(info.clone())
            }
            EngineScript::Fail(message) => Err(RelayError::Extraction(message.clone())),
            EngineScript::ProduceThenFail { files, message } => {
                Self::write_files(&dir, files);
                Err(RelayError::Extraction(message.clone()))
            }
            EngineScript::Panic => panic!("engine exploded"),
        }
    }
}
