//! Artifact delivery: where finished exports go.

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A finished export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name including extension
    pub filename: String,
    /// MIME type
    pub mime: String,
    /// File content
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Create an artifact.
    pub fn new(filename: impl Into<String>, mime: &str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime: mime.to_string(),
            bytes,
        }
    }
}

/// Receives artifacts, the equivalent of a browser download.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Deliver an artifact. Returns a human-readable location.
    async fn deliver(&self, artifact: Artifact) -> Result<String>;
}

/// Writes artifacts into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create a sink writing into `dir`; the directory is created on demand.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn deliver(&self, artifact: Artifact) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&artifact.filename);
        tokio::fs::write(&path, &artifact.bytes).await?;
        log::debug!("Wrote {} ({} bytes)", path.display(), artifact.bytes.len());
        Ok(path.display().to_string())
    }
}

/// Keeps artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<Vec<Artifact>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every delivered artifact, oldest first.
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.artifacts
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    /// Filenames of every delivered artifact.
    pub fn filenames(&self) -> Vec<String> {
        self.artifacts().into_iter().map(|a| a.filename).collect()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn deliver(&self, artifact: Artifact) -> Result<String> {
        let name = artifact.filename.clone();
        if let Ok(mut artifacts) = self.artifacts.lock() {
            artifacts.push(artifact);
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));
        let location = sink
            .deliver(Artifact::new("cv.png", "image/png", vec![1, 2, 3]))
            .await
            .unwrap();
        assert!(location.ends_with("cv.png"));
        assert_eq!(std::fs::read(dir.path().join("out/cv.png")).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.deliver(Artifact::new("a.pdf", "application/pdf", vec![]))
            .await
            .unwrap();
        assert_eq!(sink.filenames(), vec!["a.pdf".to_string()]);
    }
}
