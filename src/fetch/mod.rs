// ABOUTME: Materializes prerequisite files from object storage.
// ABOUTME: Existence of the destination file is the idempotency check.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

use crate::config::{ArtifactSpec, StoreSpec};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("object storage tool not found: {0}")]
    ToolMissing(String),

    #[error("fetch of {uri} failed: {detail}")]
    CommandFailed { uri: String, detail: String },

    #[error("failed to create {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
}

/// Outcome of a single fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Destination already exists; nothing transferred.
    AlreadyPresent,
    /// Transferred from object storage.
    Fetched,
}

/// Wraps the object-storage CLI as an external collaborator.
pub struct ObjectStore {
    program: String,
    args: Vec<String>,
}

impl ObjectStore {
    pub fn new(spec: &StoreSpec) -> Self {
        Self {
            program: spec.command.head.clone(),
            args: spec.command.tail.clone(),
        }
    }

    /// Fetch `uri` into `dest` unless `dest` already exists.
    pub async fn fetch(&self, uri: &str, dest: &Path) -> Result<FetchOutcome, FetchError> {
        if dest.exists() {
            tracing::debug!(dest = %dest.display(), "destination present, skipping fetch");
            return Ok(FetchOutcome::AlreadyPresent);
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| FetchError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(uri)
            .arg(dest)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    FetchError::ToolMissing(self.program.clone())
                } else {
                    FetchError::CommandFailed {
                        uri: uri.to_string(),
                        detail: e.to_string(),
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::CommandFailed {
                uri: uri.to_string(),
                detail: format!(
                    "exit {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        Ok(FetchOutcome::Fetched)
    }

    /// Fetch every artifact in order, failing fast on the first error.
    pub async fn fetch_all(&self, artifacts: &[ArtifactSpec]) -> Result<Vec<FetchOutcome>, FetchError> {
        let mut outcomes = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            outcomes.push(self.fetch(&artifact.uri, &artifact.dest).await?);
        }
        Ok(outcomes)
    }
}
