// ABOUTME: Gateway to the external encrypt/decrypt tool.
// ABOUTME: One subprocess invocation per call, postcondition verified, no retry.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

use crate::config::CryptoToolSpec;
use crate::envfile::{ConfigState, InspectError, TransformId, classify};

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("crypto tool not found: {0}")]
    ToolMissing(String),

    #[error("crypto tool failed ({op} {path}): {detail}")]
    CommandFailed {
        op: &'static str,
        path: PathBuf,
        detail: String,
    },

    #[error("integrity violation: {op} reported success but {path} is still {state}")]
    IntegrityViolation {
        op: &'static str,
        path: PathBuf,
        state: ConfigState,
    },

    #[error(transparent)]
    Inspect(#[from] InspectError),
}

#[derive(Debug, Clone, Copy)]
enum CryptoOp {
    Encrypt,
    Decrypt,
}

impl CryptoOp {
    fn as_str(self) -> &'static str {
        match self {
            CryptoOp::Encrypt => "encrypt",
            CryptoOp::Decrypt => "decrypt",
        }
    }
}

/// Invokes the external crypto tool and verifies the resulting state.
///
/// The tool is assumed atomic: either the file ends fully transformed or the
/// call fails and the file is untouched. A success report that did not flip
/// the file's encoding is a fatal integrity error, never silently retried.
pub struct CryptoGateway {
    program: String,
    args: Vec<String>,
    prompt: bool,
}

impl CryptoGateway {
    pub fn new(spec: &CryptoToolSpec) -> Self {
        Self {
            program: spec.command.head.clone(),
            args: spec.command.tail.clone(),
            prompt: spec.prompt,
        }
    }

    /// Encrypt `path`. Caller guarantees the file classifies as
    /// configured-plaintext; afterwards it must classify as encrypted.
    pub async fn encrypt(
        &self,
        path: &Path,
        transform: &TransformId,
    ) -> Result<(), CryptoError> {
        self.run(CryptoOp::Encrypt, path).await?;
        match classify(path, transform)? {
            ConfigState::Encrypted => Ok(()),
            state => Err(CryptoError::IntegrityViolation {
                op: "encrypt",
                path: path.to_path_buf(),
                state,
            }),
        }
    }

    /// Decrypt `path`. Caller guarantees the file classifies as encrypted;
    /// afterwards it must classify as plaintext.
    pub async fn decrypt(
        &self,
        path: &Path,
        transform: &TransformId,
    ) -> Result<(), CryptoError> {
        self.run(CryptoOp::Decrypt, path).await?;
        match classify(path, transform)? {
            ConfigState::Encrypted => Err(CryptoError::IntegrityViolation {
                op: "decrypt",
                path: path.to_path_buf(),
                state: ConfigState::Encrypted,
            }),
            _ => Ok(()),
        }
    }

    async fn run(&self, op: CryptoOp, path: &Path) -> Result<(), CryptoError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(op.as_str()).arg(path);
        if !self.prompt {
            cmd.arg("--no-prompt");
        }
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        tracing::debug!(tool = %self.program, op = op.as_str(), path = %path.display(), "invoking crypto tool");

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CryptoError::ToolMissing(self.program.clone())
            } else {
                CryptoError::CommandFailed {
                    op: op.as_str(),
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CryptoError::CommandFailed {
                op: op.as_str(),
                path: path.to_path_buf(),
                detail: format!(
                    "exit {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        Ok(())
    }
}
