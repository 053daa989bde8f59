// ABOUTME: Error types for deployment operations.
// ABOUTME: Covers image pull, registry auth, and container lifecycle failures.

use crate::runtime::ContainerError;

/// Errors that can occur during rollout state transitions.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Image pull failed after the one permitted login retry.
    #[error("failed to pull image: {0}")]
    ImagePullFailed(String),

    /// Registry credentials could not be obtained.
    #[error("registry login failed: {0}")]
    LoginFailed(String),

    /// Container creation failed.
    #[error("failed to create container: {0}")]
    ContainerCreateFailed(String),

    /// Container start failed.
    #[error("failed to start container: {0}")]
    ContainerStartFailed(String),

    /// Stale container removal failed.
    #[error("failed to remove container: {0}")]
    ContainerRemoveFailed(String),

    /// Other runtime failure.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl From<ContainerError> for DeployError {
    fn from(err: ContainerError) -> Self {
        DeployError::Runtime(err.to_string())
    }
}
