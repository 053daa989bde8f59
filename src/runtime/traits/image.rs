// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: Pulling images, optionally with registry credentials.

use super::shared_types::RegistryAuth;
use crate::types::ImageRef;
use async_trait::async_trait;

/// Image operations. Pull is the only primitive the rollout needs: images
/// are always pulled, never existence-checked first.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Pull an image from a registry, optionally authenticated.
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("authentication failed for registry: {0}")]
    AuthenticationFailed(String),

    #[error("pull failed: {0}")]
    PullFailed(String),
}
