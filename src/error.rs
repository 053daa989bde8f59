// ABOUTME: Application-wide error types for vaultship.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("manifest not found in {0}")]
    ManifestNotFound(PathBuf),

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("required external tool missing: {0}")]
    DependencyMissing(String),

    #[error("configuration file missing: {0}")]
    ConfigMissing(PathBuf),

    #[error("external command failed: {0}")]
    ExternalCommandFailed(String),

    #[error("integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("deployment failed: {0}")]
    Deploy(String),

    #[error("runtime connection failed: {0}")]
    RuntimeConnection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// Module errors collapse into the taxonomy above so every failure exits
// through the same single-line reporting path.

impl From<crate::envfile::InspectError> for Error {
    fn from(err: crate::envfile::InspectError) -> Self {
        use crate::envfile::InspectError;
        match err {
            InspectError::ConfigMissing(path) => Error::ConfigMissing(path),
            InspectError::Read { source, .. } => Error::Io(source),
        }
    }
}

impl From<crate::envfile::ApplyError> for Error {
    fn from(err: crate::envfile::ApplyError) -> Self {
        use crate::envfile::ApplyError;
        match err {
            ApplyError::ConfigMissing(path) => Error::ConfigMissing(path),
            ApplyError::Read { source, .. } | ApplyError::Write { source, .. } => {
                Error::Io(source)
            }
            ApplyError::NotText(path) => Error::IntegrityViolation(format!(
                "cannot configure non-text content in {}",
                path.display()
            )),
        }
    }
}

impl From<crate::crypto::CryptoError> for Error {
    fn from(err: crate::crypto::CryptoError) -> Self {
        use crate::crypto::CryptoError;
        match err {
            CryptoError::ToolMissing(tool) => Error::DependencyMissing(tool),
            CryptoError::CommandFailed { .. } => Error::ExternalCommandFailed(err.to_string()),
            CryptoError::IntegrityViolation { .. } => Error::IntegrityViolation(err.to_string()),
            CryptoError::Inspect(inner) => inner.into(),
        }
    }
}

impl From<crate::fetch::FetchError> for Error {
    fn from(err: crate::fetch::FetchError) -> Self {
        use crate::fetch::FetchError;
        match err {
            FetchError::ToolMissing(tool) => Error::DependencyMissing(tool),
            FetchError::CommandFailed { .. } => Error::ExternalCommandFailed(err.to_string()),
            FetchError::CreateDir { source, .. } => Error::Io(source),
        }
    }
}

impl From<crate::deploy::DeployError> for Error {
    fn from(err: crate::deploy::DeployError) -> Self {
        Error::Deploy(err.to_string())
    }
}

impl From<crate::runtime::ConnectError> for Error {
    fn from(err: crate::runtime::ConnectError) -> Self {
        Error::RuntimeConnection(err.to_string())
    }
}
