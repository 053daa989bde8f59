// ABOUTME: Classifies a configuration file's current condition.
// ABOUTME: Pure function of (content encoding, idempotency markers); no side effects.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::marker::{MarkerSet, TransformId};

/// Derived configuration state. The decision key for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigState {
    /// Plaintext, transform marker absent.
    UnconfiguredPlaintext,
    /// Plaintext, transform marker present.
    ConfiguredPlaintext,
    /// Binary content; the external crypto tool has sealed the file.
    Encrypted,
}

impl std::fmt::Display for ConfigState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConfigState::UnconfiguredPlaintext => "unconfigured-plaintext",
            ConfigState::ConfiguredPlaintext => "configured-plaintext",
            ConfigState::Encrypted => "encrypted",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Error)]
pub enum InspectError {
    /// Fatal for the service's pipeline run.
    #[error("configuration file missing: {0}")]
    ConfigMissing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
}

/// Classify raw content. Total and disjoint: exactly one state for any input,
/// and classifying the output of classify-preserving operations is stable.
pub fn classify_bytes(bytes: &[u8], transform: &TransformId) -> ConfigState {
    match as_text(bytes) {
        Some(text) => {
            if MarkerSet::parse(text).contains_transform(transform) {
                ConfigState::ConfiguredPlaintext
            } else {
                ConfigState::UnconfiguredPlaintext
            }
        }
        None => ConfigState::Encrypted,
    }
}

/// Classify the file at `path`. A missing file is `ConfigMissing`.
pub fn classify(path: &Path, transform: &TransformId) -> Result<ConfigState, InspectError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            InspectError::ConfigMissing(path.to_path_buf())
        } else {
            InspectError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Ok(classify_bytes(&bytes, transform))
}

// Text/binary heuristic: valid UTF-8, no NUL bytes, and printable-character
// dominant (>= 90% graphic or whitespace). Ciphertext fails all three with
// overwhelming probability.
fn as_text(bytes: &[u8]) -> Option<&str> {
    if bytes.is_empty() {
        return Some("");
    }
    if bytes.contains(&0) {
        return None;
    }
    let text = std::str::from_utf8(bytes).ok()?;

    let total = text.chars().count();
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();

    if printable * 10 >= total * 9 {
        Some(text)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag() -> TransformId {
        TransformId::new("qna-envfile-Configured-with-the-Following-ES-user").unwrap()
    }

    #[test]
    fn plaintext_without_marker_is_unconfigured() {
        let content = b"ES_HOST=localhost\n# a comment\n";
        assert_eq!(
            classify_bytes(content, &tag()),
            ConfigState::UnconfiguredPlaintext
        );
    }

    #[test]
    fn plaintext_with_marker_is_configured() {
        let content =
            b"ES_CONNECTION_LINE=https://alice:pw@x:9200\n#qna-envfile-Configured-with-the-Following-ES-user:alice\n";
        assert_eq!(
            classify_bytes(content, &tag()),
            ConfigState::ConfiguredPlaintext
        );
    }

    #[test]
    fn binary_content_is_encrypted() {
        let content = [0x00, 0x9c, 0x01, 0xff, 0x85, 0x02, 0x03, 0xfe];
        assert_eq!(classify_bytes(&content, &tag()), ConfigState::Encrypted);
    }

    #[test]
    fn empty_file_is_unconfigured_plaintext() {
        assert_eq!(
            classify_bytes(b"", &tag()),
            ConfigState::UnconfiguredPlaintext
        );
    }

    #[test]
    fn a_marker_for_a_different_transform_does_not_count() {
        let other = b"#sentiment-en-envfile-Configured-with-the-Following-MAC:aa\n";
        assert_eq!(
            classify_bytes(other, &tag()),
            ConfigState::UnconfiguredPlaintext
        );
    }

    #[test]
    fn missing_file_is_config_missing() {
        let err = classify(Path::new("/nonexistent/stack/.env"), &tag()).unwrap_err();
        assert!(matches!(err, InspectError::ConfigMissing(_)));
    }
}
