// ABOUTME: Container image reference parsing and validation.
// ABOUTME: Handles formats like nginx, nginx:tag, registry:port/image:tag@digest.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("invalid image reference format: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    registry: Option<String>,
    name: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        for c in input.chars() {
            if !c.is_ascii_alphanumeric()
                && c != '/'
                && c != ':'
                && c != '.'
                && c != '-'
                && c != '_'
                && c != '@'
            {
                return Err(ParseImageRefError::InvalidChar(c));
            }
        }

        let (without_digest, digest) = match input.split_once('@') {
            Some((before, after)) => (before, Some(after.to_string())),
            None => (input, None),
        };

        // The last colon starts the tag unless it belongs to a registry port.
        let (without_tag, tag) = match without_digest.rsplit_once(':') {
            Some((before, after)) => {
                if after.contains('/') {
                    (without_digest, None)
                } else {
                    (before, Some(after.to_string()))
                }
            }
            None => (without_digest, None),
        };

        let (registry, name) = Self::split_registry(without_tag)?;

        let tag = match (&tag, &digest) {
            (None, None) => Some("latest".to_string()),
            _ => tag,
        };

        Ok(Self {
            registry,
            name,
            tag,
            digest,
        })
    }

    // A registry is present when the first path component contains a dot or
    // colon, or is "localhost".
    fn split_registry(input: &str) -> Result<(Option<String>, String), ParseImageRefError> {
        let parts: Vec<&str> = input.splitn(2, '/').collect();

        match parts.as_slice() {
            [name] => Ok((None, (*name).to_string())),
            [first, rest] => {
                if first.contains('.') || first.contains(':') || *first == "localhost" {
                    Ok((Some((*first).to_string()), (*rest).to_string()))
                } else {
                    Ok((None, input.to_string()))
                }
            }
            _ => Err(ParseImageRefError::InvalidFormat(input.to_string())),
        }
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref registry) = self.registry {
            write!(f, "{}/", registry)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(ref tag) = self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(ref digest) = self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}
