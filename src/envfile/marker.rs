// ABOUTME: Idempotency markers embedded as comment lines in config files.
// ABOUTME: Parses marker lines into a typed set keyed by (transform, parameter).

use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformIdError {
    #[error("transform id cannot be empty")]
    Empty,

    #[error("invalid character in transform id: '{0}'")]
    InvalidChar(char),
}

/// Identifies one configuration transform. Doubles as the marker tag written
/// into the file, so the character set excludes ':' and whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformId(String);

impl TransformId {
    pub fn new(value: &str) -> Result<Self, TransformIdError> {
        if value.is_empty() {
            return Err(TransformIdError::Empty);
        }
        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
                return Err(TransformIdError::InvalidChar(c));
            }
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One applied-transform record: "transform X was applied with parameter Y".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    pub transform: TransformId,
    pub param: String,
}

impl Marker {
    pub fn new(transform: TransformId, param: impl Into<String>) -> Self {
        Self {
            transform,
            param: param.into(),
        }
    }

    /// Render as the comment line stored in the file.
    pub fn render(&self) -> String {
        format!("#{}:{}", self.transform, self.param)
    }

    /// Parse a single line as a marker. Returns None for anything that is not
    /// a well-formed marker line (ordinary comments, key=value pairs, blanks).
    pub fn parse_line(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('#')?;
        let (tag, param) = rest.split_once(':')?;
        let transform = TransformId::new(tag).ok()?;
        Some(Self::new(transform, param))
    }
}

/// The set of markers parsed from a file's text.
///
/// Lookup is by exact (transform, parameter) pair rather than substring
/// containment, so a field value that happens to contain marker-like text
/// cannot produce a false positive.
#[derive(Debug, Default, Clone)]
pub struct MarkerSet {
    markers: HashSet<Marker>,
}

impl MarkerSet {
    pub fn parse(text: &str) -> Self {
        let markers = text.lines().filter_map(Marker::parse_line).collect();
        Self { markers }
    }

    /// Has this exact transform been applied with this exact parameter?
    pub fn contains(&self, transform: &TransformId, param: &str) -> bool {
        self.markers
            .contains(&Marker::new(transform.clone(), param))
    }

    /// Has this transform been applied with any parameter?
    pub fn contains_transform(&self, transform: &TransformId) -> bool {
        self.markers.iter().any(|m| &m.transform == transform)
    }
}
