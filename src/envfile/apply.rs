// ABOUTME: Applies exactly one configuration transform to an env-style file.
// ABOUTME: Delete-then-append ordering makes repeated application a no-op.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::marker::{Marker, MarkerSet, TransformId};

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("configuration file missing: {0}")]
    ConfigMissing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("refusing to transform non-text content in {0}")]
    NotText(PathBuf),
}

/// One transform family instance: which field to write and which marker tag
/// records that it was written. A new service family is a new rule, not new
/// code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRule {
    pub field: String,
    pub marker: TransformId,
}

/// Transform-specific parameters. The marker parameter must be deterministic
/// for given inputs so repeated application hits the marker check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformParams {
    /// Credential-bearing family (Q&A services): a generated connection
    /// credential plus the search-engine endpoint.
    Credential {
        user: String,
        secret: String,
        endpoint: String,
    },
    /// Hardware-identifier-bearing family (sentiment services).
    HardwareId { value: String },
}

impl TransformParams {
    /// The parameter recorded in the marker line.
    pub fn marker_param(&self) -> &str {
        match self {
            TransformParams::Credential { user, .. } => user,
            TransformParams::HardwareId { value } => value,
        }
    }

    /// The value written for the rule's field.
    pub fn field_value(&self) -> String {
        match self {
            TransformParams::Credential {
                user,
                secret,
                endpoint,
            } => inline_credentials(endpoint, user, secret),
            TransformParams::HardwareId { value } => value.clone(),
        }
    }
}

// "https://x:9200" + alice/pw -> "https://alice:pw@x:9200"
fn inline_credentials(endpoint: &str, user: &str, secret: &str) -> String {
    match endpoint.split_once("://") {
        Some((scheme, rest)) => format!("{scheme}://{user}:{secret}@{rest}"),
        None => format!("{user}:{secret}@{endpoint}"),
    }
}

/// Result of applying a transform to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub text: String,
    pub changed: bool,
}

/// Apply `rule` with `params` to `text`.
///
/// The marker check happens before any mutation: if the exact
/// (transform, parameter) marker is already present the input is returned
/// unchanged. Otherwise stale field lines and stale marker lines for this
/// transform are removed, then the new field line and marker line are
/// appended. After the call the field and the marker each occur exactly once,
/// however many times it is invoked.
pub fn apply(text: &str, rule: &TransformRule, params: &TransformParams) -> Applied {
    let markers = MarkerSet::parse(text);
    if markers.contains(&rule.marker, params.marker_param()) {
        return Applied {
            text: text.to_string(),
            changed: false,
        };
    }

    let field_prefix = format!("{}=", rule.field);
    let mut lines: Vec<&str> = text
        .lines()
        .filter(|line| {
            if line.starts_with(&field_prefix) {
                return false;
            }
            match Marker::parse_line(line) {
                Some(m) => m.transform != rule.marker,
                None => true,
            }
        })
        .collect();

    // Drop trailing blank lines so the appended lines sit at the end.
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let field_line = format!("{}{}", field_prefix, params.field_value());
    let marker_line = Marker::new(rule.marker.clone(), params.marker_param()).render();

    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&field_line);
    out.push('\n');
    out.push_str(&marker_line);
    out.push('\n');

    Applied {
        text: out,
        changed: true,
    }
}

/// Apply `rule` to the file at `path`, writing only when the content changed.
/// Returns whether a write happened. Any write failure is fatal for the
/// service's pipeline run.
pub fn apply_file(
    path: &Path,
    rule: &TransformRule,
    params: &TransformParams,
) -> Result<bool, ApplyError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ApplyError::ConfigMissing(path.to_path_buf())
        } else {
            ApplyError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let text =
        std::str::from_utf8(&bytes).map_err(|_| ApplyError::NotText(path.to_path_buf()))?;

    let applied = apply(text, rule, params);
    if applied.changed {
        std::fs::write(path, applied.text.as_bytes()).map_err(|source| ApplyError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(applied.changed)
}
