use std::fmt;

use thiserror::Error;

/// Which configured ceiling a capacity error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ceiling {
    ControlCount,
    NestingDepth,
    PayloadBytes,
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceiling::ControlCount => write!(f, "control count"),
            Ceiling::NestingDepth => write!(f, "nesting depth"),
            Ceiling::PayloadBytes => write!(f, "payload size"),
        }
    }
}

/// Whole-operation failures. Anything that only affects a single control is
/// reported through `ExtractionIssue` or the restore report instead.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A configured size or count ceiling was exceeded
    #[error("capacity exceeded: {ceiling} is {actual}, limit is {limit}")]
    Capacity {
        ceiling: Ceiling,
        actual: usize,
        limit: usize,
    },

    /// Token could not be split or its payload could not be interpreted
    #[error("malformed token: {0}")]
    Format(String),

    /// Token was written by a format version this decoder does not speak
    #[error("unsupported snapshot version '{found}' (this build reads '{expected}')")]
    Version { found: String, expected: String },

    /// Payload checksum does not match the checksum carried in the token
    #[error("checksum mismatch: token carries {expected}, payload hashes to {actual}")]
    Integrity { expected: String, actual: String },

    /// The document has nothing to scan
    #[error("no document available: {0}")]
    NoDocument(String),

    /// Restore found nothing on the live page to reconcile against
    #[error("no live controls discovered on the page")]
    NoLiveControls,

    /// The presence oracle reported the target framework as absent
    #[error("target not present on page{}", .0.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    TargetAbsent(Option<String>),

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SnapshotError {
    pub fn capacity(ceiling: Ceiling, actual: usize, limit: usize) -> Self {
        SnapshotError::Capacity {
            ceiling,
            actual,
            limit,
        }
    }

    pub fn is_capacity(&self) -> bool {
        matches!(self, SnapshotError::Capacity { .. })
    }
}

/// Failure applying one snapshot value to one live control.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("control is readonly or disabled")]
    ReadonlyOrDisabled,

    #[error("option not found for {}", .0.join(", "))]
    OptionNotFound(Vec<String>),

    #[error("option '{0}' is disabled")]
    OptionDisabled(String),

    #[error("value shape does not fit a {kind} control")]
    ValueShape { kind: String },

    #[error("file inputs cannot be restored")]
    FileInput,

    #[error("component rejected value: {0}")]
    ComponentRejected(String),
}

/// Failure loading or saving a page dump.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("could not access page dump '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid page dump JSON ({context}): {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
