use thiserror::Error;

use crate::id::Kind;

/// Why a size value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeViolation {
    NotAnInteger,
    Negative,
    OverCeiling(u64),
}

/// A raw record field failed validation.
///
/// Raised while constructing identifiers and items; the tree never produces
/// these. Callers decide whether a bad record is skipped or aborts a build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid item id {value:?}: expected at least 25 of [A-Za-z0-9_-]")]
    InvalidId { value: String },

    #[error("invalid mime type {mime_type:?} for a {expected}")]
    InvalidMimeType { mime_type: String, expected: Kind },

    #[error("invalid size {value:?}: {reason}")]
    InvalidSize { value: String, reason: SizeViolation },

    #[error("invalid md5 checksum {value:?}: expected 32 hex characters")]
    InvalidChecksum { value: String },

    #[error("item {id} has an empty name")]
    InvalidName { id: String },

    #[error("record {id} is missing required field `{field}`")]
    MissingField { id: String, field: &'static str },
}

impl std::fmt::Display for SizeViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnInteger => write!(f, "not a non-negative integer"),
            Self::Negative => write!(f, "must not be negative"),
            Self::OverCeiling(max) => write!(f, "exceeds the ceiling of {max} bytes"),
        }
    }
}

impl ValidationError {
    /// Drive field name the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId { .. } => "id",
            Self::InvalidMimeType { .. } => "mimeType",
            Self::InvalidSize { .. } => "size",
            Self::InvalidChecksum { .. } => "md5Checksum",
            Self::InvalidName { .. } => "name",
            Self::MissingField { field, .. } => field,
        }
    }
}
