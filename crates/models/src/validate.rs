use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{SizeViolation, ValidationError};
use crate::id::Kind;
use crate::item::{FOLDER_MIME_TYPE, File, Folder, Item};
use crate::raw::RawItem;

#[allow(clippy::expect_used)]
static CHECKSUM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-fA-F0-9]{32}$").expect("Failed to compile CHECKSUM_PATTERN regex"));

pub(crate) fn checksum(value: &str) -> Result<(), ValidationError> {
    if CHECKSUM_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidChecksum {
            value: value.to_string(),
        })
    }
}

pub(crate) fn mime_type(value: &str, expected: Kind) -> Result<(), ValidationError> {
    let is_folder = value == FOLDER_MIME_TYPE;
    let ok = match expected {
        Kind::Folder => is_folder,
        Kind::File => !is_folder,
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidMimeType {
            mime_type: value.to_string(),
            expected,
        })
    }
}

pub(crate) fn name(id: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::InvalidName { id: id.to_string() })
    } else {
        Ok(())
    }
}

/// A file size as the API hands it over: Drive encodes `size` as a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSize {
    Int(i64),
    Text(String),
    Float(f64),
}

impl RawSize {
    /// Coerces to a byte count, enforcing `ceiling` when given.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSize`] for negative, fractional,
    /// non-numeric or over-ceiling values.
    pub fn coerce(&self, ceiling: Option<u64>) -> Result<u64, ValidationError> {
        let invalid = |reason| ValidationError::InvalidSize {
            value: self.to_string(),
            reason,
        };

        let bytes = match self {
            Self::Int(n) => u64::try_from(*n).map_err(|_| invalid(SizeViolation::Negative))?,
            Self::Text(s) => match s.trim().parse::<i128>() {
                Ok(n) if n < 0 => return Err(invalid(SizeViolation::Negative)),
                Ok(n) => u64::try_from(n).map_err(|_| invalid(SizeViolation::NotAnInteger))?,
                Err(_) => return Err(invalid(SizeViolation::NotAnInteger)),
            },
            Self::Float(_) => return Err(invalid(SizeViolation::NotAnInteger)),
        };

        match ceiling {
            Some(max) if bytes > max => Err(invalid(SizeViolation::OverCeiling(max))),
            _ => Ok(bytes),
        }
    }
}

impl fmt::Display for RawSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<i64> for RawSize {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u64> for RawSize {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or_else(|_| Self::Text(n.to_string()), Self::Int)
    }
}

impl From<i32> for RawSize {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<&str> for RawSize {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawSize {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Turns raw records into validated items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    /// Largest file size accepted; `None` accepts any `u64`.
    pub max_file_size: Option<u64>,
}

impl Validator {
    #[must_use]
    pub fn new(max_file_size: Option<u64>) -> Self {
        Self { max_file_size }
    }

    /// Validates a record, choosing the variant from its mime type.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] hit by any field.
    pub fn item(&self, raw: RawItem) -> Result<Item, ValidationError> {
        if raw.mime_type == FOLDER_MIME_TYPE {
            self.folder(raw).map(Item::Folder)
        } else {
            self.file(raw).map(Item::File)
        }
    }

    /// # Errors
    ///
    /// Returns the first [`ValidationError`] hit by any field. A missing
    /// `size` or `md5Checksum` is reported as [`ValidationError::MissingField`].
    pub fn file(&self, raw: RawItem) -> Result<File, ValidationError> {
        let size = raw.size.ok_or_else(|| ValidationError::MissingField {
            id: raw.id.clone(),
            field: "size",
        })?;
        let md5 = raw.md5_checksum.ok_or_else(|| ValidationError::MissingField {
            id: raw.id.clone(),
            field: "md5Checksum",
        })?;
        File::build(
            &raw.id,
            raw.name,
            raw.mime_type,
            &raw.parents,
            raw.trashed,
            &size,
            md5,
            self.max_file_size,
        )
    }

    /// # Errors
    ///
    /// Returns the first [`ValidationError`] hit by any field.
    pub fn folder(&self, raw: RawItem) -> Result<Folder, ValidationError> {
        Folder::create_with_mime(&raw.id, raw.name, &raw.parents, raw.trashed, raw.mime_type)
    }
}
