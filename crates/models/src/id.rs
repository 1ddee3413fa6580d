//! Validated, kind-tagged identifiers of drive items.
//!
//! An identifier is a raw drive id that matches `[-\w]{25,}`. [`ItemId`]
//! carries the item kind in its type, [`AnyItemId`] carries it as a value.
//! Both compare and hash by the raw string alone.
//!
//! The tag is an assertion made by whoever parses the id: nothing checks that
//! the id really names an item of that kind. Callers own that obligation; the
//! tree reports a `KindMismatch` if the two ever meet.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

#[allow(clippy::expect_used)]
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-\w]{25,}$").expect("Failed to compile ID_PATTERN regex"));

/// Returns `true` when `raw` is a syntactically valid item id.
#[must_use]
pub fn is_valid_id(raw: &str) -> bool {
    ID_PATTERN.is_match(raw)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    File,
    Folder,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::File => write!(f, "file"),
            Kind::Folder => write!(f, "folder"),
        }
    }
}

pub(crate) mod private {
    pub trait Sealed {}
}

/// Type-level tag for the two item variants.
pub trait ItemKind: private::Sealed {
    const KIND: Kind;
}

/// Item id statically tagged with the kind of item it names.
pub struct ItemId<K> {
    raw: Arc<str>,
    kind: PhantomData<fn() -> K>,
}

impl<K: ItemKind> ItemId<K> {
    /// Parses `raw` as an id of kind `K`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidId`] if `raw` does not match `[-\w]{25,}`.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = raw.as_ref();
        if !is_valid_id(raw) {
            return Err(ValidationError::InvalidId { value: raw.to_string() });
        }
        Ok(Self {
            raw: raw.into(),
            kind: PhantomData,
        })
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        K::KIND
    }

    /// Moves the static tag into a value.
    #[must_use]
    pub fn erase(&self) -> AnyItemId {
        AnyItemId {
            raw: Arc::clone(&self.raw),
            kind: K::KIND,
        }
    }
}

impl<K> ItemId<K> {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl<K> Clone for ItemId<K> {
    fn clone(&self) -> Self {
        Self {
            raw: Arc::clone(&self.raw),
            kind: PhantomData,
        }
    }
}

impl<K> AsRef<str> for ItemId<K> {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl<K> PartialEq for ItemId<K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K> Eq for ItemId<K> {}

impl<K> Hash for ItemId<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<K> PartialOrd for ItemId<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for ItemId<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<K: ItemKind> fmt::Debug for ItemId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId<{}>({:?})", K::KIND, self.raw)
    }
}

impl<K> fmt::Display for ItemId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl<K> Serialize for ItemId<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de, K: ItemKind> Deserialize<'de> for ItemId<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}

/// Item id whose kind tag is only known at runtime.
#[derive(Clone, Serialize, Deserialize)]
pub struct AnyItemId {
    #[serde(rename = "id")]
    raw: Arc<str>,
    kind: Kind,
}

impl AnyItemId {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidId`] if `raw` does not match `[-\w]{25,}`.
    pub fn parse(raw: impl AsRef<str>, kind: Kind) -> Result<Self, ValidationError> {
        let raw = raw.as_ref();
        if !is_valid_id(raw) {
            return Err(ValidationError::InvalidId { value: raw.to_string() });
        }
        Ok(Self { raw: raw.into(), kind })
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Recovers the static tag, or `None` if this id was tagged otherwise.
    #[must_use]
    pub fn downcast<K: ItemKind>(&self) -> Option<ItemId<K>> {
        (self.kind == K::KIND).then(|| ItemId {
            raw: Arc::clone(&self.raw),
            kind: PhantomData,
        })
    }
}

impl<K: ItemKind> From<ItemId<K>> for AnyItemId {
    fn from(id: ItemId<K>) -> Self {
        Self {
            raw: id.raw,
            kind: K::KIND,
        }
    }
}

impl<K: ItemKind> From<&ItemId<K>> for AnyItemId {
    fn from(id: &ItemId<K>) -> Self {
        id.erase()
    }
}

impl AsRef<str> for AnyItemId {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for AnyItemId {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for AnyItemId {}

impl Hash for AnyItemId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must hash exactly like `str` for the `Borrow<str>` lookups.
        self.as_str().hash(state);
    }
}

impl Borrow<str> for AnyItemId {
    fn borrow(&self) -> &str {
        &self.raw
    }
}

impl PartialOrd for AnyItemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnyItemId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl fmt::Debug for AnyItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyItemId<{}>({:?})", self.kind, self.raw)
    }
}

impl fmt::Display for AnyItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
