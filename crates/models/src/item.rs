use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use smallvec::SmallVec;

use crate::error::ValidationError;
use crate::id::{AnyItemId, ItemId, ItemKind, Kind, private::Sealed};
use crate::validate::{self, RawSize};

/// Mime type Drive reserves for folders; the only File/Folder discriminant.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

pub type Parents = SmallVec<[ItemId<Folder>; 2]>;

fn parse_parents<P: AsRef<str>>(parents: &[P]) -> Result<Parents, ValidationError> {
    parents.iter().map(|p| ItemId::parse(p.as_ref())).collect()
}

/// A leaf item.
///
/// Two files are equal when their md5 checksums match (ignoring hex case), no
/// matter their ids or locations, and they hash the same way. This is what
/// lets identical content stored twice collapse into one duplicate group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    id: ItemId<File>,
    name: String,
    mime_type: String,
    parents: Parents,
    trashed: bool,
    size: u64,
    md5_checksum: String,
}

impl Sealed for File {}

impl ItemKind for File {
    const KIND: Kind = Kind::File;
}

impl File {
    /// Validates every field and builds a file.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidId`] for a bad `id` or any bad `parents` entry
    /// - [`ValidationError::InvalidName`] for an empty name
    /// - [`ValidationError::InvalidMimeType`] if `mime_type` is the folder mime type
    /// - [`ValidationError::InvalidSize`] for negative or non-integer sizes
    /// - [`ValidationError::InvalidChecksum`] unless `md5_checksum` is 32 hex characters
    #[allow(clippy::too_many_arguments)]
    pub fn create<P: AsRef<str>>(
        id: &str,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        parents: &[P],
        trashed: bool,
        size: impl Into<RawSize>,
        md5_checksum: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::build(
            id,
            name.into(),
            mime_type.into(),
            parents,
            trashed,
            &size.into(),
            md5_checksum.into(),
            None,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn build<P: AsRef<str>>(
        id: &str,
        name: String,
        mime_type: String,
        parents: &[P],
        trashed: bool,
        size: &RawSize,
        md5_checksum: String,
        max_size: Option<u64>,
    ) -> Result<Self, ValidationError> {
        let id = ItemId::parse(id)?;
        validate::name(id.as_str(), &name)?;
        validate::mime_type(&mime_type, Kind::File)?;
        let parents = parse_parents(parents)?;
        let size = size.coerce(max_size)?;
        validate::checksum(&md5_checksum)?;

        Ok(Self {
            id,
            name,
            mime_type,
            parents,
            trashed,
            size,
            md5_checksum,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ItemId<File> {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn parents(&self) -> &[ItemId<Folder>] {
        &self.parents
    }

    #[must_use]
    pub fn trashed(&self) -> bool {
        self.trashed
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub fn md5_checksum(&self) -> &str {
        &self.md5_checksum
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.md5_checksum.eq_ignore_ascii_case(&other.md5_checksum)
    }
}

impl Eq for File {}

impl Hash for File {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.md5_checksum.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

/// A container item. Equality and hashing use the id only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    id: ItemId<Folder>,
    name: String,
    mime_type: String,
    parents: Parents,
    trashed: bool,
}

impl Sealed for Folder {}

impl ItemKind for Folder {
    const KIND: Kind = Kind::Folder;
}

impl Folder {
    /// Builds a folder carrying [`FOLDER_MIME_TYPE`].
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidId`] for a bad `id` or parent id,
    /// [`ValidationError::InvalidName`] for an empty name.
    pub fn create<P: AsRef<str>>(
        id: &str,
        name: impl Into<String>,
        parents: &[P],
        trashed: bool,
    ) -> Result<Self, ValidationError> {
        Self::create_with_mime(id, name, parents, trashed, FOLDER_MIME_TYPE)
    }

    /// # Errors
    ///
    /// As [`Folder::create`], plus [`ValidationError::InvalidMimeType`] when
    /// `mime_type` is not [`FOLDER_MIME_TYPE`].
    pub fn create_with_mime<P: AsRef<str>>(
        id: &str,
        name: impl Into<String>,
        parents: &[P],
        trashed: bool,
        mime_type: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let id = ItemId::parse(id)?;
        let name = name.into();
        let mime_type = mime_type.into();
        validate::name(id.as_str(), &name)?;
        validate::mime_type(&mime_type, Kind::Folder)?;
        let parents = parse_parents(parents)?;

        Ok(Self {
            id,
            name,
            mime_type,
            parents,
            trashed,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ItemId<Folder> {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn parents(&self) -> &[ItemId<Folder>] {
        &self.parents
    }

    #[must_use]
    pub fn trashed(&self) -> bool {
        self.trashed
    }
}

impl PartialEq for Folder {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Folder {}

impl Hash for Folder {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Either variant, as produced by the validation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    File(File),
    Folder(Folder),
}

impl Item {
    #[must_use]
    pub fn id(&self) -> AnyItemId {
        match self {
            Item::File(f) => f.id.erase(),
            Item::Folder(f) => f.id.erase(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Item::File(_) => Kind::File,
            Item::Folder(_) => Kind::Folder,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Item::File(f) => f.name(),
            Item::Folder(f) => f.name(),
        }
    }

    #[must_use]
    pub fn parents(&self) -> &[ItemId<Folder>] {
        match self {
            Item::File(f) => f.parents(),
            Item::Folder(f) => f.parents(),
        }
    }

    #[must_use]
    pub fn trashed(&self) -> bool {
        match self {
            Item::File(f) => f.trashed(),
            Item::Folder(f) => f.trashed(),
        }
    }

    /// Own size for files; folders have no intrinsic size.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        match self {
            Item::File(f) => Some(f.size()),
            Item::Folder(_) => None,
        }
    }
}

impl From<File> for Item {
    fn from(file: File) -> Self {
        Item::File(file)
    }
}

impl From<Folder> for Item {
    fn from(folder: Folder) -> Self {
        Item::Folder(folder)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} ({})", self.kind(), self.name(), self.id())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    use super::*;
    use std::collections::HashSet;

    const FILE_ID: &str = "1fileAAAAAAAAAAAAAAAAAAAAAAAA";
    const OTHER_FILE_ID: &str = "1fileBBBBBBBBBBBBBBBBBBBBBBBB";
    const FOLDER_ID: &str = "1folderAAAAAAAAAAAAAAAAAAAAAA";
    const MD5: &str = "9e107d9d372bb6826bd81d3542a419d6";

    fn create_test_file(id: &str, md5: &str) -> File {
        File::create(id, "report.pdf", "application/pdf", &[FOLDER_ID], false, "2048", md5).unwrap()
    }

    #[test]
    fn test_file_fields_round_trip() {
        let file = File::create(
            FILE_ID,
            "holiday.jpg",
            "image/jpeg",
            &[FOLDER_ID],
            true,
            "5242880",
            MD5,
        )
        .unwrap();

        assert_eq!(file.id().as_str(), FILE_ID);
        assert_eq!(file.name(), "holiday.jpg");
        assert_eq!(file.mime_type(), "image/jpeg");
        assert_eq!(file.parents().len(), 1);
        assert_eq!(file.parents()[0].as_str(), FOLDER_ID);
        assert!(file.trashed());
        assert_eq!(file.size(), 5 * 1024 * 1024);
        assert_eq!(file.md5_checksum(), MD5);
    }

    #[test]
    fn test_file_accepts_integer_size() {
        let file = File::create(FILE_ID, "a.bin", "application/octet-stream", &[] as &[&str], false, 100_i64, MD5)
            .unwrap();
        assert_eq!(file.size(), 100);
        assert!(file.parents().is_empty());
    }

    #[test]
    fn test_file_rejects_folder_mime_type() {
        let err = File::create(FILE_ID, "x", FOLDER_MIME_TYPE, &[FOLDER_ID], false, 1_i64, MD5).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidMimeType {
                mime_type: FOLDER_MIME_TYPE.to_string(),
                expected: Kind::File,
            }
        );
    }

    #[test]
    fn test_file_error_kinds() {
        let bad_id = File::create("short", "x", "text/plain", &[FOLDER_ID], false, 1_i64, MD5);
        assert!(matches!(bad_id, Err(ValidationError::InvalidId { .. })));

        let bad_parent = File::create(FILE_ID, "x", "text/plain", &["nope"], false, 1_i64, MD5);
        assert_eq!(
            bad_parent.unwrap_err(),
            ValidationError::InvalidId {
                value: "nope".to_string()
            }
        );

        let bad_size = File::create(FILE_ID, "x", "text/plain", &[FOLDER_ID], false, -3_i64, MD5);
        assert!(matches!(bad_size, Err(ValidationError::InvalidSize { .. })));

        let bad_md5 = File::create(FILE_ID, "x", "text/plain", &[FOLDER_ID], false, 1_i64, "xyz");
        assert!(matches!(bad_md5, Err(ValidationError::InvalidChecksum { .. })));

        let bad_name = File::create(FILE_ID, "", "text/plain", &[FOLDER_ID], false, 1_i64, MD5);
        assert!(matches!(bad_name, Err(ValidationError::InvalidName { .. })));
    }

    #[test]
    fn test_folder_fields_round_trip() {
        let folder = Folder::create(FOLDER_ID, "Photos", &[] as &[&str], false).unwrap();
        assert_eq!(folder.id().as_str(), FOLDER_ID);
        assert_eq!(folder.name(), "Photos");
        assert_eq!(folder.mime_type(), FOLDER_MIME_TYPE);
        assert!(folder.parents().is_empty());
        assert!(!folder.trashed());
    }

    #[test]
    fn test_folder_rejects_other_mime_type() {
        let err = Folder::create_with_mime(FOLDER_ID, "Photos", &[] as &[&str], false, "image/png").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidMimeType {
                mime_type: "image/png".to_string(),
                expected: Kind::Folder,
            }
        );
    }

    #[test]
    fn test_files_with_same_checksum_are_equal() {
        let a = create_test_file(FILE_ID, MD5);
        let b = create_test_file(OTHER_FILE_ID, &MD5.to_uppercase());
        assert_ne!(a.id(), b.id());
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_files_with_different_checksum_differ() {
        let a = create_test_file(FILE_ID, MD5);
        let b = create_test_file(FILE_ID, "d41d8cd98f00b204e9800998ecf8427e");
        assert_ne!(a, b);
    }

    #[test]
    fn test_folders_compare_by_id() {
        let a = Folder::create(FOLDER_ID, "Photos", &[] as &[&str], false).unwrap();
        let b = Folder::create(FOLDER_ID, "Renamed", &[FILE_ID], true).unwrap();
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_item_accessors() {
        let item = Item::from(create_test_file(FILE_ID, MD5));
        assert_eq!(item.kind(), Kind::File);
        assert_eq!(item.id().as_str(), FILE_ID);
        assert_eq!(item.size(), Some(2048));
        assert_eq!(item.parents().len(), 1);

        let folder = Item::from(Folder::create(FOLDER_ID, "Docs", &[] as &[&str], false).unwrap());
        assert_eq!(folder.size(), None);
        assert_eq!(folder.to_string(), format!("folder \"Docs\" ({FOLDER_ID})"));
    }

    #[test]
    fn test_item_serializes_with_kind_tag() {
        let item = Item::from(create_test_file(FILE_ID, MD5));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["md5Checksum"], MD5);
        assert_eq!(json["parents"][0], FOLDER_ID);
    }
}
