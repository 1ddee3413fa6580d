mod duplicate;
mod error;
pub mod id;
mod item;
mod raw;
mod statistics;
mod validate;

pub use duplicate::{DuplicateGroup, DuplicateStats};
pub use error::{SizeViolation, ValidationError};
pub use id::{AnyItemId, ItemId, ItemKind, Kind};
pub use item::{FOLDER_MIME_TYPE, File, Folder, Item, Parents};
pub use raw::{FilePage, RawItem};
pub use statistics::{MimeCategory, Statistics};
pub use validate::{RawSize, Validator};

pub type FileId = ItemId<File>;
pub type FolderId = ItemId<Folder>;
