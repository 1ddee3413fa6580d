use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::DuplicateStats;
use crate::id::ItemId;
use crate::item::File;

const LARGEST_FILES: usize = 10;

/// Coarse grouping of mime types for reporting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum MimeCategory {
    Image,
    Video,
    Audio,
    Document,
    Archive,
    Workspace,
    Other,
}

impl fmt::Display for MimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MimeCategory::Image => write!(f, "Image"),
            MimeCategory::Video => write!(f, "Video"),
            MimeCategory::Audio => write!(f, "Audio"),
            MimeCategory::Document => write!(f, "Document"),
            MimeCategory::Archive => write!(f, "Archive"),
            MimeCategory::Workspace => write!(f, "Workspace"),
            MimeCategory::Other => write!(f, "Others"),
        }
    }
}

/// Totals over one finished tree.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub total_files: usize,
    pub total_folders: usize,
    pub placeholder_folders: usize, // referenced as a parent, never listed
    pub trashed_items: usize,
    pub total_size: u64,
    pub category_counts: AHashMap<MimeCategory, usize>,
    pub category_sizes: AHashMap<MimeCategory, u64>,
    pub largest_files: Vec<(ItemId<File>, String, u64)>,
    pub duplicate_count: usize,
    pub duplicate_size: u64,
}

impl Statistics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_file(&mut self, file: &File, category: MimeCategory) {
        self.total_files += 1;
        self.total_size = self.total_size.saturating_add(file.size());
        if file.trashed() {
            self.trashed_items += 1;
        }
        *self.category_counts.entry(category).or_insert(0) += 1;
        let bytes = self.category_sizes.entry(category).or_insert(0);
        *bytes = bytes.saturating_add(file.size());

        self.largest_files
            .push((file.id().clone(), file.name().to_string(), file.size()));
        if self.largest_files.len() > LARGEST_FILES * 2 {
            self.truncate_largest();
        }
    }

    pub fn record_folder(&mut self, placeholder: bool, trashed: bool) {
        self.total_folders += 1;
        if placeholder {
            self.placeholder_folders += 1;
        }
        if trashed {
            self.trashed_items += 1;
        }
    }

    pub fn record_duplicates(&mut self, duplicates: &DuplicateStats) {
        self.duplicate_count = duplicates.total_duplicates;
        self.duplicate_size = duplicates.total_wasted_space;
    }

    /// Sorts and trims the largest-file list; call once all files are recorded.
    pub fn finish(&mut self) {
        self.truncate_largest();
    }

    fn truncate_largest(&mut self) {
        self.largest_files
            .sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
        self.largest_files.truncate(LARGEST_FILES);
    }
}
