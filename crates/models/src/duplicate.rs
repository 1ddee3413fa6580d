use smallvec::SmallVec;

use crate::item::File;

/// Files sharing one md5 checksum.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub files: SmallVec<[File; 4]>,
    pub wasted_space: u64, // Bytes freed by keeping a single copy
}

impl DuplicateGroup {
    #[must_use]
    pub fn new(files: impl Into<SmallVec<[File; 4]>>) -> Self {
        let files = files.into();
        let wasted_space = files
            .first()
            .map_or(0, |f| f.size().saturating_mul((files.len() as u64).saturating_sub(1)));
        Self { files, wasted_space }
    }

    #[must_use]
    pub fn checksum(&self) -> Option<&str> {
        self.files.first().map(File::md5_checksum)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DuplicateStats {
    pub total_groups: usize,
    pub total_duplicates: usize,
    pub total_wasted_space: u64,
    pub groups: Vec<DuplicateGroup>,
}

impl DuplicateStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group, keeping the running totals in step.
    pub fn push(&mut self, group: DuplicateGroup) {
        self.total_groups += 1;
        self.total_duplicates += group.files.len().saturating_sub(1);
        self.total_wasted_space = self.total_wasted_space.saturating_add(group.wasted_space);
        self.groups.push(group);
    }

    #[must_use]
    pub fn get_by_checksum(&self, checksum: &str) -> Option<&DuplicateGroup> {
        self.groups
            .iter()
            .find(|g| g.checksum().is_some_and(|c| c.eq_ignore_ascii_case(checksum)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn total_files(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum()
    }
}
