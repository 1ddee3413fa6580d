use ahash::AHashMap;
use drivetree_models::{DuplicateGroup, DuplicateStats, File};
use tracing::info;

use crate::node::Node;
use crate::tree::FileTree;

/// Finds files sharing an md5 checksum.
///
/// Two [`File`]s compare equal exactly when their checksums match (ignoring
/// case), so the files themselves serve as the grouping key.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateDetector {
    include_trashed: bool,
}

impl DuplicateDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn include_trashed(mut self, include: bool) -> Self {
        self.include_trashed = include;
        self
    }

    /// Groups every described file in `tree`.
    #[must_use]
    pub fn detect_in_tree(&self, tree: &FileTree) -> DuplicateStats {
        let files: Vec<&File> = tree
            .items()
            .filter_map(|(_, node)| node.as_file().and_then(|f| f.info()))
            .collect();
        self.detect(files)
    }

    /// Groups `files` by checksum, largest waste first.
    #[must_use]
    pub fn detect<'a>(&self, files: impl IntoIterator<Item = &'a File>) -> DuplicateStats {
        // Group by size first; files of different sizes cannot share content.
        let mut size_groups: AHashMap<u64, Vec<&File>> = AHashMap::new();
        let mut seen = 0usize;
        for file in files {
            if file.trashed() && !self.include_trashed {
                continue;
            }
            seen += 1;
            size_groups.entry(file.size()).or_default().push(file);
        }

        let mut groups: Vec<DuplicateGroup> = Vec::new();
        for (_, candidates) in size_groups.into_iter().filter(|(_, group)| group.len() > 1) {
            let mut by_checksum: AHashMap<&File, Vec<File>> = AHashMap::new();
            for file in candidates {
                by_checksum.entry(file).or_default().push(file.clone());
            }
            groups.extend(
                by_checksum
                    .into_values()
                    .filter(|copies| copies.len() > 1)
                    .map(|mut copies| {
                        copies.sort_by(|a, b| a.id().cmp(b.id()));
                        DuplicateGroup::new(copies)
                    }),
            );
        }

        groups.sort_by(|a, b| {
            b.wasted_space
                .cmp(&a.wasted_space)
                .then_with(|| a.checksum().cmp(&b.checksum()))
        });

        let mut stats = DuplicateStats::new();
        for group in groups {
            stats.push(group);
        }

        info!(
            "Found {} duplicate groups among {} files, {} duplicates wasting {} bytes",
            stats.total_groups, seen, stats.total_duplicates, stats.total_wasted_space
        );
        stats
    }
}

/// Files that sit under more than one folder: the same bytes listed twice
/// without being stored twice.
#[must_use]
pub fn multi_parent_files(tree: &FileTree) -> Vec<&File> {
    let mut files: Vec<&File> = tree
        .items()
        .filter_map(|(_, node)| match node {
            Node::File(f) if f.containers().len() > 1 => f.info(),
            _ => None,
        })
        .collect();
    files.sort_by(|a, b| a.id().cmp(b.id()));
    files
}
