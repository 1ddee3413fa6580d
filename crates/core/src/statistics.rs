use drivetree_models::{DuplicateStats, Statistics};
use drivetree_utils::categorize;

use crate::node::Node;
use crate::tree::FileTree;

/// Tallies a finished tree.
///
/// Each file is counted once, however many folders list it. Files whose own
/// record never arrived are known only by id and are skipped.
#[must_use]
pub fn collect(tree: &FileTree, duplicates: Option<&DuplicateStats>) -> Statistics {
    let mut stats = Statistics::new();
    for (_, node) in tree.items() {
        match node {
            Node::File(file) => {
                if let Some(info) = file.info() {
                    stats.record_file(info, categorize(info.mime_type()));
                }
            }
            Node::Folder(folder) => {
                let trashed = folder.info().is_some_and(|f| f.trashed());
                stats.record_folder(folder.is_placeholder(), trashed);
            }
            Node::Segment(_) => {}
        }
    }
    if let Some(duplicates) = duplicates {
        stats.record_duplicates(duplicates);
    }
    stats.finish();
    stats
}
