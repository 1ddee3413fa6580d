use std::fmt;

use drivetree::core::{FileTree, Location, Node, NodeId};
use drivetree::models::{DuplicateStats, Statistics};
use drivetree::utils::{format_bytes, percent_of};

/// Indented listing of a tree down to a fixed depth.
pub struct TreeView<'a> {
    tree: &'a FileTree,
    depth: usize,
}

impl<'a> TreeView<'a> {
    pub fn new(tree: &'a FileTree, depth: usize) -> Self {
        Self { tree, depth }
    }

    fn children(&self, f: &mut fmt::Formatter<'_>, parent: NodeId, prefix: &str, depth: usize) -> fmt::Result {
        if depth == 0 {
            return Ok(());
        }
        let children = self.tree.children(Location::Node(parent));
        let last = children.len().saturating_sub(1);
        for (i, (_, child)) in children.into_iter().enumerate() {
            let (branch, indent) = if i == last { ("└── ", "    ") } else { ("├── ", "│   ") };
            writeln!(f, "{prefix}{branch}{}", Label(self.tree, child))?;
            self.children(f, child, &format!("{prefix}{indent}"), depth - 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, node) in self.tree.children(Location::Top) {
            writeln!(f, "{}", Label(self.tree, node))?;
            self.children(f, node, "", self.depth)?;
        }
        Ok(())
    }
}

struct Label<'a>(&'a FileTree, NodeId);

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Label(tree, id) = *self;
        let size = format_bytes(tree.size_of(id));
        match tree.node(id) {
            Some(Node::Segment(s)) => write!(f, "{} ({size})", s.name()),
            Some(node @ Node::Folder(folder)) => {
                write!(f, "{}/  {size}, {} item(s)", node.name(), folder.nitems())?;
                if folder.is_placeholder() {
                    write!(f, " [not listed]")?;
                }
                Ok(())
            }
            Some(node @ Node::File(_)) => write!(f, "{}  {size}", node.name()),
            None => write!(f, "{id} (gone)"),
        }
    }
}

pub struct DuplicatesView<'a>(pub &'a DuplicateStats);

impl fmt::Display for DuplicatesView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        if stats.is_empty() {
            return writeln!(f, "No duplicate files.");
        }
        writeln!(
            f,
            "{} duplicate group(s), {} redundant copies, {} wasted",
            stats.total_groups,
            stats.total_duplicates,
            format_bytes(stats.total_wasted_space)
        )?;
        for group in &stats.groups {
            writeln!(
                f,
                "  {}  {} copies, {} wasted",
                group.checksum().unwrap_or("-"),
                group.files.len(),
                format_bytes(group.wasted_space)
            )?;
            for file in &group.files {
                writeln!(f, "    {}  {}", file.id(), file.name())?;
            }
        }
        Ok(())
    }
}

pub struct StatisticsView<'a>(pub &'a Statistics);

impl fmt::Display for StatisticsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        writeln!(f, "Files: {} ({})", stats.total_files, format_bytes(stats.total_size))?;
        writeln!(
            f,
            "Folders: {} ({} not listed)",
            stats.total_folders, stats.placeholder_folders
        )?;
        if stats.trashed_items > 0 {
            writeln!(f, "Trashed: {}", stats.trashed_items)?;
        }

        let mut categories: Vec<_> = stats.category_sizes.iter().collect();
        categories.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        if !categories.is_empty() {
            writeln!(f, "By type:")?;
        }
        for (category, bytes) in categories {
            let count = stats.category_counts.get(category).copied().unwrap_or(0);
            let label = category.to_string();
            writeln!(
                f,
                "  {label:<10} {count:>6} file(s)  {:>10}  {:>5.1}%",
                format_bytes(*bytes),
                percent_of(*bytes, stats.total_size)
            )?;
        }

        if !stats.largest_files.is_empty() {
            writeln!(f, "Largest files:")?;
        }
        for (_, name, size) in &stats.largest_files {
            writeln!(f, "  {:>10}  {name}", format_bytes(*size))?;
        }

        if stats.duplicate_count > 0 {
            writeln!(
                f,
                "Duplicates: {} copies wasting {}",
                stats.duplicate_count,
                format_bytes(stats.duplicate_size)
            )?;
        }
        Ok(())
    }
}
