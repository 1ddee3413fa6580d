use std::fmt;
use std::time::{Duration, Instant};

use drivetree_config::{InvalidRecordPolicy, Settings};
use drivetree_models::{FilePage, Kind, RawItem, Validator};
use tracing::{debug, info, warn};

use crate::error::BuildError;
use crate::node::{Location, Node, NodeId};
use crate::tree::FileTree;

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    Inserted { node: NodeId, created: bool },
    SkippedTrashed,
    Rejected,
}

/// A record left out of the tree, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub pages: usize,
    pub records: usize,
    pub files: usize,
    pub folders: usize,
    pub updates: usize,
    pub trashed_skipped: usize,
    pub rejected: Vec<Rejection>,
    pub placeholders: usize, // referenced as a parent, never listed
    pub roots: usize,
    pub incomplete: bool,
    pub elapsed: Duration,
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} record(s) from {} page(s): {} file(s), {} folder(s), {} placeholder(s), {} root(s)",
            self.records, self.pages, self.files, self.folders, self.placeholders, self.roots
        )?;
        if self.updates > 0 {
            write!(f, ", {} update(s)", self.updates)?;
        }
        if self.trashed_skipped > 0 {
            write!(f, ", {} trashed skipped", self.trashed_skipped)?;
        }
        if !self.rejected.is_empty() {
            write!(f, ", {} rejected", self.rejected.len())?;
        }
        write!(f, " in {:.2?}", self.elapsed)
    }
}

/// Feeds raw listing records into a [`FileTree`].
#[derive(Debug)]
pub struct TreeBuilder {
    tree: FileTree,
    validator: Validator,
    include_trashed: bool,
    on_invalid: InvalidRecordPolicy,
    root_segment: String,
    orphan_segment: String,
    report: BuildReport,
    started: Instant,
}

impl TreeBuilder {
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            tree: FileTree::with_prune_policy(settings.prune_policy),
            validator: Validator::new(settings.max_file_size),
            include_trashed: settings.include_trashed,
            on_invalid: settings.on_invalid,
            root_segment: settings.root_segment.clone(),
            orphan_segment: settings.orphan_segment.clone(),
            report: BuildReport::default(),
            started: Instant::now(),
        }
    }

    /// Tree built so far.
    #[must_use]
    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    #[must_use]
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Validates and inserts one record.
    ///
    /// # Errors
    ///
    /// Only under [`InvalidRecordPolicy::Abort`]: the record failed validation
    /// or contradicts what the tree already holds.
    pub fn ingest(&mut self, raw: RawItem) -> Result<Ingested, BuildError> {
        self.report.records += 1;

        if raw.trashed && !self.include_trashed {
            debug!("Skipping trashed item {}", raw.id);
            self.report.trashed_skipped += 1;
            return Ok(Ingested::SkippedTrashed);
        }

        let id = raw.id.clone();
        let item = match self.validator.item(raw) {
            Ok(item) => item,
            Err(source) => return self.reject(BuildError::Invalid { id, source }),
        };
        let kind = item.kind();

        match self.tree.insert(item) {
            Ok(insertion) => {
                if insertion.created {
                    match kind {
                        Kind::File => self.report.files += 1,
                        Kind::Folder => self.report.folders += 1,
                    }
                } else {
                    self.report.updates += 1;
                }
                Ok(Ingested::Inserted {
                    node: insertion.node,
                    created: insertion.created,
                })
            }
            Err(source) => self.reject(BuildError::Tree { id, source }),
        }
    }

    fn reject(&mut self, error: BuildError) -> Result<Ingested, BuildError> {
        if self.on_invalid == InvalidRecordPolicy::Abort {
            return Err(error);
        }
        let (id, reason) = match error {
            BuildError::Invalid { id, source } => (id, source.to_string()),
            BuildError::Tree { id, source } => (id, source.to_string()),
        };
        warn!("Skipping record {}: {}", id, reason);
        self.report.rejected.push(Rejection { id, reason });
        Ok(Ingested::Rejected)
    }

    /// # Errors
    ///
    /// As [`TreeBuilder::ingest`].
    pub fn ingest_page(&mut self, page: FilePage) -> Result<usize, BuildError> {
        self.report.pages += 1;
        if page.incomplete_search {
            self.report.incomplete = true;
        }
        let mut inserted = 0;
        for raw in page.files {
            if matches!(self.ingest(raw)?, Ingested::Inserted { .. }) {
                inserted += 1;
            }
        }
        debug!("Page {} done, {} record(s) inserted", self.report.pages, inserted);
        Ok(inserted)
    }

    /// # Errors
    ///
    /// As [`TreeBuilder::ingest`].
    pub fn ingest_all(&mut self, pages: impl IntoIterator<Item = FilePage>) -> Result<usize, BuildError> {
        let mut inserted = 0;
        for page in pages {
            inserted += self.ingest_page(page)?;
        }
        Ok(inserted)
    }

    /// Mounts every root under a segment and hands back the tree.
    ///
    /// Described roots go under the root segment. Folders only ever seen as
    /// someone's parent are outside the listing (shared with the user, or
    /// filtered away) and go under the orphan segment.
    ///
    /// # Errors
    ///
    /// Only if the tree turned out internally inconsistent.
    pub fn finish(mut self) -> Result<(FileTree, BuildReport), BuildError> {
        let roots = self.tree.roots();
        for &node in &roots {
            let Some(item) = self.tree.node(node) else { continue };
            let Some(id) = item.item_id() else { continue };
            let placeholder = matches!(item, Node::Folder(f) if f.is_placeholder());
            let segment = if placeholder {
                self.orphan_segment.clone()
            } else {
                self.root_segment.clone()
            };
            let at = self.segment(segment)?;
            self.tree
                .get_or_create(at, &id)
                .map_err(|source| BuildError::Tree { id: id.to_string(), source })?;
        }
        self.report.roots = roots.len();
        self.report.placeholders = self.count_placeholders();
        self.report.elapsed = self.started.elapsed();

        if self.report.incomplete {
            warn!("The listing reported an incomplete search");
        }
        info!("Built tree: {}", self.report);
        Ok((self.tree, self.report))
    }

    fn segment(&mut self, name: String) -> Result<Location, BuildError> {
        self.tree
            .get_or_create(Location::Top, name.as_str())
            .map(Location::Node)
            .map_err(|source| BuildError::Tree { id: name, source })
    }

    fn count_placeholders(&self) -> usize {
        self.tree
            .items()
            .filter(|(_, node)| matches!(node, Node::Folder(f) if f.is_placeholder()))
            .count()
    }
}

/// Builds a tree from `pages` in one go.
///
/// # Errors
///
/// As [`TreeBuilder::ingest`] and [`TreeBuilder::finish`].
pub fn build_tree(
    settings: &Settings,
    pages: impl IntoIterator<Item = FilePage>,
) -> Result<(FileTree, BuildReport), BuildError> {
    let mut builder = TreeBuilder::new(settings);
    builder.ingest_all(pages)?;
    builder.finish()
}
