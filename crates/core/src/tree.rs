//! Size-aggregating tree over drive items.
//!
//! Items live once each in an arena and are found through a global id index,
//! so a file with several parents is one node listed by several folders.
//! Every file or folder carries the exact set of folders above it; a file's
//! bytes are counted once in each of those folders, however many paths lead
//! there. Sizes therefore do not depend on the order records arrive in.
//!
//! Segments are named, non-aggregating entries (a "My Drive" heading, say).
//! Items listed in a segment or at the top level are *mounted* there: shown,
//! but not counted.

use std::collections::hash_map::Entry;

use ahash::AHashMap;
use drivetree_config::PrunePolicy;
use drivetree_models::{AnyItemId, File, Folder, Item, Kind};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::TreeError;
use crate::node::{Entries, FolderNode, Links, Location, Node, NodeId, SegmentNode, TreeKey};

/// Outcome of [`FileTree::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub node: NodeId,
    /// First time this item's own record was seen.
    pub created: bool,
    /// Parents the item was newly linked under.
    pub linked: usize,
    /// Parents it was moved out of.
    pub unlinked: usize,
}

/// Items a removal took out of the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removal {
    /// The target plus descendants left without any parent.
    pub removed: Vec<AnyItemId>,
    /// Emptied folders taken out by the cascade.
    pub pruned: Vec<AnyItemId>,
}

impl Removal {
    #[must_use]
    pub fn len(&self) -> usize {
        self.removed.len() + self.pruned.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.pruned.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Top,
    Segment,
    Folder(NodeId),
}

#[derive(Debug, Clone, Default)]
pub struct FileTree {
    nodes: Vec<Option<Node>>,
    free: Vec<NodeId>,
    index: AHashMap<AnyItemId, NodeId>,
    top: Entries,
    prune_policy: PrunePolicy,
}

impl FileTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prune_policy(prune_policy: PrunePolicy) -> Self {
        Self {
            prune_policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn prune_policy(&self) -> PrunePolicy {
        self.prune_policy
    }

    /// Number of items (files and folders, placeholders included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Finds an item by raw id, whatever its kind.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    /// Entries of the top level, a segment, or a folder.
    #[must_use]
    pub fn entries(&self, at: Location) -> Option<&Entries> {
        match at {
            Location::Top => Some(&self.top),
            Location::Node(id) => match self.node(id)? {
                Node::Segment(s) => Some(&s.entries),
                Node::Folder(f) => Some(&f.items),
                Node::File(_) => None,
            },
        }
    }

    /// Looks an entry up without creating it.
    #[must_use]
    pub fn get(&self, at: Location, key: &TreeKey) -> Option<NodeId> {
        self.entries(at)?.get(key).copied()
    }

    /// Entries of `at` in display order: segments, then folders, then files,
    /// each by name.
    #[must_use]
    pub fn children(&self, at: Location) -> Vec<(&TreeKey, NodeId)> {
        let mut entries: Vec<_> = self
            .entries(at)
            .map(|e| e.iter().map(|(k, v)| (k, *v)).collect())
            .unwrap_or_default();
        entries.sort_by_cached_key(|(key, id)| {
            let rank = match key {
                TreeKey::Segment(_) => 0,
                TreeKey::Item(item) if item.kind() == Kind::Folder => 1,
                TreeKey::Item(_) => 2,
            };
            let name = self.node(*id).map(|n| n.name().to_lowercase()).unwrap_or_default();
            (rank, name)
        });
        entries
    }

    /// Items not linked under any folder, sorted by id.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        let mut roots: Vec<(&AnyItemId, NodeId)> = self
            .index
            .iter()
            .filter(|(_, node)| {
                self.node(**node)
                    .and_then(Node::links)
                    .is_some_and(|l| l.containers.is_empty())
            })
            .map(|(id, node)| (id, *node))
            .collect();
        roots.sort_unstable_by(|a, b| a.0.cmp(b.0));
        roots.into_iter().map(|(_, node)| node).collect()
    }

    /// Every item node, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.index
            .values()
            .filter_map(|&id| self.node(id).map(|node| (id, node)))
    }

    /// Folders above `id`; empty for roots, segments and unknown nodes.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[][..], Node::ancestors)
    }

    /// Aggregated size. Segments report the sum of their entries.
    #[must_use]
    pub fn size_of(&self, id: NodeId) -> u64 {
        match self.node(id) {
            Some(Node::File(f)) => f.size,
            Some(Node::Folder(f)) => f.size,
            Some(Node::Segment(s)) => s
                .entries
                .values()
                .fold(0, |total, &child| total.saturating_add(self.size_of(child))),
            None => 0,
        }
    }

    /// Returns the node behind `key` at `at`, creating it if needed.
    ///
    /// - A segment key at the top level or in a segment yields that segment.
    /// - An item key at the top level or in a segment mounts the item there.
    /// - An item key in a folder links the item under it, and from then on
    ///   its size counts towards the folder and every folder above.
    ///
    /// Items are created as empty placeholders the first time their id is seen.
    ///
    /// # Errors
    ///
    /// - [`TreeError::UnsupportedKeyType`] for a segment key inside a folder
    /// - [`TreeError::NotAContainer`] when `at` is a file
    /// - [`TreeError::KindMismatch`] when the id is already indexed with the other kind
    /// - [`TreeError::CyclicLink`] when linking would put a folder inside itself
    pub fn get_or_create(&mut self, at: Location, key: impl Into<TreeKey>) -> Result<NodeId, TreeError> {
        let key = key.into();
        match (self.container(at)?, key) {
            (Container::Folder(_), TreeKey::Segment(name)) => Err(TreeError::UnsupportedKeyType {
                key: name,
                container: "folder",
            }),
            (Container::Folder(folder), TreeKey::Item(id)) => {
                let child = self.get_or_create_item(&id)?;
                self.link(child, folder)?;
                Ok(child)
            }
            (_, TreeKey::Segment(name)) => self.get_or_create_segment(at, name),
            (_, TreeKey::Item(id)) => {
                let child = self.get_or_create_item(&id)?;
                self.mount(child, at, id)?;
                Ok(child)
            }
        }
    }

    /// Walks (and creates) a chain of segments from the top level.
    ///
    /// # Errors
    ///
    /// Only fails if the tree is internally inconsistent.
    pub fn segment_path<S: AsRef<str>>(&mut self, path: &[S]) -> Result<Location, TreeError> {
        let mut at = Location::Top;
        for name in path {
            at = Location::Node(self.get_or_create_segment(at, name.as_ref().to_string())?);
        }
        Ok(at)
    }

    /// Returns the node for `id`, creating a placeholder if it is unknown.
    ///
    /// # Errors
    ///
    /// [`TreeError::KindMismatch`] if the raw id is already indexed as the other kind.
    pub fn get_or_create_item(&mut self, id: &AnyItemId) -> Result<NodeId, TreeError> {
        if let Some(&node) = self.index.get(id.as_str()) {
            return match self.node_ref(node)?.kind() {
                Some(found) if found == id.kind() => Ok(node),
                Some(found) => Err(TreeError::KindMismatch {
                    id: id.to_string(),
                    expected: id.kind(),
                    found,
                }),
                None => Err(TreeError::UnknownNode(node)),
            };
        }

        let fresh = Node::for_item(id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        let node = self.alloc(fresh);
        self.index.insert(id.clone(), node);
        trace!("Created {} node {} for {}", id.kind(), node, id);
        Ok(node)
    }

    /// Inserts or updates an item from its record.
    ///
    /// Parents named by the record that are not known yet become placeholders.
    /// When the record names different parents than before, the item moves:
    /// it is unlinked from parents it no longer lists. A changed file size is
    /// applied as a delta to every ancestor.
    ///
    /// # Errors
    ///
    /// [`TreeError::KindMismatch`] or [`TreeError::CyclicLink`]; both are
    /// detected before the tree changes. A record naming itself as a parent
    /// is one of them.
    pub fn insert(&mut self, item: impl Into<Item>) -> Result<Insertion, TreeError> {
        let item = item.into();
        let id = item.id();
        self.check_kind(&id)?;
        for parent in item.parents() {
            if parent.as_str() == id.as_str() {
                return Err(match id.kind() {
                    Kind::Folder => TreeError::CyclicLink {
                        child: id.to_string(),
                        parent: parent.to_string(),
                    },
                    Kind::File => TreeError::KindMismatch {
                        id: id.to_string(),
                        expected: Kind::Folder,
                        found: Kind::File,
                    },
                });
            }
            self.check_kind(&parent.erase())?;
        }

        let node = self.get_or_create_item(&id)?;
        let parents = item
            .parents()
            .iter()
            .map(|p| self.get_or_create_item(&p.erase()))
            .collect::<Result<SmallVec<[NodeId; 2]>, _>>()?;
        for &parent in &parents {
            self.check_link(node, parent)?;
        }

        let created = match item {
            Item::File(file) => self.describe_file(node, file)?,
            Item::Folder(folder) => self.describe_folder(node, folder)?,
        };

        let stale: SmallVec<[NodeId; 2]> = self
            .links_ref(node)?
            .containers
            .iter()
            .copied()
            .filter(|c| !parents.contains(c))
            .collect();
        for &container in &stale {
            self.unlink(node, container)?;
        }

        let mut linked = 0;
        for &parent in &parents {
            if self.link(node, parent)? {
                linked += 1;
            }
        }

        if created {
            trace!("Inserted {} under {} parent(s)", id, parents.len());
        } else if !stale.is_empty() || linked > 0 {
            debug!("Moved {}: {} link(s) dropped, {} added", id, stale.len(), linked);
        }

        Ok(Insertion {
            node,
            created,
            linked,
            unlinked: stale.len(),
        })
    }

    /// Removes an item everywhere it appears.
    ///
    /// Its size is subtracted from every ancestor and it is detached from all
    /// its parents. A removed folder takes along descendants that have no other
    /// parent. Emptied folders are then pruned upwards according to the
    /// tree's [`PrunePolicy`]; folders without ancestors are never pruned.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if no item has this id.
    pub fn remove(&mut self, id: impl AsRef<str>) -> Result<Removal, TreeError> {
        let id = id.as_ref();
        let node = self.lookup(id).ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        let mut removal = Removal::default();
        self.remove_node(node, &mut removal, false)?;
        debug!(
            "Removed {}: {} item(s) gone, {} folder(s) pruned",
            id,
            removal.removed.len(),
            removal.pruned.len()
        );
        Ok(removal)
    }

    /// Removes the entry `key` from `at`.
    ///
    /// Inside a folder this drops one link; the item itself is only removed
    /// once nothing lists it any more, and the folder is pruned if that left
    /// it empty. A segment entry takes the whole segment with it.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if there is no such entry.
    pub fn remove_entry(&mut self, at: Location, key: impl Into<TreeKey>) -> Result<Removal, TreeError> {
        let key = key.into();
        let target = self.get(at, &key).ok_or_else(|| TreeError::NotFound(key.to_string()))?;
        let mut removal = Removal::default();

        match (self.container(at)?, &key) {
            (Container::Folder(_), TreeKey::Segment(name)) => {
                return Err(TreeError::UnsupportedKeyType {
                    key: name.clone(),
                    container: "folder",
                });
            }
            (Container::Folder(folder), TreeKey::Item(_)) => {
                self.unlink(target, folder)?;
                if self.is_detached(target)? {
                    self.remove_node(target, &mut removal, false)?;
                }
                if self.is_prunable(folder) {
                    self.remove_node(folder, &mut removal, true)?;
                }
            }
            (_, TreeKey::Segment(_)) => {
                self.entries_mut(at)?.remove(&key);
                self.drop_segment(target, &mut removal)?;
            }
            (_, TreeKey::Item(_)) => {
                self.entries_mut(at)?.remove(&key);
                self.links_mut(target)?.mounts.retain(|m| *m != at);
                if self.is_detached(target)? {
                    self.remove_node(target, &mut removal, false)?;
                }
            }
        }

        Ok(removal)
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = Some(node);
            return id;
        }
        #[allow(clippy::cast_possible_truncation)]
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    fn release(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.get_mut(id.index())?.take();
        if node.is_some() {
            self.free.push(id);
        }
        node
    }

    fn node_ref(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.node(id).ok_or(TreeError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(TreeError::UnknownNode(id))
    }

    fn folder_mut(&mut self, id: NodeId) -> Result<&mut FolderNode, TreeError> {
        match self.node_mut(id)? {
            Node::Folder(f) => Ok(f),
            _ => Err(TreeError::NotAContainer(id)),
        }
    }

    fn links_ref(&self, id: NodeId) -> Result<&Links, TreeError> {
        self.node_ref(id)?.links().ok_or(TreeError::UnknownNode(id))
    }

    fn links_mut(&mut self, id: NodeId) -> Result<&mut Links, TreeError> {
        self.node_mut(id)?.links_mut().ok_or(TreeError::UnknownNode(id))
    }

    fn item_id(&self, id: NodeId) -> Result<AnyItemId, TreeError> {
        self.node_ref(id)?.item_id().ok_or(TreeError::UnknownNode(id))
    }

    fn container(&self, at: Location) -> Result<Container, TreeError> {
        match at {
            Location::Top => Ok(Container::Top),
            Location::Node(id) => match self.node_ref(id)? {
                Node::Segment(_) => Ok(Container::Segment),
                Node::Folder(_) => Ok(Container::Folder(id)),
                Node::File(_) => Err(TreeError::NotAContainer(id)),
            },
        }
    }

    fn entries_mut(&mut self, at: Location) -> Result<&mut Entries, TreeError> {
        match at {
            Location::Top => Ok(&mut self.top),
            Location::Node(id) => match self.node_mut(id)? {
                Node::Segment(s) => Ok(&mut s.entries),
                Node::Folder(f) => Ok(&mut f.items),
                Node::File(_) => Err(TreeError::NotAContainer(id)),
            },
        }
    }

    fn check_kind(&self, id: &AnyItemId) -> Result<(), TreeError> {
        match self.lookup(id.as_str()).and_then(|n| self.node(n)).and_then(Node::kind) {
            Some(found) if found != id.kind() => Err(TreeError::KindMismatch {
                id: id.to_string(),
                expected: id.kind(),
                found,
            }),
            _ => Ok(()),
        }
    }

    fn check_link(&self, child: NodeId, parent: NodeId) -> Result<(), TreeError> {
        if child == parent || self.links_ref(parent)?.ancestors.contains(&child) {
            return Err(TreeError::CyclicLink {
                child: self.item_id(child)?.to_string(),
                parent: self.item_id(parent)?.to_string(),
            });
        }
        Ok(())
    }

    fn get_or_create_segment(&mut self, at: Location, name: String) -> Result<NodeId, TreeError> {
        let key = TreeKey::Segment(name.clone());
        if let Some(&existing) = self.entries_mut(at)?.get(&key) {
            return Ok(existing);
        }
        let segment = self.alloc(Node::Segment(SegmentNode {
            name,
            parent: at,
            entries: Entries::default(),
        }));
        self.entries_mut(at)?.insert(key, segment);
        Ok(segment)
    }

    fn mount(&mut self, child: NodeId, at: Location, id: AnyItemId) -> Result<(), TreeError> {
        let inserted = match self.entries_mut(at)?.entry(TreeKey::Item(id)) {
            Entry::Vacant(slot) => {
                slot.insert(child);
                true
            }
            Entry::Occupied(_) => false,
        };
        if inserted {
            self.links_mut(child)?.mounts.push(at);
        }
        Ok(())
    }

    /// Fills a file node from its record. Returns whether this was the first record.
    fn describe_file(&mut self, node: NodeId, file: File) -> Result<bool, TreeError> {
        let Node::File(target) = self.node_mut(node)? else {
            return Err(TreeError::KindMismatch {
                id: file.id().to_string(),
                expected: Kind::File,
                found: Kind::Folder,
            });
        };
        let created = target.info.is_none();
        let old_size = target.size;
        let new_size = file.size();
        target.size = new_size;
        target.info = Some(file);

        if old_size != new_size {
            let ancestors = target.links.ancestors.clone();
            for ancestor in ancestors {
                let folder = self.folder_mut(ancestor)?;
                folder.size = folder.size.saturating_sub(old_size).saturating_add(new_size);
            }
        }
        Ok(created)
    }

    fn describe_folder(&mut self, node: NodeId, folder: Folder) -> Result<bool, TreeError> {
        let Node::Folder(target) = self.node_mut(node)? else {
            return Err(TreeError::KindMismatch {
                id: folder.id().to_string(),
                expected: Kind::Folder,
                found: Kind::File,
            });
        };
        let created = target.info.is_none();
        target.info = Some(folder);
        Ok(created)
    }

    /// Links `child` under the folder `parent`. Returns `false` if it already was.
    fn link(&mut self, child: NodeId, parent: NodeId) -> Result<bool, TreeError> {
        self.check_link(child, parent)?;
        let key = TreeKey::Item(self.item_id(child)?);
        let folder = self.folder_mut(parent)?;
        if folder.items.contains_key(&key) {
            return Ok(false);
        }
        folder.items.insert(key, child);
        folder.nitems += 1;
        self.links_mut(child)?.containers.push(parent);
        self.refresh_ancestors(child)?;
        Ok(true)
    }

    fn unlink(&mut self, child: NodeId, parent: NodeId) -> Result<bool, TreeError> {
        let key = TreeKey::Item(self.item_id(child)?);
        let folder = self.folder_mut(parent)?;
        if folder.items.remove(&key).is_none() {
            return Ok(false);
        }
        folder.nitems = folder.nitems.saturating_sub(1);
        self.links_mut(child)?.containers.retain(|c| *c != parent);
        self.refresh_ancestors(child)?;
        Ok(true)
    }

    /// Recomputes ancestor sets below (and including) `start` after its links
    /// changed, moving each file's bytes between the folders it left and joined.
    fn refresh_ancestors(&mut self, start: NodeId) -> Result<(), TreeError> {
        for node in self.topological_from(start)? {
            let fresh = self.collect_ancestors(node)?;
            let stale = std::mem::replace(&mut self.links_mut(node)?.ancestors, fresh.clone());
            if stale == fresh {
                continue;
            }

            let Some(size) = self.node_ref(node)?.as_file().map(|f| f.size) else {
                continue;
            };
            if size == 0 {
                continue;
            }
            for &gained in fresh.iter().filter(|a| !stale.contains(a)) {
                let folder = self.folder_mut(gained)?;
                folder.size = folder.size.saturating_add(size);
            }
            for &lost in stale.iter().filter(|a| !fresh.contains(a)) {
                let folder = self.folder_mut(lost)?;
                folder.size = folder.size.saturating_sub(size);
            }
        }
        Ok(())
    }

    /// `start` and its descendants, every node after all of its containers
    /// that are themselves in the subtree.
    fn topological_from(&self, start: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut post_order = Vec::new();
        let mut visited = ahash::AHashSet::new();
        let mut stack = vec![(start, false)];

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                post_order.push(node);
                continue;
            }
            if !visited.insert(node) {
                continue;
            }
            stack.push((node, true));
            if let Node::Folder(folder) = self.node_ref(node)? {
                stack.extend(
                    folder
                        .items
                        .values()
                        .filter(|child| !visited.contains(*child))
                        .map(|&child| (child, false)),
                );
            }
        }

        post_order.reverse();
        Ok(post_order)
    }

    fn collect_ancestors(&self, node: NodeId) -> Result<SmallVec<[NodeId; 4]>, TreeError> {
        let mut ancestors: SmallVec<[NodeId; 4]> = SmallVec::new();
        for &container in &self.links_ref(node)?.containers {
            for &above in &self.links_ref(container)?.ancestors {
                if !ancestors.contains(&above) {
                    ancestors.push(above);
                }
            }
            if !ancestors.contains(&container) {
                ancestors.push(container);
            }
        }
        Ok(ancestors)
    }

    fn is_detached(&self, node: NodeId) -> Result<bool, TreeError> {
        let links = self.links_ref(node)?;
        Ok(links.containers.is_empty() && links.mounts.is_empty())
    }

    fn is_prunable(&self, node: NodeId) -> bool {
        self.node(node)
            .and_then(Node::as_folder)
            .is_some_and(FolderNode::is_prunable)
    }

    fn remove_node(&mut self, node: NodeId, removal: &mut Removal, pruned: bool) -> Result<(), TreeError> {
        let id = self.item_id(node)?;
        let links = self.links_ref(node)?.clone();

        for &container in &links.containers {
            self.unlink(node, container)?;
        }
        for &mount in &links.mounts {
            // A mount may point into a segment that is being dropped.
            if let Ok(entries) = self.entries_mut(mount) {
                entries.remove(&TreeKey::Item(id.clone()));
            }
        }

        let children: SmallVec<[NodeId; 8]> = self
            .node_ref(node)?
            .as_folder()
            .map(|f| f.items.values().copied().collect())
            .unwrap_or_default();
        for child in children {
            self.unlink(child, node)?;
            if self.is_detached(child)? {
                self.remove_node(child, removal, false)?;
            }
        }

        self.release(node);
        self.index.remove(id.as_str());
        trace!("Released {} ({})", node, id);
        if pruned {
            removal.pruned.push(id);
        } else {
            removal.removed.push(id);
        }

        let candidates: SmallVec<[NodeId; 2]> = match self.prune_policy {
            PrunePolicy::AllParents => links.containers,
            PrunePolicy::LastParent => links.containers.last().copied().into_iter().collect(),
        };
        for parent in candidates {
            if self.is_prunable(parent) {
                self.remove_node(parent, removal, true)?;
            }
        }
        Ok(())
    }

    fn drop_segment(&mut self, segment: NodeId, removal: &mut Removal) -> Result<(), TreeError> {
        let entries = match self.node_mut(segment)? {
            Node::Segment(s) => std::mem::take(&mut s.entries),
            _ => return Err(TreeError::NotFound(segment.to_string())),
        };
        let here = Location::Node(segment);
        for (key, child) in entries {
            match key {
                TreeKey::Segment(_) => self.drop_segment(child, removal)?,
                TreeKey::Item(_) => {
                    if self.node(child).is_none() {
                        continue;
                    }
                    self.links_mut(child)?.mounts.retain(|m| *m != here);
                    if self.is_detached(child)? {
                        self.remove_node(child, removal, false)?;
                    }
                }
            }
        }
        self.release(segment);
        Ok(())
    }

    /// Panics unless every aggregate agrees with a from-scratch recount.
    #[cfg(test)]
    #[allow(clippy::panic)]
    pub(crate) fn assert_consistent(&self) {
        use ahash::AHashSet;

        for (node, item) in self.items() {
            let links = item.links().unwrap_or_else(|| panic!("{node} has no links"));

            let mut expected: AHashSet<NodeId> = AHashSet::new();
            let mut frontier: Vec<NodeId> = links.containers.to_vec();
            while let Some(up) = frontier.pop() {
                if expected.insert(up) {
                    frontier.extend(self.links_ref(up).map(|l| l.containers.to_vec()).unwrap_or_default());
                }
            }
            let actual: AHashSet<NodeId> = links.ancestors.iter().copied().collect();
            assert_eq!(actual, expected, "ancestors of {}", item.name());
            assert_eq!(links.ancestors.len(), actual.len(), "duplicate ancestors of {}", item.name());

            for &container in &links.containers {
                let folder = self.node(container).and_then(Node::as_folder);
                assert!(
                    folder.is_some_and(|f| f.items.values().any(|&c| c == node)),
                    "{} missing from its container",
                    item.name()
                );
            }

            if let Node::Folder(folder) = item {
                assert_eq!(folder.nitems, folder.items.len(), "nitems of {}", item.name());
                let files: AHashSet<NodeId> = self
                    .topological_from(node)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|n| self.node(*n).and_then(Node::as_file).is_some())
                    .collect();
                let size = files.iter().fold(0u64, |total, &f| total.saturating_add(self.size_of(f)));
                assert_eq!(folder.size, size, "size of {}", item.name());
            }
        }
    }
}
