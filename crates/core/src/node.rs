use std::fmt;

use ahash::AHashMap;
use drivetree_models::{AnyItemId, File, Folder, ItemId, ItemKind, Kind};
use smallvec::SmallVec;

/// Handle to a node inside one [`crate::FileTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a lookup happens: the tree's top level or inside a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Top,
    Node(NodeId),
}

impl From<NodeId> for Location {
    fn from(id: NodeId) -> Self {
        Location::Node(id)
    }
}

/// Key of an entry: a named path segment or an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TreeKey {
    Segment(String),
    Item(AnyItemId),
}

impl fmt::Display for TreeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeKey::Segment(name) => write!(f, "{name:?}"),
            TreeKey::Item(id) => write!(f, "{} {id}", id.kind()),
        }
    }
}

impl From<&str> for TreeKey {
    fn from(name: &str) -> Self {
        TreeKey::Segment(name.to_string())
    }
}

impl From<String> for TreeKey {
    fn from(name: String) -> Self {
        TreeKey::Segment(name)
    }
}

impl From<AnyItemId> for TreeKey {
    fn from(id: AnyItemId) -> Self {
        TreeKey::Item(id)
    }
}

impl From<&AnyItemId> for TreeKey {
    fn from(id: &AnyItemId) -> Self {
        TreeKey::Item(id.clone())
    }
}

impl<K: ItemKind> From<&ItemId<K>> for TreeKey {
    fn from(id: &ItemId<K>) -> Self {
        TreeKey::Item(id.erase())
    }
}

pub type Entries = AHashMap<TreeKey, NodeId>;

/// How an item node hangs in the tree.
#[derive(Debug, Clone, Default)]
pub struct Links {
    /// Every folder this item sits in, transitively, de-duplicated. Ordered
    /// per direct parent (in link order): that parent's ancestors, then it.
    pub(crate) ancestors: SmallVec<[NodeId; 4]>,
    /// Folders holding this item in their `items`, in link order.
    pub(crate) containers: SmallVec<[NodeId; 2]>,
    /// Segments (or the top level) listing this item without aggregating it.
    pub(crate) mounts: SmallVec<[Location; 1]>,
}

#[derive(Debug, Clone)]
pub struct SegmentNode {
    pub(crate) name: String,
    pub(crate) parent: Location,
    pub(crate) entries: Entries,
}

impl SegmentNode {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Location {
        self.parent
    }

    #[must_use]
    pub fn entries(&self) -> &Entries {
        &self.entries
    }
}

#[derive(Debug, Clone)]
pub struct FileNode {
    pub(crate) id: ItemId<File>,
    pub(crate) info: Option<File>,
    pub(crate) size: u64,
    pub(crate) links: Links,
}

impl FileNode {
    pub(crate) fn new(id: ItemId<File>) -> Self {
        Self {
            id,
            info: None,
            size: 0,
            links: Links::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &ItemId<File> {
        &self.id
    }

    /// `None` until the file's own record has been inserted.
    #[must_use]
    pub fn info(&self) -> Option<&File> {
        self.info.as_ref()
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub fn ancestors(&self) -> &[NodeId] {
        &self.links.ancestors
    }

    #[must_use]
    pub fn containers(&self) -> &[NodeId] {
        &self.links.containers
    }
}

#[derive(Debug, Clone)]
pub struct FolderNode {
    pub(crate) id: ItemId<Folder>,
    pub(crate) info: Option<Folder>,
    pub(crate) size: u64,
    pub(crate) nitems: usize,
    pub(crate) items: Entries,
    pub(crate) links: Links,
}

impl FolderNode {
    pub(crate) fn new(id: ItemId<Folder>) -> Self {
        Self {
            id,
            info: None,
            size: 0,
            nitems: 0,
            items: Entries::default(),
            links: Links::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &ItemId<Folder> {
        &self.id
    }

    /// `None` for a placeholder: a folder only known as someone's parent.
    #[must_use]
    pub fn info(&self) -> Option<&Folder> {
        self.info.as_ref()
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.info.is_none()
    }

    /// Bytes of every distinct file below this folder.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of direct children.
    #[must_use]
    pub fn nitems(&self) -> usize {
        self.nitems
    }

    #[must_use]
    pub fn items(&self) -> &Entries {
        &self.items
    }

    #[must_use]
    pub fn ancestors(&self) -> &[NodeId] {
        &self.links.ancestors
    }

    #[must_use]
    pub fn containers(&self) -> &[NodeId] {
        &self.links.containers
    }

    pub(crate) fn is_prunable(&self) -> bool {
        self.nitems == 0 && self.size == 0 && !self.links.ancestors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Segment(SegmentNode),
    File(FileNode),
    Folder(FolderNode),
}

impl Node {
    pub(crate) fn for_item(id: &AnyItemId) -> Option<Self> {
        id.downcast::<File>()
            .map(|id| Node::File(FileNode::new(id)))
            .or_else(|| id.downcast::<Folder>().map(|id| Node::Folder(FolderNode::new(id))))
    }

    /// Kind of item this node describes; `None` for segments.
    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Node::Segment(_) => None,
            Node::File(_) => Some(Kind::File),
            Node::Folder(_) => Some(Kind::Folder),
        }
    }

    #[must_use]
    pub fn item_id(&self) -> Option<AnyItemId> {
        match self {
            Node::Segment(_) => None,
            Node::File(f) => Some(f.id.erase()),
            Node::Folder(f) => Some(f.id.erase()),
        }
    }

    /// Display name: the segment name, the item name, or the raw id for an
    /// item whose record has not arrived.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Node::Segment(s) => &s.name,
            Node::File(f) => f.info.as_ref().map_or(f.id.as_str(), File::name),
            Node::Folder(f) => f.info.as_ref().map_or(f.id.as_str(), Folder::name),
        }
    }

    /// Ancestor folders; always empty for segments.
    #[must_use]
    pub fn ancestors(&self) -> &[NodeId] {
        self.links().map_or(&[][..], |l| l.ancestors.as_slice())
    }

    #[must_use]
    pub fn as_segment(&self) -> Option<&SegmentNode> {
        match self {
            Node::Segment(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            Node::Folder(f) => Some(f),
            _ => None,
        }
    }

    pub(crate) fn links(&self) -> Option<&Links> {
        match self {
            Node::Segment(_) => None,
            Node::File(f) => Some(&f.links),
            Node::Folder(f) => Some(&f.links),
        }
    }

    pub(crate) fn links_mut(&mut self) -> Option<&mut Links> {
        match self {
            Node::Segment(_) => None,
            Node::File(f) => Some(&mut f.links),
            Node::Folder(f) => Some(&mut f.links),
        }
    }
}
