mod builder;
mod duplicates;
mod error;
mod node;
mod source;
pub mod statistics;
mod tree;

pub use builder::{BuildReport, Ingested, Rejection, TreeBuilder, build_tree};
pub use duplicates::{DuplicateDetector, multi_parent_files};
pub use error::{BuildError, TreeError};
pub use node::{Entries, FileNode, FolderNode, Location, Node, NodeId, SegmentNode, TreeKey};
pub use source::{JsonPageSource, parse_pages};
pub use tree::{FileTree, Insertion, Removal};
