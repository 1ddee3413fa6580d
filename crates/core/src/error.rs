use drivetree_models::{Kind, ValidationError};
use thiserror::Error;

use crate::node::NodeId;

/// Failures of the aggregation tree itself.
///
/// These signal misuse or contradictory input, never malformed fields; field
/// validation happens before an item reaches the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("key {key:?} cannot be used inside a {container}")]
    UnsupportedKeyType { key: String, container: &'static str },

    #[error("no entry for {0}")]
    NotFound(String),

    #[error("node {0} is a file and has no entries")]
    NotAContainer(NodeId),

    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("{id} is indexed as a {found}, not a {expected}")]
    KindMismatch { id: String, expected: Kind, found: Kind },

    #[error("linking {child} under {parent} would make it its own ancestor")]
    CyclicLink { child: String, parent: String },
}

/// Errors surfaced by [`crate::TreeBuilder`] when its policy is to abort.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid record {id}: {source}")]
    Invalid {
        id: String,
        #[source]
        source: ValidationError,
    },

    #[error("could not place {id}: {source}")]
    Tree {
        id: String,
        #[source]
        source: TreeError,
    },
}
