use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a node in the forest.
///
/// Ids are opaque to hosts; they are handed out by an [`IdSource`](crate::traits::IdSource)
/// and never reused for the lifetime of a document.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Drop target meaning "the canvas itself". Never assigned to a node.
    pub const ROOT: NodeId = NodeId(0);

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id_{}", self.0)
    }
}
