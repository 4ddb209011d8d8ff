use thiserror::Error;

use crate::ids::NodeId;
use crate::node::Kind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("node not found: {0}")]
    NotFound(NodeId),
    #[error("node {0} cannot hold children")]
    InvalidContainer(NodeId),
    #[error("cannot move {node} into its own subtree at {target}")]
    CyclicMove { node: NodeId, target: NodeId },
    #[error("malformed import: {0}")]
    MalformedImport(String),
    #[error("invalid {kind} value: {input:?}")]
    InvalidValue { kind: Kind, input: String },
    #[error("array member {0} has no key")]
    UnkeyedMember(NodeId),
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}
