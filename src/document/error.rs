//! Errors raised while assembling a document tree.

use super::node::NodeId;
use thiserror::Error;

/// Errors that can occur when building a document with `DocumentBuilder`.
#[derive(Debug, Error, PartialEq)]
pub enum DocumentError {
    #[error("Node {0} does not exist in this document")]
    UnknownNode(NodeId),

    #[error("Node {child} already belongs to another parent (attaching to {parent})")]
    SharedChild { child: NodeId, parent: NodeId },

    #[error("Root node {0} is already a child of another node")]
    RootHasParent(NodeId),

    #[error("Mapping {parent} has key '{key}' more than once")]
    DuplicateKey { parent: NodeId, key: String },
}
