//! Builder for assembling document trees bottom-up.

use super::annotation::Annotation;
use super::error::DocumentError;
use super::node::{Document, Node, NodeId, NodeKind, Position};
use serde_json::Value;
use std::collections::HashSet;

/// Builder for `Document` trees.
///
/// Children are created before their parents, so every child id handed to
/// `mapping` or `sequence` is already known. `build` checks that each node
/// has at most one parent, that mapping keys are unique and that the root
/// is not anyone's child.
///
/// # Example
///
/// ```rust
/// use docval::document::{Annotation, DocumentBuilder, Position};
/// use serde_json::json;
///
/// let mut b = DocumentBuilder::new();
/// let name = b.scalar(json!(""), Position::new("values.yml", 2));
/// b.annotate(name, Annotation::new("validate", vec![json!("non_empty")]));
/// let root = b.mapping(vec![("name".into(), name)], Position::new("values.yml", 1));
///
/// let doc = b.build(root).unwrap();
/// assert_eq!(doc.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    nodes: Vec<Node>,
    pending_annotations: Vec<(NodeId, Annotation)>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            position,
            annotations: Vec::new(),
        });
        id
    }

    /// Add a scalar leaf.
    pub fn scalar(&mut self, value: Value, position: Position) -> NodeId {
        self.push(NodeKind::Scalar(value), position)
    }

    /// Add a mapping over previously created children.
    pub fn mapping(&mut self, entries: Vec<(String, NodeId)>, position: Position) -> NodeId {
        self.push(NodeKind::Mapping(entries), position)
    }

    /// Add a sequence over previously created children.
    pub fn sequence(&mut self, items: Vec<NodeId>, position: Position) -> NodeId {
        self.push(NodeKind::Sequence(items), position)
    }

    /// Attach an annotation to a node. Annotations keep their declaration order.
    pub fn annotate(&mut self, node: NodeId, annotation: Annotation) -> &mut Self {
        self.pending_annotations.push((node, annotation));
        self
    }

    /// Finish the document rooted at `root`.
    pub fn build(mut self, root: NodeId) -> Result<Document, DocumentError> {
        if root.0 >= self.nodes.len() {
            return Err(DocumentError::UnknownNode(root));
        }

        let mut parent_of: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            let parent = NodeId(index);
            if let NodeKind::Mapping(entries) = &node.kind {
                let mut keys = HashSet::new();
                if let Some((key, _)) = entries.iter().find(|(key, _)| !keys.insert(key)) {
                    return Err(DocumentError::DuplicateKey {
                        parent,
                        key: key.clone(),
                    });
                }
            }
            for child in node.children() {
                // A child must have been created before its parent
                if child.0 >= index {
                    return Err(DocumentError::UnknownNode(child));
                }
                if parent_of[child.0].is_some() {
                    return Err(DocumentError::SharedChild { child, parent });
                }
                parent_of[child.0] = Some(parent);
            }
        }

        if parent_of[root.0].is_some() {
            return Err(DocumentError::RootHasParent(root));
        }

        for (id, annotation) in self.pending_annotations {
            let node = self
                .nodes
                .get_mut(id.0)
                .ok_or(DocumentError::UnknownNode(id))?;
            node.annotations.push(annotation);
        }

        Ok(Document {
            nodes: self.nodes,
            root,
        })
    }
}
