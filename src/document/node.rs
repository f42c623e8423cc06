//! Node, position and document types.

use super::annotation::Annotation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Source position of a node.
///
/// Positions are opaque to the engine: they are copied into violations and
/// binding errors, and rendered, but never interpreted.
///
/// # Example
///
/// ```rust
/// use docval::document::Position;
///
/// assert_eq!(Position::new("values.yml", 3).to_string(), "values.yml:3");
/// assert_eq!(Position::unknown().to_string(), "?");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Position {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// Position with only a line number (e.g. inline documents).
    pub fn line(line: u32) -> Self {
        Self {
            file: None,
            line: Some(line),
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_known(&self) -> bool {
        self.file.is_some() || self.line.is_some()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{file}:{line}"),
            (Some(file), None) => write!(f, "{file}"),
            (None, Some(line)) => write!(f, "line {line}"),
            (None, None) => write!(f, "?"),
        }
    }
}

/// Stable identity of a node within its `Document` (arena index).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of node shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Key/child pairs in declaration order.
    Mapping(Vec<(String, NodeId)>),
    /// Children in index order.
    Sequence(Vec<NodeId>),
    /// A resolved leaf value (null, bool, number or string).
    Scalar(Value),
}

/// One element of the document tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) position: Position,
    pub(crate) annotations: Vec<Annotation>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Child ids in document order.
    pub fn children(&self) -> Vec<NodeId> {
        match &self.kind {
            NodeKind::Mapping(entries) => entries.iter().map(|(_, id)| *id).collect(),
            NodeKind::Sequence(items) => items.clone(),
            NodeKind::Scalar(_) => Vec::new(),
        }
    }
}

/// An immutable node tree with a single root.
///
/// Built with [`DocumentBuilder`](super::DocumentBuilder).
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Document {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Node lookup for ids handed out by this document's builder.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids reachable from the root, in document pre-order.
    pub fn pre_order(&self) -> Vec<NodeId> {
        self.pre_order_from(self.root)
    }

    fn pre_order_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            order.push(id);
            // Reverse so the first child is popped first
            stack.extend(self.node(id).children().into_iter().rev());
        }

        order
    }

    /// Materialize the subtree at `id` as a plain value.
    ///
    /// Mapping key order is preserved. Builds bottom-up without recursion,
    /// so nesting depth is bounded by memory rather than the call stack.
    pub fn value_of(&self, id: NodeId) -> Value {
        let mut built: HashMap<NodeId, Value> = HashMap::new();

        // Reverse pre-order visits every child before its parent
        for node_id in self.pre_order_from(id).into_iter().rev() {
            let value = match &self.node(node_id).kind {
                NodeKind::Scalar(value) => value.clone(),
                NodeKind::Sequence(items) => Value::Array(
                    items
                        .iter()
                        .map(|item| built.remove(item).unwrap_or(Value::Null))
                        .collect(),
                ),
                NodeKind::Mapping(entries) => {
                    let mut map = Map::new();
                    for (key, child) in entries {
                        map.insert(key.clone(), built.remove(child).unwrap_or(Value::Null));
                    }
                    Value::Object(map)
                }
            };
            built.insert(node_id, value);
        }

        built.remove(&id).unwrap_or(Value::Null)
    }
}

/// Drop a value without recursing once per nesting level.
pub(crate) fn release(value: Value) {
    let mut pending = vec![value];

    while let Some(mut value) = pending.pop() {
        match &mut value {
            Value::Array(items) => pending.append(items),
            Value::Object(entries) => {
                pending.extend(std::mem::take(entries).into_iter().map(|(_, child)| child));
            }
            _ => {}
        }
    }
}
