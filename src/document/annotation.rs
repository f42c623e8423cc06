//! Resolved annotations attached to document nodes.

use super::node::Position;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A declarative directive attached to a node.
///
/// Arguments are already evaluated by the templating pass; the engine never
/// evaluates expressions, it only interprets these values as rule specs.
///
/// # Example
///
/// ```rust
/// use docval::document::Annotation;
/// use serde_json::json;
///
/// let ann = Annotation::new("validate", vec![json!("non_empty"), json!({"min_len": 3})]);
/// assert_eq!(ann.name(), "validate");
/// assert_eq!(ann.args().len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    name: String,
    args: Vec<Value>,
    #[serde(default)]
    position: Position,
}

impl Annotation {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
            position: Position::unknown(),
        }
    }

    /// Record where the annotation was written.
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn position(&self) -> &Position {
        &self.position
    }
}
