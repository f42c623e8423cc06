//! Document tree consumed by the validation engine.
//!
//! The tree is produced by an external parser and templating pass; this
//! module only models it so that binding and evaluation can read it:
//! - Nodes stored in an arena, addressed by `NodeId`
//! - Source positions attached to every node
//! - Already-resolved annotations attached to every node
//!
//! Nothing in the engine mutates a `Document` after it is built.

mod annotation;
mod builder;
mod error;
mod node;

pub use annotation::Annotation;
pub use builder::DocumentBuilder;
pub use error::DocumentError;
pub use node::{Document, Node, NodeId, NodeKind, Position};
pub(crate) use node::release;
