//! Annotation binding: from annotated nodes to rule sets.
//!
//! The binder walks the document once in pre-order and turns each node's
//! `assert` and `validate` annotations into rule sets kept in a side table
//! keyed by `NodeId`. The document itself is never modified.
//!
//! Malformed annotations are binding errors, reported for the first
//! offending node in document order. They are never turned into violations.

mod binder;
mod error;

pub use binder::{Binder, Bindings, NodeRuleSets};
pub use error::BindingError;
