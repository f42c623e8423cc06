//! Docval: annotation-driven validation for structured document trees
//!
//! Docval is the validation engine of a structured-document templating tool.
//! Authors annotate nodes of a document (mappings, sequences, scalars) with
//! `assert` and `validate` annotations; docval binds those annotations to
//! rules, evaluates the rules against the resolved node values and reports
//! every violation with its source position.
//!
//! # Core Concepts
//!
//! - **Rule**: a pluggable leaf predicate, or an `and`/`or`/`one_of`/`not`
//!   composite over child rules
//! - **Rule Set**: the ordered rules bound to one node, fail-fast (`assert`)
//!   or deferred (`validate`)
//! - **Binding**: a side table from node identity to rule sets; the document
//!   is never modified
//! - **Violation Report**: every violation in document order, rendered as
//!   stable text
//!
//! Binding and evaluation are pure functions over an immutable tree.
//! Malformed annotations are binding errors, kept separate from violations
//! of the data itself.
//!
//! # Example
//!
//! ```rust
//! use docval::document::{Annotation, DocumentBuilder, Position};
//! use serde_json::json;
//!
//! let mut b = DocumentBuilder::new();
//! let name = b.scalar(json!(""), Position::new("values.yml", 2));
//! b.annotate(name, Annotation::new("validate", vec![json!("non_empty")]));
//! let root = b.mapping(vec![("name".into(), name)], Position::new("values.yml", 1));
//! let doc = b.build(root).unwrap();
//!
//! docval::process_assert_validate_anns(&doc).unwrap();
//!
//! let report = docval::run(&doc, "template-test").unwrap();
//! assert!(report.has_violations());
//! assert_eq!(report.violations()[0].subject(), "key \"name\"");
//! ```

pub mod binding;
pub mod document;
pub mod engine;
pub mod evaluation;
pub mod report;
pub mod rules;

// Re-export commonly used types
pub use binding::BindingError;
pub use document::{Annotation, Document, DocumentBuilder, Position};
pub use engine::{process_assert_validate_anns, run, Validator, ValidatorBuilder};
pub use evaluation::ValidationError;
pub use report::{Violation, ViolationReport};
pub use rules::{Mode, Rule, RuleSet};
