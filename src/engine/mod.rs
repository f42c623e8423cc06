//! Validation entry points used by the host pipeline.
//!
//! A `Validator` owns a predicate registry and settings, and exposes the two
//! calls a templating pipeline makes:
//! - `process_assert_validate_anns`: bind, then run `assert` rules fail-fast
//!   right after template evaluation
//! - `run`: bind, then run `validate` rules and return every violation
//!
//! Binding errors are fatal in both and never mixed with violations.
//!
//! # Example
//!
//! ```rust
//! use docval::document::{Annotation, DocumentBuilder, Position};
//! use docval::engine::Validator;
//! use serde_json::json;
//!
//! let mut b = DocumentBuilder::new();
//! let replicas = b.scalar(json!(0), Position::new("values.yml", 2));
//! b.annotate(replicas, Annotation::new("validate", vec![json!({"min": 1})]));
//! let root = b.mapping(vec![("replicas".into(), replicas)], Position::new("values.yml", 1));
//! let doc = b.build(root).unwrap();
//!
//! let validator = Validator::new();
//! validator.process_assert_validate_anns(&doc).unwrap();
//!
//! let report = validator.run(&doc, "post-template").unwrap();
//! assert_eq!(report.len(), 1);
//! ```

mod builder;
mod config;
mod error;

pub use crate::evaluation::ValidationError;
pub use builder::ValidatorBuilder;
pub use config::ValidatorConfig;
pub use error::ConfigError;

use crate::binding::{Binder, BindingError, Bindings};
use crate::document::Document;
use crate::evaluation::Evaluator;
use crate::report::ViolationReport;
use crate::rules::PredicateRegistry;
use tracing::debug;

/// Binds and evaluates validation annotations.
///
/// Holds no per-document state, so one validator can serve any number of
/// documents, including from several threads.
#[derive(Clone, Debug)]
pub struct Validator {
    registry: PredicateRegistry,
    config: ValidatorConfig,
}

impl Validator {
    /// Validator with the built-in predicates and default settings.
    pub fn new() -> Self {
        Self {
            registry: PredicateRegistry::with_builtins(),
            config: ValidatorConfig::default(),
        }
    }

    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    pub fn registry(&self) -> &PredicateRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Bind every validation annotation in the document.
    pub fn bind(&self, document: &Document) -> Result<Bindings, BindingError> {
        Binder::new(&self.registry)
            .annotation_names(
                self.config.assert_annotation.as_str(),
                self.config.validate_annotation.as_str(),
            )
            .predicate_shorthand(self.config.predicate_shorthand)
            .bind(document)
    }

    /// Bind, then run fail-fast rules, stopping at the first violation.
    pub fn process_assert_validate_anns(&self, document: &Document) -> Result<(), ValidationError> {
        let bindings = self.bind(document)?;
        self.process_asserts(document, &bindings)
    }

    /// Run fail-fast rules from existing bindings.
    pub fn process_asserts(
        &self,
        document: &Document,
        bindings: &Bindings,
    ) -> Result<(), ValidationError> {
        Evaluator::new(document, bindings).process_asserts_immediately()
    }

    /// Bind, then run deferred rules and collect every violation.
    ///
    /// `label` only tags the rendered report.
    pub fn run(&self, document: &Document, label: &str) -> Result<ViolationReport, BindingError> {
        let bindings = self.bind(document)?;
        Ok(self.run_bound(document, &bindings, label))
    }

    /// Run deferred rules from existing bindings.
    pub fn run_bound(&self, document: &Document, bindings: &Bindings, label: &str) -> ViolationReport {
        Evaluator::new(document, bindings)
            .header(self.config.header.as_str())
            .run_deferred(label)
    }

    /// Both passes with a single binding: asserts first, then the deferred
    /// report.
    pub fn validate(
        &self,
        document: &Document,
        label: &str,
    ) -> Result<ViolationReport, ValidationError> {
        let bindings = self.bind(document)?;
        self.process_asserts(document, &bindings)?;
        let report = self.run_bound(document, &bindings, label);
        debug!(label, violations = report.len(), "validation complete");
        Ok(report)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Bind and run `assert` rules with the default validator.
pub fn process_assert_validate_anns(document: &Document) -> Result<(), ValidationError> {
    Validator::new().process_assert_validate_anns(document)
}

/// Bind and run `validate` rules with the default validator.
pub fn run(document: &Document, label: &str) -> Result<ViolationReport, BindingError> {
    Validator::new().run(document, label)
}
