//! Builder API for assembling a `Validator`.

use super::config::ValidatorConfig;
use super::error::ConfigError;
use super::Validator;
use crate::rules::{Predicate, PredicateRegistry};

/// Builder for creating validators with custom predicates and settings.
///
/// # Example
///
/// ```rust
/// use docval::engine::ValidatorBuilder;
/// use docval::rules::{Arity, Predicate};
///
/// let port = Predicate::new("port", Arity::Exactly(0), |_, value| match value.as_u64() {
///     Some(1..=65535) => Ok(()),
///     _ => Err("not a TCP port".to_string()),
/// });
///
/// let validator = ValidatorBuilder::new()
///     .predicate(port)
///     .header("Invalid values")
///     .build()
///     .unwrap();
/// assert!(validator.registry().contains("port"));
/// ```
pub struct ValidatorBuilder {
    config: ValidatorConfig,
    predicates: Vec<Predicate>,
    builtins: bool,
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
            predicates: Vec::new(),
            builtins: true,
        }
    }

    /// Replace all settings at once
    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the annotation name for fail-fast rules
    pub fn assert_annotation(mut self, name: impl Into<String>) -> Self {
        self.config.assert_annotation = name.into();
        self
    }

    /// Set the annotation name for deferred rules
    pub fn validate_annotation(mut self, name: impl Into<String>) -> Self {
        self.config.validate_annotation = name.into();
        self
    }

    pub fn predicate_shorthand(mut self, enabled: bool) -> Self {
        self.config.predicate_shorthand = enabled;
        self
    }

    /// Set the report header line
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.config.header = header.into();
        self
    }

    /// Add a predicate; replaces a built-in of the same name
    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Start from an empty registry instead of the built-ins
    pub fn without_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    /// Build the validator
    pub fn build(self) -> Result<Validator, ConfigError> {
        self.config.check()?;

        let mut registry = if self.builtins {
            PredicateRegistry::with_builtins()
        } else {
            PredicateRegistry::new()
        };
        for predicate in self.predicates {
            registry.register(predicate);
        }

        Ok(Validator {
            registry,
            config: self.config,
        })
    }
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Arity;

    #[test]
    fn builder_includes_builtins_by_default() {
        let validator = ValidatorBuilder::new().build().unwrap();
        assert!(validator.registry().contains("non_empty"));
    }

    #[test]
    fn builder_without_builtins_only_has_custom_predicates() {
        let validator = ValidatorBuilder::new()
            .without_builtins()
            .predicate(Predicate::new("anything", Arity::Exactly(0), |_, _| Ok(())))
            .build()
            .unwrap();

        let names: Vec<&str> = validator.registry().names().collect();
        assert_eq!(names, vec!["anything"]);
    }

    #[test]
    fn builder_validates_annotation_names() {
        let result = ValidatorBuilder::new()
            .assert_annotation("check")
            .validate_annotation("check")
            .build();

        assert!(matches!(result, Err(ConfigError::SameAnnotationNames(_))));
    }

    #[test]
    fn builder_applies_settings() {
        let validator = ValidatorBuilder::new()
            .validate_annotation("schema/validation")
            .predicate_shorthand(false)
            .header("Schema violations")
            .build()
            .unwrap();

        let config = validator.config();
        assert_eq!(config.validate_annotation, "schema/validation");
        assert!(!config.predicate_shorthand);
        assert_eq!(config.header, "Schema violations");
    }
}
