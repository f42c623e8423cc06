//! Validator settings.

use super::error::ConfigError;
use crate::report::DEFAULT_HEADER;
use serde::{Deserialize, Serialize};

/// Settings that shape binding and report rendering.
///
/// Every field has a default, so partial JSON documents are accepted.
///
/// # Example
///
/// ```rust
/// use docval::engine::ValidatorConfig;
///
/// let config = ValidatorConfig::from_json_str(r#"{"validate_annotation": "schema/validation"}"#).unwrap();
/// assert_eq!(config.assert_annotation, "assert");
/// assert_eq!(config.validate_annotation, "schema/validation");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Annotation declaring fail-fast rules.
    pub assert_annotation: String,
    /// Annotation declaring deferred rules.
    pub validate_annotation: String,
    /// Bind annotations named after a predicate as deferred leaf rules.
    pub predicate_shorthand: bool,
    /// First line of rendered reports.
    pub header: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            assert_annotation: "assert".to_string(),
            validate_annotation: "validate".to_string(),
            predicate_shorthand: true,
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

impl ValidatorConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Reject settings that would make binding ambiguous.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.assert_annotation.is_empty() {
            return Err(ConfigError::EmptyAnnotationName { kind: "assert" });
        }
        if self.validate_annotation.is_empty() {
            return Err(ConfigError::EmptyAnnotationName { kind: "validate" });
        }
        if self.assert_annotation == self.validate_annotation {
            return Err(ConfigError::SameAnnotationNames(
                self.assert_annotation.clone(),
            ));
        }
        Ok(())
    }
}
