//! Configuration errors.

use thiserror::Error;

/// Errors that can occur when loading or assembling validator settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration text is not valid JSON for `ValidatorConfig`
    #[error("Failed to parse validator configuration: {0}")]
    ParseFailed(#[from] serde_json::Error),

    /// An annotation name is empty
    #[error("Annotation name for {kind} rules must not be empty")]
    EmptyAnnotationName { kind: &'static str },

    /// Both modes would bind from the same annotation
    #[error("Assert and validate annotations must differ (both are '{0}')")]
    SameAnnotationNames(String),
}
