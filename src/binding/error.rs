//! Errors for malformed validation annotations.

use crate::document::Position;
use crate::rules::RuleError;
use thiserror::Error;

/// The validation annotations themselves are malformed.
///
/// Every variant references the position of the node carrying the
/// offending annotation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BindingError {
    #[error("{position}: unknown rule '{name}'")]
    UnknownPredicate { position: Position, name: String },

    #[error("{position}: {source}")]
    InvalidRule {
        position: Position,
        #[source]
        source: RuleError,
    },

    #[error("{position}: malformed rule: {reason}")]
    MalformedRule { position: Position, reason: String },

    #[error("{position}: @{annotation} requires at least one rule")]
    EmptyAnnotation {
        position: Position,
        annotation: String,
    },
}

impl BindingError {
    /// Position of the node whose annotation is malformed.
    pub fn position(&self) -> &Position {
        match self {
            BindingError::UnknownPredicate { position, .. }
            | BindingError::InvalidRule { position, .. }
            | BindingError::MalformedRule { position, .. }
            | BindingError::EmptyAnnotation { position, .. } => position,
        }
    }
}
