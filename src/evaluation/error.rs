//! Errors that stop a validation pass.

use crate::binding::BindingError;
use crate::report::Violation;
use thiserror::Error;

/// Fatal outcome of a validation pass.
///
/// Binding errors mean the annotations are malformed; an assertion failure
/// means the data broke a fail-fast rule. Deferred violations are never
/// reported through this type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("invalid validation annotation: {0}")]
    Binding(#[from] BindingError),

    #[error("assertion failed: {0}")]
    AssertionFailed(Violation),
}

impl ValidationError {
    /// The violation behind an assertion failure.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            ValidationError::AssertionFailed(violation) => Some(violation),
            ValidationError::Binding(_) => None,
        }
    }
}
