//! Errors raised while constructing rules.

use super::predicate::{Arity, ParamKind};
use thiserror::Error;

/// Construction-time errors for leaf and composite rules.
///
/// These describe a malformed rule, never invalid data. The binder attaches
/// the offending node position before surfacing them.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuleError {
    #[error("predicate '{predicate}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        predicate: String,
        expected: Arity,
        found: usize,
    },

    #[error("predicate '{predicate}' argument {index} must be {expected}: {reason}")]
    InvalidArgument {
        predicate: String,
        index: usize,
        expected: ParamKind,
        reason: String,
    },

    #[error("'not' must wrap exactly one rule, got {found}")]
    MalformedNot { found: usize },

    #[error("'{combinator}' requires at least one rule")]
    EmptyComposite { combinator: &'static str },
}
