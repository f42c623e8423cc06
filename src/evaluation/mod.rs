//! Evaluation passes over a bound document.
//!
//! Two independent passes share one pre-order walk, so both visit nodes in
//! the same order:
//! - `process_asserts_immediately` runs fail-fast rule sets and aborts the
//!   whole walk at the first violation
//! - `run_deferred` runs deferred rule sets and collects every violation
//!
//! Both are pure: the only mutable state is the report owned by one call.

mod context;
mod error;
mod evaluator;

pub use context::Subject;
pub use error::ValidationError;
pub use evaluator::Evaluator;
