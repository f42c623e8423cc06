//! Rule model: predicates, composite rules and rule sets.
//!
//! A `Rule` is an immutable recursive value: either a leaf that applies a
//! pluggable `Predicate`, or a composite (`and`, `or`, `one_of`, `not`) over
//! child rules evaluated against the same value. Evaluation is total: type
//! mismatches come back as violated outcomes, never as errors.
//!
//! Outcomes use Stillwater's `Validation` so composites accumulate every
//! failing child instead of stopping at the first one.

pub mod builtins;
mod error;
mod predicate;
mod rule;
mod rule_set;

pub use error::RuleError;
pub use predicate::{kind_name, Arity, Matcher, ParamKind, Predicate, PredicateRegistry, KIND_NAMES};
pub use rule::{Combinator, CompositeRule, LeafRule, Outcome, Rule};
pub use rule_set::{Mode, RuleSet};
