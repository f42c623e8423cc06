//! Leaf and composite rules.

use super::error::RuleError;
use super::predicate::{kind_name, Matcher, Predicate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::io;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Result of evaluating a rule: success, or every failure message.
pub type Outcome = Validation<(), NonEmptyVec<String>>;

const MAX_SHOWN_VALUE: usize = 60;

/// Byte sink that refuses writes past `cap`, cutting serialization short.
struct Capped {
    bytes: Vec<u8>,
    cap: usize,
}

impl io::Write for Capped {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.cap.saturating_sub(self.bytes.len());
        if room == 0 {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "value preview is full"));
        }
        let taken = room.min(buf.len());
        self.bytes.extend_from_slice(&buf[..taken]);
        Ok(taken)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Compact rendering of an observed value for diagnostics.
///
/// Only the shown prefix is ever serialized, so large or deeply nested
/// values cost no more than small ones.
fn observed(value: &Value) -> String {
    // Enough bytes for one character past the limit
    let mut sink = Capped {
        bytes: Vec::new(),
        cap: (MAX_SHOWN_VALUE + 1) * 4,
    };
    // A full sink ends serialization early; the prefix is all we need
    let _ = serde_json::to_writer(&mut sink, value);

    let rendered = String::from_utf8_lossy(&sink.bytes);
    let shown = if rendered.chars().count() > MAX_SHOWN_VALUE {
        let head: String = rendered.chars().take(MAX_SHOWN_VALUE).collect();
        format!("{head}...")
    } else {
        rendered.into_owned()
    };
    format!("{} {shown}", kind_name(value))
}

/// Logical combinators over child rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    And,
    Or,
    OneOf,
    Not,
}

impl Combinator {
    /// Keyword used for this combinator in annotation rule specs.
    pub fn keyword(self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
            Combinator::OneOf => "one_of",
            Combinator::Not => "not",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "and" => Some(Combinator::And),
            "or" => Some(Combinator::Or),
            "one_of" => Some(Combinator::OneOf),
            "not" => Some(Combinator::Not),
            _ => None,
        }
    }

    fn describe(self, children: &[Rule]) -> String {
        let parts: Vec<&str> = children.iter().map(Rule::description).collect();
        let joined = parts.join(", ");
        match self {
            Combinator::And => format!("all of ({joined})"),
            Combinator::Or => format!("any of ({joined})"),
            Combinator::OneOf => format!("exactly one of ({joined})"),
            Combinator::Not => format!("not ({joined})"),
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A predicate applied directly to the target value.
#[derive(Clone)]
pub struct LeafRule {
    predicate: Predicate,
    args: Vec<Value>,
    description: String,
    matcher: Matcher,
}

impl LeafRule {
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The failure message carries the detail only; whoever shows it
    /// alongside the rule already names the description.
    fn evaluate(&self, value: &Value) -> Outcome {
        match (self.matcher)(value) {
            Ok(()) => Validation::success(()),
            Err(detail) => Validation::fail(format!("{detail} (got {})", observed(value))),
        }
    }
}

impl fmt::Debug for LeafRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafRule")
            .field("predicate", &self.predicate)
            .field("args", &self.args)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Prefix each failure of `child` with its description.
fn attributed(child: &Rule, outcome: Outcome) -> Outcome {
    match outcome {
        Validation::Success(()) => Validation::success(()),
        Validation::Failure(messages) => {
            let labelled: Vec<Outcome> = messages
                .iter()
                .map(|message| Validation::fail(format!("{}: {message}", child.description())))
                .collect();
            Validation::all_vec(labelled).map(|_| ())
        }
    }
}

/// A combinator over child rules, all evaluated against the same value.
#[derive(Clone, Debug)]
pub struct CompositeRule {
    combinator: Combinator,
    children: Vec<Rule>,
    description: String,
}

impl CompositeRule {
    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn children(&self) -> &[Rule] {
        &self.children
    }

    fn evaluate(&self, value: &Value) -> Outcome {
        // Every child runs; no short circuit inside a composite
        let outcomes: Vec<Outcome> = self
            .children
            .iter()
            .map(|child| attributed(child, child.evaluate(value)))
            .collect();

        match self.combinator {
            Combinator::And => Validation::all_vec(outcomes).map(|_| ()),
            Combinator::Or => {
                if outcomes.iter().any(|o| o.is_success()) {
                    Validation::success(())
                } else {
                    Validation::all_vec(outcomes).map(|_| ())
                }
            }
            Combinator::OneOf => {
                let satisfied: Vec<&str> = self
                    .children
                    .iter()
                    .zip(&outcomes)
                    .filter(|(_, outcome)| outcome.is_success())
                    .map(|(child, _)| child.description())
                    .collect();
                match satisfied.len() {
                    1 => Validation::success(()),
                    0 => Validation::all_vec(outcomes).map(|_| ()),
                    n => Validation::fail(format!(
                        "{n} rules satisfied where exactly one was required: {} (got {})",
                        satisfied.join(", "),
                        observed(value)
                    )),
                }
            }
            Combinator::Not => {
                // Construction guarantees exactly one child
                if outcomes.iter().all(|o| o.is_success()) {
                    Validation::fail(format!(
                        "{} was satisfied but must not be (got {})",
                        self.children[0].description(),
                        observed(value)
                    ))
                } else {
                    Validation::success(())
                }
            }
        }
    }
}

/// An immutable, recursively composable validation rule.
///
/// # Example
///
/// ```rust
/// use docval::rules::{builtins, Rule};
/// use serde_json::json;
///
/// let rule = Rule::and(vec![
///     Rule::leaf(builtins::non_empty(), vec![]).unwrap(),
///     Rule::leaf(builtins::max_len(), vec![json!(3)]).unwrap(),
/// ])
/// .unwrap();
///
/// assert!(rule.evaluate(&json!("abc")).is_success());
/// assert!(rule.evaluate(&json!("abcd")).is_failure());
/// ```
#[derive(Clone, Debug)]
pub enum Rule {
    Leaf(LeafRule),
    Composite(CompositeRule),
}

impl Rule {
    /// Bind a predicate to resolved arguments, checking arity and kinds.
    pub fn leaf(predicate: Predicate, args: Vec<Value>) -> Result<Self, RuleError> {
        let matcher = predicate.matcher(&args)?;
        let description = predicate.describe(&args);
        Ok(Rule::Leaf(LeafRule {
            predicate,
            args,
            description,
            matcher,
        }))
    }

    /// Combine child rules. `not` needs exactly one child; the others at
    /// least one.
    pub fn composite(combinator: Combinator, children: Vec<Rule>) -> Result<Self, RuleError> {
        match (combinator, children.len()) {
            (Combinator::Not, 1) => {}
            (Combinator::Not, found) => return Err(RuleError::MalformedNot { found }),
            (_, 0) => {
                return Err(RuleError::EmptyComposite {
                    combinator: combinator.keyword(),
                })
            }
            _ => {}
        }

        let description = combinator.describe(&children);
        Ok(Rule::Composite(CompositeRule {
            combinator,
            children,
            description,
        }))
    }

    pub fn and(children: Vec<Rule>) -> Result<Self, RuleError> {
        Self::composite(Combinator::And, children)
    }

    pub fn or(children: Vec<Rule>) -> Result<Self, RuleError> {
        Self::composite(Combinator::Or, children)
    }

    pub fn one_of(children: Vec<Rule>) -> Result<Self, RuleError> {
        Self::composite(Combinator::OneOf, children)
    }

    pub fn not(child: Rule) -> Self {
        let description = Combinator::Not.describe(std::slice::from_ref(&child));
        Rule::Composite(CompositeRule {
            combinator: Combinator::Not,
            children: vec![child],
            description,
        })
    }

    /// Replace the generated description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        match &mut self {
            Rule::Leaf(leaf) => leaf.description = description,
            Rule::Composite(composite) => composite.description = description,
        }
        self
    }

    pub fn description(&self) -> &str {
        match self {
            Rule::Leaf(leaf) => &leaf.description,
            Rule::Composite(composite) => &composite.description,
        }
    }

    /// Evaluate against a value. Never fails: mismatches are failures.
    pub fn evaluate(&self, value: &Value) -> Outcome {
        match self {
            Rule::Leaf(leaf) => leaf.evaluate(value),
            Rule::Composite(composite) => composite.evaluate(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::predicate::Arity;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fixed(name: &str, pass: bool) -> Rule {
        let message = format!("{name} failed");
        let predicate = Predicate::new(name, Arity::Exactly(0), move |_, _| {
            if pass {
                Ok(())
            } else {
                Err(message.clone())
            }
        });
        Rule::leaf(predicate, vec![]).unwrap()
    }

    fn messages(outcome: Outcome) -> Vec<String> {
        match outcome {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().cloned().collect(),
        }
    }

    #[test]
    fn leaf_message_names_detail_and_value() {
        let rule = Rule::leaf(crate::rules::builtins::non_empty(), vec![]).unwrap();
        let msgs = messages(rule.evaluate(&json!("")));

        assert_eq!(
            msgs,
            vec!["found empty string where a non-empty value was required (got string \"\")"]
        );
    }

    #[test]
    fn and_reports_only_violated_children() {
        let rule = Rule::and(vec![fixed("a", true), fixed("b", false)]).unwrap();
        let msgs = messages(rule.evaluate(&json!(1)));

        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].starts_with("b: b failed"));
    }

    #[test]
    fn and_aggregates_every_violation() {
        let rule = Rule::and(vec![fixed("a", false), fixed("b", false)]).unwrap();
        let msgs = messages(rule.evaluate(&json!(1)));

        assert_eq!(msgs.len(), 2);
        assert!(msgs[0].starts_with("a: a failed"));
        assert!(msgs[1].starts_with("b: b failed"));
    }

    #[test]
    fn or_is_satisfied_by_any_child() {
        let rule = Rule::or(vec![fixed("a", false), fixed("b", true)]).unwrap();
        assert!(rule.evaluate(&json!(1)).is_success());

        let rule = Rule::or(vec![fixed("a", false), fixed("b", false)]).unwrap();
        assert_eq!(messages(rule.evaluate(&json!(1))).len(), 2);
    }

    #[test]
    fn one_of_requires_exactly_one() {
        let one = Rule::one_of(vec![fixed("a", true), fixed("b", false)]).unwrap();
        assert!(one.evaluate(&json!(1)).is_success());

        let two = Rule::one_of(vec![fixed("a", true), fixed("b", true)]).unwrap();
        let msgs = messages(two.evaluate(&json!(1)));
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].starts_with("2 rules satisfied where exactly one was required: a, b"));

        let none = Rule::one_of(vec![fixed("a", false), fixed("b", false)]).unwrap();
        assert_eq!(messages(none.evaluate(&json!(1))).len(), 2);
    }

    #[test]
    fn not_inverts_its_child() {
        assert!(Rule::not(fixed("a", false)).evaluate(&json!(1)).is_success());

        let msgs = messages(Rule::not(fixed("a", true)).evaluate(&json!(1)));
        assert_eq!(msgs, vec!["a was satisfied but must not be (got number 1)"]);
    }

    #[test]
    fn not_with_two_children_is_a_construction_error() {
        let err = Rule::composite(Combinator::Not, vec![fixed("a", true), fixed("b", true)])
            .unwrap_err();
        assert_eq!(err, RuleError::MalformedNot { found: 2 });

        let err = Rule::composite(Combinator::Not, vec![]).unwrap_err();
        assert_eq!(err, RuleError::MalformedNot { found: 0 });
    }

    #[test]
    fn empty_and_or_are_construction_errors() {
        assert_eq!(
            Rule::and(vec![]).unwrap_err(),
            RuleError::EmptyComposite { combinator: "and" }
        );
        assert_eq!(
            Rule::or(vec![]).unwrap_err(),
            RuleError::EmptyComposite { combinator: "or" }
        );
    }

    #[test]
    fn nested_composites_describe_recursively() {
        let inner = Rule::or(vec![fixed("a", false), fixed("b", true)]).unwrap();
        let rule = Rule::and(vec![inner, Rule::not(fixed("c", false))]).unwrap();

        assert_eq!(rule.description(), "all of (any of (a, b), not (c))");
        assert!(rule.evaluate(&json!(null)).is_success());
    }

    #[test]
    fn description_override_is_used_in_messages() {
        let custom = fixed("a", false).with_description("custom");
        assert_eq!(custom.description(), "custom");

        let rule = Rule::and(vec![custom]).unwrap();
        assert_eq!(
            messages(rule.evaluate(&json!(1))),
            vec!["custom: a failed (got number 1)"]
        );
    }

    #[test]
    fn nested_failures_name_every_enclosing_rule() {
        let inner = Rule::or(vec![fixed("a", false), fixed("b", false)]).unwrap();
        let rule = Rule::and(vec![fixed("c", true), inner]).unwrap();

        assert_eq!(
            messages(rule.evaluate(&json!(1))),
            vec![
                "any of (a, b): a: a failed (got number 1)",
                "any of (a, b): b: b failed (got number 1)",
            ]
        );
    }

    #[test]
    fn leaves_prepare_their_arguments_once() {
        let prepared = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&prepared);
        let predicate = Predicate::prepared("at_least", Arity::Exactly(1), move |args| {
            counter.fetch_add(1, Ordering::SeqCst);
            let bound = args[0].as_i64().unwrap_or_default();
            Ok(Arc::new(move |value: &Value| match value.as_i64() {
                Some(n) if n >= bound => Ok(()),
                _ => Err(format!("below {bound}")),
            }) as Matcher)
        });
        let rule = Rule::leaf(predicate, vec![json!(3)]).unwrap();

        for n in 0..5 {
            let _ = rule.evaluate(&json!(n));
        }
        assert_eq!(messages(rule.evaluate(&json!(1))), vec!["below 3 (got number 1)"]);
        assert_eq!(prepared.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn long_values_are_truncated() {
        let long = "x".repeat(200);
        let rendered = observed(&json!(long));
        assert!(rendered.ends_with("..."));
        assert!(rendered.len() < 80);
    }

    #[test]
    fn deep_values_are_previewed_without_full_serialization() {
        let rendered = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let mut value = json!(0);
                for _ in 0..50_000 {
                    value = Value::Array(vec![value]);
                }
                let rendered = observed(&value);
                crate::document::release(value);
                rendered
            })
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(rendered, format!("sequence {}...", "[".repeat(MAX_SHOWN_VALUE)));
    }
}
