//! Pluggable leaf predicates and the registry that names them.
//!
//! A predicate is a pure check over a resolved value, parameterized by the
//! already-resolved annotation arguments. Predicates never panic on values of
//! the wrong kind; they return a failure detail naming expected vs actual.

use super::builtins;
use super::error::RuleError;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A predicate with its arguments already applied.
pub type Matcher = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

type CheckFn = Arc<dyn Fn(&[Value], &Value) -> Result<(), String> + Send + Sync>;
type PrepareFn = Arc<dyn Fn(&[Value]) -> Result<Matcher, String> + Send + Sync>;
type DescribeFn = Arc<dyn Fn(&[Value]) -> String + Send + Sync>;

/// Every name `kind_name` can return.
pub const KIND_NAMES: [&str; 6] = ["null", "boolean", "number", "string", "sequence", "mapping"];

/// Human-readable kind of a resolved value, used in diagnostics.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Number of arguments a predicate accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Expected kind of a predicate argument, checked at binding time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Any,
    Number,
    /// Non-negative integer.
    Count,
    String,
    /// String that compiles as a regular expression.
    Pattern,
    /// One of the value kind names (`null`, `boolean`, `number`, `string`,
    /// `sequence`, `mapping`).
    KindName,
}

impl ParamKind {
    fn check(self, arg: &Value) -> Result<(), String> {
        let ok = match self {
            ParamKind::Any => true,
            ParamKind::Number => arg.is_number(),
            ParamKind::Count => arg.as_u64().is_some(),
            ParamKind::String => arg.is_string(),
            ParamKind::Pattern => {
                let Some(pattern) = arg.as_str() else {
                    return Err(format!("found {}", kind_name(arg)));
                };
                return Regex::new(pattern)
                    .map(|_| ())
                    .map_err(|e| format!("invalid pattern: {e}"));
            }
            ParamKind::KindName => arg.as_str().is_some_and(|name| KIND_NAMES.contains(&name)),
        };

        if ok {
            Ok(())
        } else {
            Err(format!("found {} {}", kind_name(arg), arg))
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Any => "any value",
            ParamKind::Number => "a number",
            ParamKind::Count => "a non-negative integer",
            ParamKind::String => "a string",
            ParamKind::Pattern => "a regular expression",
            ParamKind::KindName => "a kind name",
        };
        f.write_str(name)
    }
}

/// A named, pure check over a resolved value.
///
/// # Example
///
/// ```rust
/// use docval::rules::{Arity, Predicate};
/// use serde_json::json;
///
/// let even = Predicate::new("even", Arity::Exactly(0), |_args, value| {
///     match value.as_i64() {
///         Some(n) if n % 2 == 0 => Ok(()),
///         Some(n) => Err(format!("{n} is odd")),
///         None => Err("expected number".to_string()),
///     }
/// });
///
/// assert!(even.test(&[], &json!(4)).is_ok());
/// assert!(even.test(&[], &json!(3)).is_err());
/// ```
#[derive(Clone)]
pub struct Predicate {
    name: String,
    arity: Arity,
    params: Vec<ParamKind>,
    describe: DescribeFn,
    check: Check,
}

#[derive(Clone)]
enum Check {
    /// Receives the arguments on every call.
    Direct(CheckFn),
    /// Turns the arguments into a `Matcher` once, when a rule is built.
    Prepared(PrepareFn),
}

impl Predicate {
    /// Create a predicate from a pure check function.
    ///
    /// The check returns `Err(detail)` when the value fails; the detail ends
    /// up in the violation message.
    pub fn new<F>(name: impl Into<String>, arity: Arity, check: F) -> Self
    where
        F: Fn(&[Value], &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        Self::with_check(name.into(), arity, Check::Direct(Arc::new(check)))
    }

    /// Create a predicate that does its argument-dependent work up front.
    ///
    /// `prepare` runs once per rule, after arity and parameter kinds have
    /// been checked, and returns the matcher used for every evaluation.
    /// Use it for arguments that are costly to interpret, such as patterns.
    pub fn prepared<F>(name: impl Into<String>, arity: Arity, prepare: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Matcher, String> + Send + Sync + 'static,
    {
        Self::with_check(name.into(), arity, Check::Prepared(Arc::new(prepare)))
    }

    fn with_check(name: String, arity: Arity, check: Check) -> Self {
        let default_name = name.clone();
        Self {
            name,
            arity,
            params: Vec::new(),
            describe: Arc::new(move |args: &[Value]| default_description(&default_name, args)),
            check,
        }
    }

    /// Expected argument kinds by position. The last kind applies to any
    /// further variadic arguments.
    pub fn params(mut self, params: Vec<ParamKind>) -> Self {
        self.params = params;
        self
    }

    /// Override how the predicate describes itself in reports.
    pub fn describe_with<F>(mut self, describe: F) -> Self
    where
        F: Fn(&[Value]) -> String + Send + Sync + 'static,
    {
        self.describe = Arc::new(describe);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    fn param_kind(&self, index: usize) -> ParamKind {
        self.params
            .get(index)
            .or(self.params.last())
            .copied()
            .unwrap_or(ParamKind::Any)
    }

    /// Check resolved arguments against arity and parameter kinds.
    pub fn check_args(&self, args: &[Value]) -> Result<(), RuleError> {
        if !self.arity.accepts(args.len()) {
            return Err(RuleError::ArityMismatch {
                predicate: self.name.clone(),
                expected: self.arity,
                found: args.len(),
            });
        }

        for (index, arg) in args.iter().enumerate() {
            let expected = self.param_kind(index);
            expected
                .check(arg)
                .map_err(|reason| RuleError::InvalidArgument {
                    predicate: self.name.clone(),
                    index,
                    expected,
                    reason,
                })?;
        }

        Ok(())
    }

    pub fn describe(&self, args: &[Value]) -> String {
        (self.describe)(args)
    }

    /// Check `args` and apply them, yielding the matcher a rule evaluates.
    pub fn matcher(&self, args: &[Value]) -> Result<Matcher, RuleError> {
        self.check_args(args)?;

        match &self.check {
            Check::Direct(check) => {
                let check = Arc::clone(check);
                let args = args.to_vec();
                Ok(Arc::new(move |value: &Value| check(args.as_slice(), value)))
            }
            Check::Prepared(prepare) => prepare(args).map_err(|reason| RuleError::InvalidArgument {
                predicate: self.name.clone(),
                index: 0,
                expected: self.param_kind(0),
                reason,
            }),
        }
    }

    /// Apply the predicate to a value.
    pub fn test(&self, args: &[Value], value: &Value) -> Result<(), String> {
        match &self.check {
            Check::Direct(check) => check(args, value),
            Check::Prepared(prepare) => {
                let matcher = prepare(args)?;
                matcher(value)
            }
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

fn default_description(name: &str, args: &[Value]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        let args: Vec<String> = args.iter().map(Value::to_string).collect();
        format!("{name}({})", args.join(", "))
    }
}

/// Predicates available to the binder, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct PredicateRegistry {
    predicates: BTreeMap<String, Predicate>,
}

impl PredicateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in predicates.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for predicate in builtins::all() {
            registry.register(predicate);
        }
        registry
    }

    /// Register a predicate, replacing any existing one with the same name.
    pub fn register(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.insert(predicate.name.clone(), predicate);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn always_ok(name: &str, arity: Arity) -> Predicate {
        Predicate::new(name, arity, |_, _| Ok(()))
    }

    #[test]
    fn kind_names_cover_every_value() {
        assert_eq!(kind_name(&json!(null)), "null");
        assert_eq!(kind_name(&json!(true)), "boolean");
        assert_eq!(kind_name(&json!(1.5)), "number");
        assert_eq!(kind_name(&json!("s")), "string");
        assert_eq!(kind_name(&json!([1])), "sequence");
        assert_eq!(kind_name(&json!({"a": 1})), "mapping");
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let p = always_ok("min_len", Arity::Exactly(1));

        let err = p.check_args(&[]).unwrap_err();
        assert_eq!(
            err,
            RuleError::ArityMismatch {
                predicate: "min_len".to_string(),
                expected: Arity::Exactly(1),
                found: 0
            }
        );
        assert!(p.check_args(&[json!(1)]).is_ok());
    }

    #[test]
    fn variadic_params_reuse_last_kind() {
        let p = always_ok("keys", Arity::AtLeast(1)).params(vec![ParamKind::String]);

        assert!(p.check_args(&[json!("a"), json!("b")]).is_ok());
        let err = p.check_args(&[json!("a"), json!(2)]).unwrap_err();
        assert!(matches!(err, RuleError::InvalidArgument { index: 1, .. }));
    }

    #[test]
    fn count_rejects_negative_and_fractional() {
        let p = always_ok("min_len", Arity::Exactly(1)).params(vec![ParamKind::Count]);

        assert!(p.check_args(&[json!(3)]).is_ok());
        assert!(p.check_args(&[json!(-1)]).is_err());
        assert!(p.check_args(&[json!(1.5)]).is_err());
    }

    #[test]
    fn pattern_must_compile() {
        let p = always_ok("matches", Arity::Exactly(1)).params(vec![ParamKind::Pattern]);

        assert!(p.check_args(&[json!("^[a-z]+$")]).is_ok());
        let err = p.check_args(&[json!("(")]).unwrap_err();
        assert!(err.to_string().contains("invalid pattern"));
    }

    #[test]
    fn kind_name_params_accept_only_known_kinds() {
        let p = always_ok("kind", Arity::AtLeast(1)).params(vec![ParamKind::KindName]);

        for name in KIND_NAMES {
            assert!(p.check_args(&[json!(name)]).is_ok(), "{name} should be accepted");
        }
        let err = p.check_args(&[json!("string"), json!("integer")]).unwrap_err();
        assert!(matches!(
            err,
            RuleError::InvalidArgument {
                index: 1,
                expected: ParamKind::KindName,
                ..
            }
        ));
        assert!(p.check_args(&[json!(3)]).is_err());
    }

    #[test]
    fn prepared_predicates_prepare_once_per_matcher() {
        let prepared = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&prepared);
        let p = Predicate::prepared("equals", Arity::Exactly(1), move |args| {
            counter.fetch_add(1, Ordering::SeqCst);
            let expected = args[0].clone();
            Ok(Arc::new(move |value: &Value| {
                if *value == expected {
                    Ok(())
                } else {
                    Err("different".to_string())
                }
            }) as Matcher)
        });

        let matcher = p.matcher(&[json!(1)]).unwrap();
        assert!(matcher(&json!(1)).is_ok());
        assert!(matcher(&json!(2)).is_err());
        assert!(matcher(&json!(1)).is_ok());
        assert_eq!(prepared.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prepare_failures_are_argument_errors() {
        let p = Predicate::prepared("picky", Arity::Exactly(1), |_| Err("unusable".to_string()));

        let err = p.matcher(&[json!(1)]).err().unwrap();
        assert!(matches!(err, RuleError::InvalidArgument { ref reason, .. } if reason == "unusable"));
        assert_eq!(p.test(&[json!(1)], &json!(1)), Err("unusable".to_string()));
    }

    #[test]
    fn default_description_lists_args() {
        let p = always_ok("between", Arity::Exactly(2));
        assert_eq!(p.describe(&[json!(1), json!("x")]), "between(1, \"x\")");
        assert_eq!(always_ok("flag", Arity::Exactly(0)).describe(&[]), "flag");
    }

    #[test]
    fn registry_replaces_by_name() {
        let mut registry = PredicateRegistry::new();
        registry
            .register(always_ok("x", Arity::Exactly(0)))
            .register(always_ok("x", Arity::Exactly(2)));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("x").unwrap().arity(), Arity::Exactly(2));
    }

    #[test]
    fn builtins_are_registered() {
        let registry = PredicateRegistry::with_builtins();
        for name in ["not_null", "non_empty", "min_len", "max_len", "min", "max", "enum"] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
    }
}
