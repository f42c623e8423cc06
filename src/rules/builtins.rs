//! Built-in predicates.
//!
//! These cover the common named checks authors reach for (null checks,
//! lengths, numeric bounds, enumerations, kinds, patterns). Hosts can add or
//! replace predicates through `PredicateRegistry::register`.

use super::predicate::{kind_name, Arity, Matcher, ParamKind, Predicate};
use regex::Regex;
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::sync::Arc;

/// Every built-in predicate, in registration order.
pub fn all() -> Vec<Predicate> {
    vec![
        not_null(),
        non_empty(),
        min_len(),
        max_len(),
        min(),
        max(),
        enumeration(),
        kind(),
        matches(),
        one_not_null(),
    ]
}

fn length_of(value: &Value) -> Result<usize, String> {
    match value {
        Value::String(s) => Ok(s.chars().count()),
        Value::Array(items) => Ok(items.len()),
        Value::Object(entries) => Ok(entries.len()),
        other => Err(format!(
            "expected string, sequence or mapping, found {}",
            kind_name(other)
        )),
    }
}

fn number_of(value: &Value) -> Result<&Number, String> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(format!("expected number, found {}", kind_name(other))),
    }
}

/// Order two numbers, exactly when both are integers.
fn compare(value: &Number, bound: &Number) -> Option<Ordering> {
    if value.is_f64() || bound.is_f64() {
        return value.as_f64()?.partial_cmp(&bound.as_f64()?);
    }
    match (value.as_i64(), bound.as_i64()) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        // The other side is a u64 above i64::MAX
        (Some(_), None) => Some(Ordering::Less),
        (None, Some(_)) => Some(Ordering::Greater),
        (None, None) => Some(value.as_u64()?.cmp(&bound.as_u64()?)),
    }
}

/// Compare a value against the numeric bound in `args`.
fn against_bound(args: &[Value], value: &Value) -> Result<Ordering, String> {
    let bound = number_arg(args)?;
    let n = number_of(value)?;
    compare(n, bound).ok_or_else(|| format!("{n} cannot be compared with {bound}"))
}

// Arguments are checked at binding time; these only guard direct callers.
fn count_arg(args: &[Value]) -> Result<usize, String> {
    args.first()
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| "missing length argument".to_string())
}

fn number_arg(args: &[Value]) -> Result<&Number, String> {
    match args.first() {
        Some(Value::Number(n)) => Ok(n),
        _ => Err("missing numeric argument".to_string()),
    }
}

fn first_arg(args: &[Value]) -> String {
    args.first().map(Value::to_string).unwrap_or_default()
}

/// Value must not be null.
pub fn not_null() -> Predicate {
    Predicate::new("not_null", Arity::Exactly(0), |_, value| {
        if value.is_null() {
            Err("value is null".to_string())
        } else {
            Ok(())
        }
    })
    .describe_with(|_| "not null".to_string())
}

/// String, sequence or mapping must have at least one element.
pub fn non_empty() -> Predicate {
    Predicate::new("non_empty", Arity::Exactly(0), |_, value| {
        let what = match value {
            Value::String(s) if s.is_empty() => "empty string",
            Value::Array(items) if items.is_empty() => "empty sequence",
            Value::Object(entries) if entries.is_empty() => "empty mapping",
            Value::Null => "null",
            Value::String(_) | Value::Array(_) | Value::Object(_) => return Ok(()),
            other => {
                return Err(format!(
                    "expected string, sequence or mapping, found {}",
                    kind_name(other)
                ))
            }
        };
        Err(format!("found {what} where a non-empty value was required"))
    })
    .describe_with(|_| "non-empty".to_string())
}

/// Length must be greater or equal to the argument.
pub fn min_len() -> Predicate {
    Predicate::new("min_len", Arity::Exactly(1), |args, value| {
        let bound = count_arg(args)?;
        let len = length_of(value)?;
        if len < bound {
            Err(format!("length of {len} is less than {bound}"))
        } else {
            Ok(())
        }
    })
    .params(vec![ParamKind::Count])
    .describe_with(|args| format!("length greater or equal to {}", first_arg(args)))
}

/// Length must be less or equal to the argument.
pub fn max_len() -> Predicate {
    Predicate::new("max_len", Arity::Exactly(1), |args, value| {
        let bound = count_arg(args)?;
        let len = length_of(value)?;
        if len > bound {
            Err(format!("length of {len} is more than {bound}"))
        } else {
            Ok(())
        }
    })
    .params(vec![ParamKind::Count])
    .describe_with(|args| format!("length less than or equal to {}", first_arg(args)))
}

/// Number must be greater or equal to the argument.
pub fn min() -> Predicate {
    Predicate::new("min", Arity::Exactly(1), |args, value| {
        if against_bound(args, value)? == Ordering::Less {
            Err(format!("{value} is less than {}", first_arg(args)))
        } else {
            Ok(())
        }
    })
    .params(vec![ParamKind::Number])
    .describe_with(|args| format!("a value greater or equal to {}", first_arg(args)))
}

/// Number must be less or equal to the argument.
pub fn max() -> Predicate {
    Predicate::new("max", Arity::Exactly(1), |args, value| {
        if against_bound(args, value)? == Ordering::Greater {
            Err(format!("{value} is more than {}", first_arg(args)))
        } else {
            Ok(())
        }
    })
    .params(vec![ParamKind::Number])
    .describe_with(|args| format!("a value less than or equal to {}", first_arg(args)))
}

fn list(args: &[Value]) -> String {
    let items: Vec<String> = args.iter().map(Value::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Value must equal one of the arguments.
pub fn enumeration() -> Predicate {
    Predicate::new("enum", Arity::AtLeast(1), |args, value| {
        if args.contains(value) {
            Ok(())
        } else {
            Err("value is not one of the allowed values".to_string())
        }
    })
    .describe_with(|args| format!("one of {}", list(args)))
}

/// Value must be of one of the named kinds (`null`, `boolean`, `number`,
/// `string`, `sequence`, `mapping`).
pub fn kind() -> Predicate {
    Predicate::new("kind", Arity::AtLeast(1), |args, value| {
        let actual = kind_name(value);
        if args.iter().any(|k| k.as_str() == Some(actual)) {
            Ok(())
        } else {
            let expected: Vec<&str> = args.iter().filter_map(Value::as_str).collect();
            Err(format!("expected {}, found {actual}", expected.join(" or ")))
        }
    })
    .params(vec![ParamKind::KindName])
    .describe_with(|args| {
        let kinds: Vec<&str> = args.iter().filter_map(Value::as_str).collect();
        format!("a value of kind {}", kinds.join(" or "))
    })
}

/// String must match the regular expression argument.
///
/// The pattern is compiled once per rule, not per evaluation.
pub fn matches() -> Predicate {
    Predicate::prepared("matches", Arity::Exactly(1), |args| {
        let pattern = args
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| "missing pattern argument".to_string())?;
        let re = Regex::new(pattern).map_err(|e| format!("invalid pattern: {e}"))?;

        let matcher: Matcher = Arc::new(move |value: &Value| {
            let Value::String(s) = value else {
                return Err(format!("expected string, found {}", kind_name(value)));
            };
            if re.is_match(s) {
                Ok(())
            } else {
                Err(format!("does not match /{}/", re.as_str()))
            }
        });
        Ok(matcher)
    })
    .params(vec![ParamKind::Pattern])
    .describe_with(|args| {
        let pattern = args.first().and_then(Value::as_str).unwrap_or_default();
        format!("a string matching /{pattern}/")
    })
}

/// Mapping must have exactly one non-null value among the named keys, or
/// among all keys when none are named.
pub fn one_not_null() -> Predicate {
    Predicate::new("one_not_null", Arity::AtLeast(0), |args, value| {
        let Value::Object(entries) = value else {
            return Err(format!("expected mapping, found {}", kind_name(value)));
        };
        let keys: Vec<&str> = if args.is_empty() {
            entries.keys().map(String::as_str).collect()
        } else {
            args.iter().filter_map(Value::as_str).collect()
        };
        let present: Vec<&str> = keys
            .into_iter()
            .filter(|k| entries.get(*k).is_some_and(|v| !v.is_null()))
            .collect();
        match present.len() {
            1 => Ok(()),
            0 => Err("all values are null".to_string()),
            n => Err(format!(
                "{n} values are not null ({})",
                present.join(", ")
            )),
        }
    })
    .params(vec![ParamKind::String])
    .describe_with(|args| {
        if args.is_empty() {
            "exactly one non-null value".to_string()
        } else {
            format!("exactly one non-null value among {}", list(args))
        }
    })
}
