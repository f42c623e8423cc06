//! Ordered rules bound to a single node.

use super::rule::Rule;
use crate::document::Position;
use crate::report::{Location, Violation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stillwater::validation::Validation;

/// How a rule set reacts to a violated rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Stop at the first violated rule (`assert`).
    FailFast,
    /// Evaluate every rule and keep every violation (`validate`).
    Deferred,
}

/// Rules attached to one node, evaluated in declaration order.
#[derive(Clone, Debug)]
pub struct RuleSet {
    mode: Mode,
    rules: Vec<Rule>,
    declared_at: Position,
}

impl RuleSet {
    /// `declared_at` is the position of the first annotation contributing
    /// rules; it is reported alongside each violation.
    pub fn new(mode: Mode, rules: Vec<Rule>, declared_at: Position) -> Self {
        Self {
            mode,
            rules,
            declared_at,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn declared_at(&self) -> &Position {
        &self.declared_at
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate the rules against a node's value.
    ///
    /// `FailFast` returns at most one violation and never evaluates rules
    /// after the first violated one. `Deferred` evaluates all of them.
    pub fn evaluate(&self, value: &Value, location: &Location) -> Vec<Violation> {
        let mut violations = Vec::new();

        for rule in &self.rules {
            if let Validation::Failure(messages) = rule.evaluate(value) {
                let message: Vec<&str> = messages.iter().map(String::as_str).collect();
                violations.push(Violation::new(
                    location,
                    rule.description(),
                    message.join("; "),
                    self.declared_at.clone(),
                ));

                if self.mode == Mode::FailFast {
                    break;
                }
            }
        }

        violations
    }
}
