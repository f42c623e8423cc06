//! A single failed rule evaluation.

use crate::document::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a violation. There is no warning tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
}

/// Where a rule set was evaluated: the node position and a short
/// description of the node (`document`, `key "name"`, `item 2`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub position: Position,
    pub subject: String,
}

impl Location {
    pub fn new(position: Position, subject: impl Into<String>) -> Self {
        Self {
            position,
            subject: subject.into(),
        }
    }
}

/// Immutable record of one violated rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    position: Position,
    subject: String,
    description: String,
    message: String,
    severity: Severity,
    declared_at: Position,
}

impl Violation {
    pub fn new(
        location: &Location,
        description: impl Into<String>,
        message: impl Into<String>,
        declared_at: Position,
    ) -> Self {
        Self {
            position: location.position.clone(),
            subject: location.subject.clone(),
            description: description.into(),
            message: message.into(),
            severity: Severity::Error,
            declared_at,
        }
    }

    /// Position of the violating node.
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Position of the annotation that declared the violated rule.
    pub fn declared_at(&self) -> &Position {
        &self.declared_at
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} requires \"{}\"; fail: {}",
            self.position, self.subject, self.description, self.message
        )?;
        if self.declared_at.is_known() {
            write!(f, " (by {})", self.declared_at)?;
        }
        Ok(())
    }
}
