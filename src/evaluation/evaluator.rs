//! Evaluator that runs bound rule sets against node values.

use super::context::Subject;
use super::error::ValidationError;
use crate::binding::Bindings;
use crate::document::{release, Document, NodeId, NodeKind};
use crate::report::{Location, Violation, ViolationReport, DEFAULT_HEADER};
use crate::rules::Mode;
use serde_json::Value;
use std::ops::ControlFlow;
use tracing::debug;

static NULL: Value = Value::Null;

/// Runs the rule sets in `bindings` against the nodes of `document`.
pub struct Evaluator<'a> {
    document: &'a Document,
    bindings: &'a Bindings,
    header: String,
}

impl<'a> Evaluator<'a> {
    pub fn new(document: &'a Document, bindings: &'a Bindings) -> Self {
        Self {
            document,
            bindings,
            header: DEFAULT_HEADER.to_string(),
        }
    }

    /// Header line used when rendering deferred reports.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Run fail-fast rule sets in document order.
    ///
    /// Returns an error for the first violation found anywhere in the tree;
    /// no node after it is evaluated.
    pub fn process_asserts_immediately(&self) -> Result<(), ValidationError> {
        let first_violation = |violations: Vec<Violation>| match violations.into_iter().next() {
            Some(violation) => ControlFlow::Break(violation),
            None => ControlFlow::Continue(()),
        };

        match self.walk(Mode::FailFast, first_violation) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(violation) => {
                debug!(position = %violation.position(), "assertion failed, aborting walk");
                Err(ValidationError::AssertionFailed(violation))
            }
        }
    }

    /// Run deferred rule sets on every node and collect all violations.
    pub fn run_deferred(&self, label: &str) -> ViolationReport {
        let mut report = ViolationReport::new(label, self.header.as_str());

        let collect = |violations: Vec<Violation>| {
            report.extend(violations);
            ControlFlow::Continue(())
        };
        // Never breaks, so the walk always completes
        let _ = self.walk(Mode::Deferred, collect);

        debug!(label, violations = report.len(), "deferred validation finished");
        report
    }

    /// Evaluate every `mode` rule set in document pre-order, handing each
    /// node's violations to `visit`.
    ///
    /// The document value is materialized once per pass and each node is
    /// checked against its own slice of it.
    fn walk<F>(&self, mode: Mode, mut visit: F) -> ControlFlow<Violation>
    where
        F: FnMut(Vec<Violation>) -> ControlFlow<Violation>,
    {
        if !self.bindings.iter().any(|(_, sets)| sets.get(mode).is_some()) {
            return ControlFlow::Continue(());
        }

        let value = self.document.value_of(self.document.root());
        let flow = self.visit_nodes(mode, &value, &mut visit);
        release(value);
        flow
    }

    /// Explicit-stack pre-order: node first, then mapping entries in
    /// declaration order or sequence items in index order.
    fn visit_nodes<F>(&self, mode: Mode, root_value: &Value, visit: &mut F) -> ControlFlow<Violation>
    where
        F: FnMut(Vec<Violation>) -> ControlFlow<Violation>,
    {
        let mut stack: Vec<(NodeId, Subject, &Value)> =
            vec![(self.document.root(), Subject::Document, root_value)];

        while let Some((id, subject, value)) = stack.pop() {
            let node = self.document.node(id);

            if let Some(rule_set) = self.bindings.rule_set(id, mode) {
                let location = Location::new(node.position().clone(), subject.to_string());
                if let ControlFlow::Break(violation) = visit(rule_set.evaluate(value, &location)) {
                    return ControlFlow::Break(violation);
                }
            }

            // Pushed in reverse so the first child is visited first
            match node.kind() {
                NodeKind::Mapping(entries) => {
                    for (key, child) in entries.iter().rev() {
                        let child_value = value.get(key.as_str()).unwrap_or(&NULL);
                        stack.push((*child, Subject::Key(key.clone()), child_value));
                    }
                }
                NodeKind::Sequence(items) => {
                    for (index, child) in items.iter().enumerate().rev() {
                        let child_value = value.get(index).unwrap_or(&NULL);
                        stack.push((*child, Subject::Item(index), child_value));
                    }
                }
                NodeKind::Scalar(_) => {}
            }
        }

        ControlFlow::Continue(())
    }
}
