//! Ordered collection of violations and its text rendering.

use super::violation::Violation;
use crate::document::Position;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub(crate) const DEFAULT_HEADER: &str = "One or more data values were invalid";

/// Violations in discovery order (document pre-order, then rule order).
///
/// A report is only appended to while a deferred pass runs; callers get it
/// read-only.
///
/// # Example
///
/// ```rust
/// use docval::document::{Annotation, DocumentBuilder, Position};
/// use serde_json::json;
///
/// let mut b = DocumentBuilder::new();
/// let name = b.scalar(json!(""), Position::new("values.yml", 2));
/// b.annotate(name, Annotation::new("validate", vec![json!("non_empty")]));
/// let root = b.mapping(vec![("name".into(), name)], Position::new("values.yml", 1));
/// let doc = b.build(root).unwrap();
///
/// let report = docval::run(&doc, "example").unwrap();
/// assert!(report.has_violations());
/// assert!(report.error().starts_with("One or more data values were invalid (example)"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViolationReport {
    label: String,
    #[serde(skip)]
    header: String,
    violations: Vec<Violation>,
}

impl ViolationReport {
    pub(crate) fn new(label: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            header: header.into(),
            violations: Vec::new(),
        }
    }

    pub(crate) fn extend(&mut self, violations: Vec<Violation>) {
        self.violations.extend(violations);
    }

    /// Opaque tag naming the pipeline stage that produced the report.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// `Ok(())` when clean, otherwise the report itself as the error.
    pub fn into_result(self) -> Result<(), ViolationReport> {
        if self.has_violations() {
            Err(self)
        } else {
            Ok(())
        }
    }

    /// Violations grouped by node position.
    ///
    /// Groups appear in the order their position was first discovered;
    /// violations keep discovery order within a group.
    pub fn grouped(&self) -> Vec<(&Position, Vec<&Violation>)> {
        let mut groups: Vec<(&Position, Vec<&Violation>)> = Vec::new();
        let mut index: HashMap<&Position, usize> = HashMap::new();

        for violation in &self.violations {
            let position = violation.position();
            match index.get(position) {
                Some(&slot) => groups[slot].1.push(violation),
                None => {
                    index.insert(position, groups.len());
                    groups.push((position, vec![violation]));
                }
            }
        }

        groups
    }

    /// Render the report as text. Empty when there are no violations.
    pub fn error(&self) -> String {
        if self.violations.is_empty() {
            return String::new();
        }

        let title = format!("{} ({})", self.header, self.label);
        let mut lines = vec![title.clone(), "=".repeat(title.chars().count()), String::new()];
        for (_, group) in self.grouped() {
            lines.extend(group.into_iter().map(Violation::to_string));
        }

        lines.join("\n")
    }
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error())
    }
}

impl std::error::Error for ViolationReport {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Location;

    fn violation(file_line: u32, description: &str) -> Violation {
        Violation::new(
            &Location::new(Position::new("v.yml", file_line), format!("item {file_line}")),
            description,
            "bad",
            Position::unknown(),
        )
    }

    #[test]
    fn empty_report_renders_nothing() {
        let report = ViolationReport::new("stage", DEFAULT_HEADER);
        assert!(!report.has_violations());
        assert_eq!(report.error(), "");
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn renders_header_and_one_line_per_violation() {
        let mut report = ViolationReport::new("stage", DEFAULT_HEADER);
        report.extend(vec![violation(2, "a")]);

        let title = "One or more data values were invalid (stage)";
        assert_eq!(
            report.error(),
            format!(
                "{title}\n{}\n\nv.yml:2: item 2 requires \"a\"; fail: bad",
                "=".repeat(title.len())
            )
        );
    }

    #[test]
    fn groups_by_first_discovered_position() {
        let mut report = ViolationReport::new("stage", "Invalid");
        report.extend(vec![violation(5, "a"), violation(2, "b"), violation(5, "c")]);

        let groups = report.grouped();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, &Position::new("v.yml", 5));
        let descriptions: Vec<&str> = groups[0].1.iter().map(|v| v.description()).collect();
        assert_eq!(descriptions, vec!["a", "c"]);

        let text = report.error();
        let body: Vec<&str> = text.lines().skip(3).collect();
        assert_eq!(
            body,
            vec![
                "v.yml:5: item 5 requires \"a\"; fail: bad",
                "v.yml:5: item 5 requires \"c\"; fail: bad",
                "v.yml:2: item 2 requires \"b\"; fail: bad",
            ]
        );
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn report_serializes_label_and_violations() {
        let mut report = ViolationReport::new("stage", DEFAULT_HEADER);
        report.extend(vec![violation(1, "a")]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["label"], "stage");
        assert_eq!(json["violations"].as_array().unwrap().len(), 1);
        assert!(json.get("header").is_none());
    }
}
