//! Violations and the report that collects them.
//!
//! Violations are self-contained: they copy positions and descriptions out
//! of the tree and the rules, so a report outlives both.

mod violation;
mod violation_report;

pub use violation::{Location, Severity, Violation};
pub use violation_report::ViolationReport;
pub(crate) use violation_report::DEFAULT_HEADER;
