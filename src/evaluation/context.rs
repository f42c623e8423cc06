//! Walk context describing the node being evaluated.

use std::fmt;

/// How a node is reached from its parent, used to name it in reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Subject {
    /// The document root.
    Document,
    /// Value of a mapping entry.
    Key(String),
    /// Element of a sequence.
    Item(usize),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Document => write!(f, "document"),
            Subject::Key(key) => write!(f, "key \"{key}\""),
            Subject::Item(index) => write!(f, "item {index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subjects_render_like_report_lines() {
        assert_eq!(Subject::Document.to_string(), "document");
        assert_eq!(Subject::Key("name".to_string()).to_string(), "key \"name\"");
        assert_eq!(Subject::Item(3).to_string(), "item 3");
    }
}
