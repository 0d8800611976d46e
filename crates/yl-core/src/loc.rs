//! Source locations attached to every parsed and resolved node.
//!
//! Purely informational -- nothing in Sema branches on a `SourceLocation`'s
//! contents, it only gets carried along for diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A `(file, line, column)` triple identifying where a node came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        SourceLocation {
            file: file.into(),
            line,
            column,
        }
    }

    /// The location synthesized for compiler-internal declarations like
    /// `println`, mirroring the reference implementation's `<builtin>` file.
    pub fn builtin() -> Self {
        SourceLocation::new("<builtin>", 0, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let loc = SourceLocation::new("main.yl", 3, 7);
        assert_eq!(format!("{loc}"), "main.yl:3:7");
    }

    #[test]
    fn builtin_location_is_stable() {
        assert_eq!(SourceLocation::builtin(), SourceLocation::new("<builtin>", 0, 0));
    }
}
