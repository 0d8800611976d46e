//! The diagnostic sink.
//!
//! An append-only log of `(location, message, is_warning)` records. Errors
//! are always reported through [`DiagnosticSink::report_error`], which
//! returns `None` -- the sentinel resolver code propagates up the call
//! chain via `?`/`varOrReturn`-style early exits. Warnings never block
//! compilation and are reported through [`DiagnosticSink::report_warning`].
//! Presentation (terminal formatting, source snippets) is out of scope here;
//! this type only collects.

use serde::{Deserialize, Serialize};

use crate::error::SemaError;
use crate::loc::SourceLocation;

/// One reported diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub location: SourceLocation,
    pub message: String,
    pub is_warning: bool,
}

/// Append-only collector of diagnostics produced during a Sema run.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        DiagnosticSink::default()
    }

    /// Records an error and returns `None`, so call sites can write
    /// `return sink.report_error(err);` as the resolver's failure path.
    pub fn report_error<T>(&mut self, error: SemaError) -> Option<T> {
        self.diagnostics.push(Diagnostic {
            location: error.location().clone(),
            message: error.to_string(),
            is_warning: false,
        });
        None
    }

    /// Records a non-fatal warning. Never affects the caller's control flow.
    pub fn report_warning(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            location,
            message: message.into(),
            is_warning: true,
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// `true` if any non-warning diagnostic has been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| !d.is_warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_error_returns_none_and_records() {
        let mut sink = DiagnosticSink::new();
        let result: Option<i32> = sink.report_error(SemaError::UnresolvedSymbol {
            location: SourceLocation::new("t.yl", 1, 1),
            identifier: "foo".into(),
        });
        assert!(result.is_none());
        assert_eq!(sink.diagnostics().len(), 1);
        assert!(!sink.diagnostics()[0].is_warning);
        assert!(sink.has_errors());
    }

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut sink = DiagnosticSink::new();
        sink.report_warning(SourceLocation::new("t.yl", 2, 1), "unreachable statement");
        assert!(!sink.has_errors());
        assert_eq!(sink.diagnostics().len(), 1);
        assert!(sink.diagnostics()[0].is_warning);
    }
}
