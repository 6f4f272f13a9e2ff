//! Error collection
//!
//! The CLI stops at the first error; the language server wants every
//! error in the file. Both go through [`ErrorCollector`], which keeps
//! diagnostics in the order they were discovered.

use crate::error::ErrorKind;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// One user-visible diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectedError {
    pub file: String,
    /// 1-based
    pub line: usize,
    /// 1-based, in characters
    pub column: usize,
    /// Byte range in the source
    pub span: Range<usize>,
    pub message: String,
    pub kind: ErrorKind,
    /// The offending source line
    pub snippet: Option<String>,
    pub suggestions: Vec<String>,
}

impl fmt::Display for CollectedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}: error: {}", self.file, self.line, self.column, self.message)?;
        if !self.suggestions.is_empty() {
            write!(f, " (did you mean: {}?)", self.suggestions.join(", "))?;
        }
        Ok(())
    }
}

/// Fail-fast or collect-all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    #[default]
    FailFast,
    CollectAll,
}

/// Returned by [`ErrorCollector::add_error`] when the pass must stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Halt;

#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    mode: ErrorMode,
    errors: Vec<CollectedError>,
}

impl ErrorCollector {
    pub fn new(mode: ErrorMode) -> Self {
        Self {
            mode,
            errors: Vec::new(),
        }
    }

    pub fn mode(&self) -> ErrorMode {
        self.mode
    }

    /// Record an error; `Err(Halt)` tells a fail-fast caller to stop
    pub fn add_error(&mut self, error: CollectedError) -> Result<(), Halt> {
        tracing::debug!("❌ {}", error);
        self.errors.push(error);
        match self.mode {
            ErrorMode::FailFast => Err(Halt),
            ErrorMode::CollectAll => Ok(()),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[CollectedError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<CollectedError> {
        self.errors
    }

    /// Plain-text report, one line per error, discovery order
    pub fn get_error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        let mut out = format!("Found {} error(s):\n", self.errors.len());
        for error in &self.errors {
            out.push_str(&error.to_string());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(line: usize, message: &str) -> CollectedError {
        CollectedError {
            file: "test.hrw4u".to_string(),
            line,
            column: 1,
            span: 0..1,
            message: message.to_string(),
            kind: ErrorKind::UnknownSymbol,
            snippet: None,
            suggestions: Vec::new(),
        }
    }

    #[test]
    fn test_fail_fast_halts() {
        let mut collector = ErrorCollector::new(ErrorMode::FailFast);
        assert_eq!(collector.add_error(error(1, "first")), Err(Halt));
        assert!(collector.has_errors());
    }

    #[test]
    fn test_collect_all_keeps_order() {
        let mut collector = ErrorCollector::new(ErrorMode::CollectAll);
        collector.add_error(error(9, "late")).unwrap();
        collector.add_error(error(2, "early")).unwrap();
        let lines: Vec<usize> = collector.errors().iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![9, 2]);
    }

    #[test]
    fn test_summary() {
        let mut collector = ErrorCollector::new(ErrorMode::CollectAll);
        assert_eq!(collector.get_error_summary(), "");
        let mut e = error(3, "unknown symbol 'foo'");
        e.suggestions = vec!["now".to_string()];
        collector.add_error(e).unwrap();
        assert_eq!(
            collector.get_error_summary(),
            "Found 1 error(s):\ntest.hrw4u:3:1: error: unknown symbol 'foo' (did you mean: now?)\n"
        );
    }
}
