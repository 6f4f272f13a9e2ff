//! Parser backends and source positions
//!
//! The visitors never see tokens. They consume a tree produced by some
//! [`SourceParser`], which reports syntax errors as plain spans and
//! messages. [`LineIndex`] turns those spans into the 1-based line and
//! column every user-visible diagnostic carries.

use serde::Serialize;
use std::fmt::Debug;
use std::ops::Range;

/// A syntax error reported by a parser backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxError {
    /// Byte range in the source
    pub span: Range<usize>,
    pub message: String,
}

impl SyntaxError {
    pub fn new(span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// Parser output: always a tree, possibly partial, plus any errors
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub tree: T,
    pub errors: Vec<SyntaxError>,
}

impl<T> Parsed<T> {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// One parser backend
pub trait SourceParser {
    type Tree: Serialize + Debug;

    fn parse(&self, source: &str) -> Parsed<Self::Tree>;
}

/// Byte offset to line/column conversion
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self {
            starts,
            len: source.len(),
        }
    }

    /// 1-based line and character column for a byte offset
    pub fn line_col(&self, source: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = self.starts.partition_point(|&s| s <= offset).saturating_sub(1);
        let start = self.starts[line];
        let column = source
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (line + 1, column + 1)
    }

    /// Text of a 1-based line, without the newline
    pub fn line_text<'s>(&self, source: &'s str, line: usize) -> Option<&'s str> {
        let start = *self.starts.get(line.checked_sub(1)?)?;
        let end = self.starts.get(line).map(|e| e - 1).unwrap_or(self.len);
        source.get(start..end).map(|s| s.trim_end_matches('\r'))
    }

    /// Byte offset of the start of a 1-based line
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.starts.get(line.checked_sub(1)?).copied()
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let source = "ab\ncdé\n\nx";
        let index = LineIndex::new(source);
        assert_eq!(index.line_col(source, 0), (1, 1));
        assert_eq!(index.line_col(source, 3), (2, 1));
        assert_eq!(index.line_col(source, 7), (2, 4));
        assert_eq!(index.line_col(source, 9), (4, 1));
        assert_eq!(index.line_col(source, 999), (4, 2));
    }

    #[test]
    fn test_line_text() {
        let source = "first\r\nsecond\n";
        let index = LineIndex::new(source);
        assert_eq!(index.line_text(source, 1), Some("first"));
        assert_eq!(index.line_text(source, 2), Some("second"));
        assert_eq!(index.line_text(source, 3), Some(""));
        assert_eq!(index.line_text(source, 0), None);
        assert_eq!(index.line_start(2), Some(7));
    }
}
