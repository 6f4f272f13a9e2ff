//! Diagnostics
//!
//! Turns spans into [`CollectedError`]s and renders them for terminals
//! with `ariadne`.

use crate::source::{LineIndex, SyntaxError};
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use hrw4u_core::{CollectedError, ErrorKind};
use std::ops::Range;

/// A named source text with its line index
#[derive(Debug, Clone)]
pub struct SourceFile<'a> {
    name: &'a str,
    text: &'a str,
    index: LineIndex,
}

impl<'a> SourceFile<'a> {
    pub fn new(name: &'a str, text: &'a str) -> Self {
        Self {
            name,
            text,
            index: LineIndex::new(text),
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn index(&self) -> &LineIndex {
        &self.index
    }

    pub fn error(
        &self,
        span: Range<usize>,
        message: impl Into<String>,
        kind: ErrorKind,
        suggestions: Vec<String>,
    ) -> CollectedError {
        let (line, column) = self.index.line_col(self.text, span.start);
        CollectedError {
            file: self.name.to_string(),
            line,
            column,
            span,
            message: message.into(),
            kind,
            snippet: self.index.line_text(self.text, line).map(str::to_string),
            suggestions,
        }
    }

    pub fn syntax_error(&self, error: &SyntaxError) -> CollectedError {
        self.error(error.span.clone(), error.message.clone(), ErrorKind::Syntax, Vec::new())
    }

    /// Byte range of a whole 1-based line, without the newline
    pub fn line_span(&self, line: usize) -> Range<usize> {
        let start = self.index.line_start(line).unwrap_or(self.text.len());
        let len = self
            .index
            .line_text(self.text, line)
            .map(str::len)
            .unwrap_or(0);
        start..start + len
    }
}

/// Render errors as labelled source snippets
pub fn render(source: &SourceFile<'_>, errors: &[CollectedError], color: bool) -> String {
    let mut out = Vec::new();
    let config = Config::default()
        .with_color(color)
        .with_index_type(IndexType::Byte);

    for error in errors {
        let span = (source.name(), clamp(&error.span, source.text().len()));
        let mut label = Label::new(span.clone()).with_message(error.kind.to_string());
        if color {
            label = label.with_color(Color::Red);
        }
        let mut report = Report::build(ReportKind::Error, span)
            .with_config(config)
            .with_message(&error.message)
            .with_label(label);
        if !error.suggestions.is_empty() {
            report = report.with_note(format!("did you mean: {}?", error.suggestions.join(", ")));
        }

        if report
            .finish()
            .write((source.name(), Source::from(source.text())), &mut out)
            .is_err()
        {
            out.extend_from_slice(error.to_string().as_bytes());
            out.push(b'\n');
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn clamp(span: &Range<usize>, len: usize) -> Range<usize> {
    let start = span.start.min(len);
    start..span.end.clamp(start, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_position_and_snippet() {
        let file = SourceFile::new("t.hrw4u", "REMAP {\n  bogus;\n}\n");
        let err = file.error(10..15, "unknown symbol 'bogus'", ErrorKind::UnknownSymbol, vec![]);
        assert_eq!((err.line, err.column), (2, 3));
        assert_eq!(err.snippet.as_deref(), Some("  bogus;"));
        assert_eq!(file.line_span(2), 8..16);
    }

    #[test]
    fn test_render_mentions_message_and_note() {
        let file = SourceFile::new("t.hrw4u", "REMAP {\n  bogus;\n}\n");
        let err = file.error(
            10..15,
            "unknown symbol 'bogus'",
            ErrorKind::UnknownSymbol,
            vec!["no-op".to_string()],
        );
        let text = render(&file, &[err], false);
        assert!(text.contains("unknown symbol 'bogus'"));
        assert!(text.contains("did you mean: no-op?"));
        assert!(text.contains("t.hrw4u"));
    }
}
