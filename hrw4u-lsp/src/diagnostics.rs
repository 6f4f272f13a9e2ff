//! Collect-all compile to LSP diagnostics
//!
//! The editor wants every problem in the file at once, so the document is
//! compiled in collect-all mode and each collected error becomes one
//! diagnostic. Suggestions are appended to the message.

use crate::document::Document;
use hrw4u_compiler::compile;
use hrw4u_core::{CollectedError, ErrorKind, ErrorMode, Settings};
use lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};

/// Source tag on every diagnostic
pub const SOURCE: &str = "hrw4u";

pub fn compute_diagnostics(doc: &Document, name: &str, settings: &Settings) -> Vec<Diagnostic> {
    let out = compile(name, doc.text(), settings, ErrorMode::CollectAll);
    out.errors.iter().map(|e| to_diagnostic(doc, e)).collect()
}

pub fn to_diagnostic(doc: &Document, error: &CollectedError) -> Diagnostic {
    let mut message = error.message.clone();
    if !error.suggestions.is_empty() {
        message.push_str(&format!("\ndid you mean: {}?", error.suggestions.join(", ")));
    }

    Diagnostic {
        range: doc.range(error.span.clone()),
        severity: Some(severity(error.kind)),
        code: Some(NumberOrString::String(error.kind.to_string())),
        source: Some(SOURCE.to_string()),
        message,
        ..Default::default()
    }
}

/// Problems in the text are errors; problems in the environment are warnings
pub fn severity(kind: ErrorKind) -> DiagnosticSeverity {
    match kind {
        ErrorKind::Usage | ErrorKind::Io | ErrorKind::Config => DiagnosticSeverity::WARNING,
        _ => DiagnosticSeverity::ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::Position;

    #[test]
    fn test_clean_document() {
        let doc = Document::new("REMAP {\n    set-debug;\n}\n", 1);
        assert!(compute_diagnostics(&doc, "a.hrw4u", &Settings::default()).is_empty());
    }

    #[test]
    fn test_every_error_is_reported() {
        let source = "REMAP {\n    inbund.req.X = \"1\";\n    inbound.resp.X = \"2\";\n}\n";
        let doc = Document::new(source, 1);
        let diags = compute_diagnostics(&doc, "a.hrw4u", &Settings::default());

        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].range.start, Position::new(1, 4));
        assert_eq!(diags[1].range.start.line, 2);
        assert_eq!(
            diags[0].code,
            Some(NumberOrString::String("unknown-symbol".to_string()))
        );
        assert_eq!(diags[1].severity, Some(DiagnosticSeverity::ERROR));
        assert!(diags.iter().all(|d| d.source.as_deref() == Some(SOURCE)));
    }

    #[test]
    fn test_suggestions_in_message() {
        let source = "REMAP {\n    if inbound.metod == \"GET\" {\n        break;\n    }\n}\n";
        let doc = Document::new(source, 1);
        let diags = compute_diagnostics(&doc, "a.hrw4u", &Settings::default());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("did you mean: "));
        assert!(diags[0].message.contains("inbound.method"));
    }

    #[test]
    fn test_syntax_error_range() {
        let doc = Document::new("REMAP {\n    = ;\n}\n", 1);
        let diags = compute_diagnostics(&doc, "a.hrw4u", &Settings::default());
        assert_eq!(diags[0].range.start.line, 1);
        assert_eq!(
            diags[0].code,
            Some(NumberOrString::String("syntax".to_string()))
        );
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(severity(ErrorKind::InvalidArity), DiagnosticSeverity::ERROR);
        assert_eq!(severity(ErrorKind::Config), DiagnosticSeverity::WARNING);
    }
}
