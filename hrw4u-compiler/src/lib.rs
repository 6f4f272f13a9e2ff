//! hrw4u Compiler
//!
//! Translates between the hrw4u DSL and native header-rewrite rules, in
//! both directions.
//!
//! # Example
//!
//! ```rust,ignore
//! use hrw4u_compiler::compile_str;
//!
//! let native = compile_str(r#"
//!     REMAP {
//!         if inbound.method == "GET" {
//!             inbound.req.X-Seen = "1";
//!         }
//!     }
//! "#).unwrap();
//! ```

pub mod diagnostic;
pub mod native;
pub mod parser;
pub mod source;
pub mod visitor;

pub use diagnostic::{render, SourceFile};
pub use native::{parse_native, NativeDocument, NativeParser, Reversed, Reverser};
pub use parser::{parse, DslParser, Program};
pub use source::{LineIndex, Parsed, SourceParser, SyntaxError};
pub use visitor::{Generated, Visitor};

use hrw4u_core::{CollectedError, ErrorCollector, ErrorMode, Settings, SymbolTables};
use tracing::debug;

/// Which way a translation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// hrw4u to native
    #[default]
    Forward,
    /// native to hrw4u
    Reverse,
}

/// Text produced by a translation and every error found on the way
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    pub output: String,
    pub errors: Vec<CollectedError>,
}

impl CompileOutput {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Pipeline error for the string-in, string-out helpers
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{}", summary(.0))]
    Failed(Vec<CollectedError>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for the string pipelines
pub type Result<T> = std::result::Result<T, CompileError>;

impl CompileError {
    pub fn errors(&self) -> &[CollectedError] {
        match self {
            CompileError::Failed(errors) => errors,
            CompileError::Json(_) => &[],
        }
    }
}

fn summary(errors: &[CollectedError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run a parser and record its syntax errors
///
/// `None` means the collector asked to stop.
fn front<P: SourceParser>(
    parser: P,
    file: &SourceFile<'_>,
    collector: &mut ErrorCollector,
) -> Option<P::Tree> {
    let parsed = parser.parse(file.text());
    for error in &parsed.errors {
        if collector.add_error(file.syntax_error(error)).is_err() {
            return None;
        }
    }
    Some(parsed.tree)
}

/// hrw4u source to native rules
pub fn compile(name: &str, source: &str, settings: &Settings, mode: ErrorMode) -> CompileOutput {
    debug!("📝 compiling {} ({} bytes)", name, source.len());
    let file = SourceFile::new(name, source);
    let mut collector = ErrorCollector::new(mode);

    let Some(program) = front(DslParser, &file, &mut collector) else {
        return CompileOutput {
            output: String::new(),
            errors: collector.into_errors(),
        };
    };

    let generated = Visitor::new(SymbolTables::global(), settings, &file, collector).visit(&program);
    CompileOutput {
        output: generated.text(),
        errors: generated.errors,
    }
}

/// Native rules to hrw4u source
pub fn reverse(name: &str, source: &str, settings: &Settings, mode: ErrorMode) -> CompileOutput {
    debug!("🔁 reversing {} ({} bytes)", name, source.len());
    let file = SourceFile::new(name, source);
    let mut collector = ErrorCollector::new(mode);

    let Some(doc) = front(NativeParser, &file, &mut collector) else {
        return CompileOutput {
            output: String::new(),
            errors: collector.into_errors(),
        };
    };

    let reversed = Reverser::new(SymbolTables::global(), settings, &file, collector).visit(&doc);
    CompileOutput {
        output: reversed.text(),
        errors: reversed.errors,
    }
}

pub fn translate(
    direction: Direction,
    name: &str,
    source: &str,
    settings: &Settings,
    mode: ErrorMode,
) -> CompileOutput {
    match direction {
        Direction::Forward => compile(name, source, settings, mode),
        Direction::Reverse => reverse(name, source, settings, mode),
    }
}

/// Parse tree as pretty JSON, partial when the input has syntax errors
pub fn ast_json(direction: Direction, source: &str) -> Result<String> {
    let json = match direction {
        Direction::Forward => serde_json::to_string_pretty(&DslParser.parse(source).tree)?,
        Direction::Reverse => serde_json::to_string_pretty(&NativeParser.parse(source).tree)?,
    };
    Ok(json)
}

/// Forward compile with default settings, failing on the first error
pub fn compile_str(source: &str) -> Result<String> {
    into_result(compile("<input>", source, &Settings::default(), ErrorMode::FailFast))
}

/// Reverse with default settings, failing on the first error
pub fn reverse_str(source: &str) -> Result<String> {
    into_result(reverse("<input>", source, &Settings::default(), ErrorMode::FailFast))
}

fn into_result(out: CompileOutput) -> Result<String> {
    if out.errors.is_empty() {
        Ok(out.output)
    } else {
        Err(CompileError::Failed(out.errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrw4u_core::ErrorKind;

    #[test]
    fn test_compile_str() {
        let out = compile_str("REMAP { set-debug; }").unwrap();
        assert_eq!(out, "cond %{REMAP_PSEUDO_HOOK} [AND]\n    set-debug\n");
    }

    #[test]
    fn test_fail_fast_stops_at_first_syntax_error() {
        let out = compile("t.hrw4u", "REMAP { = ; = ; }", &Settings::default(), ErrorMode::FailFast);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind, ErrorKind::Syntax);
        assert!(out.output.is_empty());
    }

    #[test]
    fn test_collect_all_reports_syntax_and_semantic_errors() {
        let source = "REMAP {\n  = ;\n  bogus;\n}\n";
        let out = compile("t.hrw4u", source, &Settings::default(), ErrorMode::CollectAll);
        let kinds: Vec<ErrorKind> = out.errors.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::Syntax, ErrorKind::UnknownSymbol]);
        assert_eq!(out.errors[1].line, 3);
    }

    #[test]
    fn test_reverse_str() {
        let out = reverse_str("cond %{REMAP_PSEUDO_HOOK} [AND]\n    set-debug\n").unwrap();
        assert_eq!(out, "REMAP {\n    set-debug;\n}\n");
    }

    #[test]
    fn test_failed_error_lists_every_error() {
        let err = compile_str("REMAP { bogus; }").unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert!(err.to_string().contains("<input>:1:9: error: unknown symbol 'bogus'"));
    }

    #[test]
    fn test_ast_json() {
        let json = ast_json(Direction::Forward, "REMAP { break; }").unwrap();
        assert!(json.contains("\"sections\""));
        assert!(json.contains("\"break\""));

        let json = ast_json(Direction::Reverse, "cond %{TRUE}\n").unwrap();
        assert!(json.contains("\"cond\""));
    }
}
