//! Open documents and position arithmetic
//!
//! LSP positions are 0-based lines with UTF-16 columns. The compiler works
//! on byte offsets, so every request converts on the way in and every
//! diagnostic converts on the way out.

use hrw4u_compiler::parser::{tokenize_lossy, SectionBody, Token};
use hrw4u_compiler::{parse, LineIndex};
use hrw4u_core::{SectionType, VariableTable};
use lsp_types::{Position, Range};
use std::collections::HashMap;

/// What encloses a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Between sections
    TopLevel,
    Vars,
    Section(SectionType),
    /// Inside a block whose name is not a section
    Unknown,
}

/// The text of one open file
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    index: LineIndex,
    version: i32,
}

impl Document {
    pub fn new(text: impl Into<String>, version: i32) -> Self {
        let text = text.into();
        let index = LineIndex::new(&text);
        Self {
            text,
            index,
            version,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    // ========================================
    // Positions
    // ========================================

    /// Byte offset of an LSP position, clamped to the line and the text
    pub fn offset_at(&self, position: Position) -> usize {
        let line = position.line as usize + 1;
        let Some(start) = self.index.line_start(line) else {
            return self.text.len();
        };
        let text = self.index.line_text(&self.text, line).unwrap_or("");

        let mut units = 0u32;
        for (i, ch) in text.char_indices() {
            if units >= position.character {
                return start + i;
            }
            units += ch.len_utf16() as u32;
        }
        start + text.len()
    }

    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let (line, _) = self.index.line_col(&self.text, offset);
        let start = self.index.line_start(line).unwrap_or(0);
        let character = self
            .text
            .get(start..offset)
            .map(|s| s.encode_utf16().count())
            .unwrap_or(0);
        Position::new((line - 1) as u32, character as u32)
    }

    pub fn range(&self, span: std::ops::Range<usize>) -> Range {
        Range::new(self.position_at(span.start), self.position_at(span.end))
    }

    // ========================================
    // Words
    // ========================================

    /// Start offset and text of the identifier that ends at `offset`
    pub fn prefix_at(&self, offset: usize) -> (usize, &str) {
        let before = self.text.get(..offset).unwrap_or("");
        let start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_word_char(*c))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(before.len());
        (start, &before[start..])
    }

    /// The whole identifier under `offset`, if any
    pub fn word_at(&self, offset: usize) -> Option<(std::ops::Range<usize>, &str)> {
        let (start, _) = self.prefix_at(offset);
        let after = self.text.get(offset..)?;
        let end = after
            .char_indices()
            .find(|(_, c)| !is_word_char(*c))
            .map(|(i, _)| offset + i)
            .unwrap_or(self.text.len());
        (start < end).then(|| (start..end, &self.text[start..end]))
    }

    // ========================================
    // Structure
    // ========================================

    /// The block enclosing `offset`, found by brace depth
    pub fn scope_at(&self, offset: usize) -> Scope {
        let (tokens, _) = tokenize_lossy(&self.text);
        let mut depth = 0usize;
        let mut name: Option<&str> = None;
        let mut current: Option<&str> = None;

        for token in tokens.iter().take_while(|t| t.span.end <= offset) {
            match &token.value {
                Token::BraceOpen => {
                    if depth == 0 {
                        current = name.take();
                    }
                    depth += 1;
                }
                Token::BraceClose => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        current = None;
                    }
                }
                Token::Ident(ident) if depth == 0 => name = Some(ident.as_str()),
                _ if depth == 0 => name = None,
                _ => {}
            }
        }

        if depth == 0 {
            return Scope::TopLevel;
        }
        match current.map(SectionType::from_name) {
            Some(Ok(SectionType::Vars)) => Scope::Vars,
            Some(Ok(section)) => Scope::Section(section),
            _ => Scope::Unknown,
        }
    }

    /// Variables declared in the VARS block; bad declarations are skipped
    pub fn variables(&self) -> VariableTable {
        let (program, _) = parse(&self.text);
        let mut vars = VariableTable::new();
        for section in &program.sections {
            if let SectionBody::Vars(decls) = &section.inner.body {
                for decl in decls {
                    let decl = &decl.inner;
                    vars.declare(&decl.name.inner, &decl.ty.inner, decl.slot).ok();
                }
            }
        }
        vars
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

/// Tracks the documents currently open in the editor
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, uri: &str, text: String, version: i32) {
        self.documents.insert(uri.to_owned(), Document::new(text, version));
    }

    /// Replace the full text of an open document
    pub fn change(&mut self, uri: &str, text: String, version: i32) -> bool {
        match self.documents.get_mut(uri) {
            Some(doc) => {
                *doc = Document::new(text, version);
                true
            }
            None => false,
        }
    }

    pub fn close(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    pub fn get(&self, uri: &str) -> Option<&Document> {
        self.documents.get(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
