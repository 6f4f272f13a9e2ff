//! Context-aware completion
//!
//! The scope around the cursor decides what is offered: section names at
//! the top level, type names inside VARS, and inside a hook section every
//! symbol valid there plus the declared variables and the keywords. The
//! partially typed identifier filters the list, so `inbound.url.` narrows
//! it to the URL parts.

use crate::document::{Document, Scope};
use hrw4u_core::tables::SymbolEntry;
use hrw4u_core::{SectionType, SymbolTables, VarType};
use lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, Documentation, MarkupContent,
    MarkupKind, Position, Range, TextEdit,
};
use std::collections::HashSet;
use tracing::debug;

static KEYWORDS: &[&str] = &["if", "elif", "else", "break", "in", "with", "true", "false"];

/// Compute completions for `position` in `doc`
pub fn compute_completions(
    tables: &SymbolTables,
    doc: &Document,
    position: Position,
) -> Vec<CompletionItem> {
    let offset = doc.offset_at(position);
    let (start, prefix) = doc.prefix_at(offset);
    let scope = doc.scope_at(offset);
    debug!("completion at {:?} in {:?}, prefix '{}'", position, scope, prefix);

    let mut items = Items::new(prefix, Range::new(doc.position_at(start), position));
    match scope {
        Scope::TopLevel => {
            for section in SectionType::ALL {
                let detail = section.hook().unwrap_or("state variables");
                items.push(section.name(), CompletionItemKind::MODULE, detail.to_string(), "");
            }
        }
        Scope::Vars => {
            for ty in VarType::ALL {
                let detail = format!("%{{{}}}, {} slots", ty.cond_tag(), ty.limit());
                items.push(ty.name(), CompletionItemKind::TYPE_PARAMETER, detail, "");
            }
        }
        Scope::Section(section) => {
            for var in doc.variables().iter() {
                let detail = format!("{} @{}", var.ty, var.slot);
                items.push(&var.name, CompletionItemKind::VARIABLE, detail, "");
            }
            items.symbols(tables.conditions(), section, CompletionItemKind::FIELD, |e, s| {
                format!("%{{{}}}", e.target(s))
            });
            items.symbols(tables.operators(), section, CompletionItemKind::PROPERTY, |e, s| {
                e.target(s)
            });
            items.symbols(tables.functions(), section, CompletionItemKind::FUNCTION, |e, _| {
                format!("%{{{}}}, {} argument(s)", e.tag, e.arity())
            });
            items.symbols(tables.statements(), section, CompletionItemKind::METHOD, |e, _| {
                e.target(None)
            });
            for keyword in KEYWORDS {
                items.push(keyword, CompletionItemKind::KEYWORD, "keyword".to_string(), "");
            }
        }
        Scope::Unknown => {}
    }

    items.finish()
}

/// Accumulates filtered, de-duplicated items
struct Items<'p> {
    prefix: &'p str,
    replace: Range,
    seen: HashSet<String>,
    out: Vec<CompletionItem>,
}

impl<'p> Items<'p> {
    fn new(prefix: &'p str, replace: Range) -> Self {
        Self {
            prefix,
            replace,
            seen: HashSet::new(),
            out: Vec::new(),
        }
    }

    fn push(&mut self, label: &str, kind: CompletionItemKind, detail: String, doc: &str) {
        let matches = label
            .get(..self.prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(self.prefix));
        if !matches || !self.seen.insert(label.to_string()) {
            return;
        }

        self.out.push(CompletionItem {
            label: label.to_string(),
            kind: Some(kind),
            detail: Some(detail),
            documentation: (!doc.is_empty()).then(|| {
                Documentation::MarkupContent(MarkupContent {
                    kind: MarkupKind::Markdown,
                    value: doc.to_string(),
                })
            }),
            text_edit: Some(CompletionTextEdit::Edit(TextEdit::new(
                self.replace,
                label.to_string(),
            ))),
            ..Default::default()
        });
    }

    /// Entries valid in `section`; closed namespaces expand to one item per suffix
    fn symbols(
        &mut self,
        table: &[SymbolEntry],
        section: SectionType,
        kind: CompletionItemKind,
        detail: impl Fn(&SymbolEntry, Option<&str>) -> String,
    ) {
        for entry in table.iter().filter(|e| e.valid_in(section)) {
            match entry.suffixes {
                Some(group) => {
                    for suffix in group.values() {
                        let label = format!("{}{}", entry.key, suffix.to_ascii_lowercase());
                        self.push(&label, kind, detail(entry, Some(suffix)), entry.doc);
                    }
                }
                None => self.push(entry.key, kind, detail(entry, None), entry.doc),
            }
        }
    }

    fn finish(self) -> Vec<CompletionItem> {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(source: &str, line: u32, character: u32) -> Vec<String> {
        let doc = Document::new(source, 1);
        compute_completions(SymbolTables::global(), &doc, Position::new(line, character))
            .into_iter()
            .map(|item| item.label)
            .collect()
    }

    #[test]
    fn test_top_level_offers_sections() {
        let labels = labels("SEND_\n", 0, 5);
        assert_eq!(labels, vec!["SEND_REQUEST", "SEND_RESPONSE"]);
    }

    #[test]
    fn test_vars_offers_types() {
        let labels = labels("VARS {\n    a: in\n}\n", 1, 9);
        assert_eq!(labels, vec!["int8", "int16"]);
    }

    #[test]
    fn test_namespace_suffixes() {
        let labels = labels("REMAP {\n    if inbound.url.p\n}\n", 1, 20);
        assert!(labels.contains(&"inbound.url.path".to_string()));
        assert!(labels.contains(&"inbound.url.port".to_string()));
        assert!(!labels.contains(&"inbound.url.host".to_string()));
    }

    #[test]
    fn test_section_filtering() {
        let remap = labels("REMAP {\n    outbound.\n}\n", 1, 13);
        assert!(remap.iter().any(|l| l == "outbound.url.host"));
        assert!(remap.iter().any(|l| l == "outbound.method"));

        let read = labels("READ_RESPONSE {\n    outbound.\n}\n", 1, 13);
        assert!(read.iter().any(|l| l == "outbound.resp."));
        assert!(!read.iter().any(|l| l == "outbound.method"));
        assert!(!read.iter().any(|l| l.starts_with("outbound.url.")));
    }

    #[test]
    fn test_variables_and_keywords() {
        let source = "VARS {\n    every: bool;\n}\nREMAP {\n    e\n}\n";
        let labels = labels(source, 4, 5);
        assert_eq!(labels.first().map(String::as_str), Some("every"));
        assert!(labels.contains(&"elif".to_string()));
        assert!(labels.contains(&"else".to_string()));
    }

    #[test]
    fn test_text_edit_replaces_prefix() {
        let doc = Document::new("REMAP {\n    set-d\n}\n", 1);
        let items = compute_completions(SymbolTables::global(), &doc, Position::new(1, 9));
        let item = items.iter().find(|i| i.label == "set-debug").unwrap();
        match &item.text_edit {
            Some(CompletionTextEdit::Edit(edit)) => {
                assert_eq!(edit.range, Range::new(Position::new(1, 4), Position::new(1, 9)));
                assert_eq!(edit.new_text, "set-debug");
            }
            other => panic!("unexpected edit {:?}", other),
        }
        assert!(item.documentation.is_some());
    }

    #[test]
    fn test_unknown_block_offers_nothing() {
        assert!(labels("BOGUS {\n    i\n}\n", 1, 5).is_empty());
    }
}
