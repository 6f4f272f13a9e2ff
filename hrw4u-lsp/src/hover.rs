//! Hover documentation
//!
//! Hovering an identifier shows every table role it plays in the enclosing
//! section (an `inbound.req.` header is both a condition and an assignment
//! target), with the native form it compiles to and its documentation.

use crate::document::{Document, Scope};
use hrw4u_core::tables::SymbolEntry;
use hrw4u_core::{SectionType, SymbolTables};
use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

/// Compute hover information for the word at `position`
pub fn compute_hover(tables: &SymbolTables, doc: &Document, position: Position) -> Option<Hover> {
    let offset = doc.offset_at(position);
    let (span, word) = doc.word_at(offset)?;
    let markdown = describe(tables, doc, word, doc.scope_at(offset))?;

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: markdown,
        }),
        range: Some(doc.range(span)),
    })
}

fn describe(tables: &SymbolTables, doc: &Document, word: &str, scope: Scope) -> Option<String> {
    if let Ok(section) = SectionType::from_name(word) {
        return Some(match section.hook() {
            Some(hook) => format!("**{}** section\n\nRuns on `{}`.", section, hook),
            None => "**VARS** section\n\nDeclares typed state variables.".to_string(),
        });
    }

    let section = match scope {
        Scope::Section(section) => Some(section),
        _ => None,
    };

    if section.is_some() {
        if let Some(var) = doc.variables().get(word) {
            return Some(format!(
                "**{}**: `{}` variable\n\n`{}`",
                var.name,
                var.ty,
                var.as_cond()
            ));
        }
    }

    let roles = [
        (Role::Condition, tables.conditions()),
        (Role::Operator, tables.operators()),
        (Role::Function, tables.functions()),
        (Role::Statement, tables.statements()),
    ];
    let parts: Vec<String> = roles
        .into_iter()
        .filter_map(|(role, table)| {
            find(table, word, section).map(|entry| role.describe(word, entry))
        })
        .collect();

    if parts.is_empty() {
        return keyword(word).map(str::to_string);
    }
    Some(parts.join("\n\n---\n\n"))
}

#[derive(Debug, Clone, Copy)]
enum Role {
    Condition,
    Operator,
    Function,
    Statement,
}

impl Role {
    fn name(self) -> &'static str {
        match self {
            Role::Condition => "condition",
            Role::Operator => "operator",
            Role::Function => "function",
            Role::Statement => "statement",
        }
    }

    fn describe(self, word: &str, entry: &SymbolEntry) -> String {
        let suffix = word
            .strip_prefix(entry.key)
            .filter(|s| entry.is_namespace() && !s.is_empty());

        let native = match self {
            Role::Condition => format!("%{{{}}}", entry.target(suffix)),
            Role::Function => format!("%{{{}}} ({} argument(s))", entry.tag, entry.arity()),
            Role::Operator | Role::Statement => {
                let mut out = entry.tag.to_string();
                for part in entry.payload.into_iter().chain(suffix) {
                    out.push(' ');
                    if entry.upper {
                        out.push_str(&part.to_ascii_uppercase());
                    } else {
                        out.push_str(part);
                    }
                }
                out
            }
        };

        let mut text = format!("**{}** ({})\n\n`{}`", word, self.name(), native);
        if !entry.doc.is_empty() {
            text.push_str("\n\n");
            text.push_str(entry.doc);
        }
        if let Some(sections) = entry.sections {
            let names: Vec<&str> = sections.iter().map(SectionType::name).collect();
            text.push_str(&format!("\n\nValid in: {}", names.join(", ")));
        }
        text
    }
}

/// Exact key, then longest namespace, preferring entries valid in `section`
fn find<'t>(
    table: &'t [SymbolEntry],
    ident: &str,
    section: Option<SectionType>,
) -> Option<&'t SymbolEntry> {
    let valid = |e: &&SymbolEntry| section.is_none_or(|s| e.valid_in(s));
    table
        .iter()
        .filter(valid)
        .find(|e| e.key == ident)
        .or_else(|| {
            table
                .iter()
                .filter(valid)
                .filter(|e| e.is_namespace() && ident.starts_with(e.key))
                .max_by_key(|e| e.key.len())
        })
}

fn keyword(word: &str) -> Option<&'static str> {
    let text = match word {
        "if" => "**if**: run the block when the condition holds",
        "elif" => "**elif**: alternative condition, tried when the previous ones failed",
        "else" => "**else**: runs when no previous condition held",
        "break" => "**break**: stop evaluating this ruleset (`no-op [L]`)",
        "with" => "**with**: attach modifiers, e.g. `with NOCASE,PRE`",
        "in" => "**in**: membership in a `[..]` set or a `{..}` IP range list",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hover_text(source: &str, line: u32, character: u32) -> Option<String> {
        let doc = Document::new(source, 1);
        compute_hover(SymbolTables::global(), &doc, Position::new(line, character)).map(|h| {
            match h.contents {
                HoverContents::Markup(markup) => markup.value,
                other => panic!("unexpected contents {:?}", other),
            }
        })
    }

    #[test]
    fn test_condition_hover() {
        let text = hover_text("REMAP {\n    if inbound.method == \"GET\" {}\n}\n", 1, 10).unwrap();
        assert!(text.starts_with("**inbound.method** (condition)"));
        assert!(text.contains("`%{METHOD}`"));
        assert!(text.contains("HTTP method of the client request."));
    }

    #[test]
    fn test_header_has_both_roles() {
        let text = hover_text("REMAP {\n    inbound.req.X-Foo = \"1\";\n}\n", 1, 8).unwrap();
        assert!(text.contains("`%{CLIENT-HEADER:X-Foo}`"));
        assert!(text.contains("`set-header X-Foo`"));
        assert!(text.contains("---"));
    }

    #[test]
    fn test_suffix_is_upper_cased() {
        let text = hover_text("REMAP {\n    if inbound.url.path {}\n}\n", 1, 10).unwrap();
        assert!(text.contains("`%{CLIENT-URL:PATH}`"));
    }

    #[test]
    fn test_section_and_keyword_hover() {
        let text = hover_text("SEND_RESPONSE {\n    break;\n}\n", 0, 3).unwrap();
        assert!(text.contains("SEND_RESPONSE_HDR_HOOK"));

        let text = hover_text("SEND_RESPONSE {\n    break;\n}\n", 1, 6).unwrap();
        assert!(text.contains("no-op [L]"));
    }

    #[test]
    fn test_variable_hover() {
        let source = "VARS {\n    seen: bool @3;\n}\nREMAP {\n    if seen {}\n}\n";
        let text = hover_text(source, 4, 8).unwrap();
        assert!(text.contains("`%{STATE-FLAG:3}`"));
    }

    #[test]
    fn test_unknown_word() {
        assert!(hover_text("REMAP {\n    bogus;\n}\n", 1, 6).is_none());
        assert!(hover_text("REMAP {\n\n}\n", 1, 0).is_none());
    }
}
