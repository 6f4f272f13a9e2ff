//! Parser for native header-rewrite rules
//!
//! Each line is classified on its own. A malformed line becomes a syntax
//! error and a `Blank` placeholder so later lines keep their numbers.

use super::ast::{LineKind, NativeCond, NativeDocument, NativeLine, NativeOp};
use crate::parser::ast::Node;
use crate::parser::lexer::Location;
use crate::source::{Parsed, SourceParser, SyntaxError};
use tracing::trace;

/// The native front end
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeParser;

impl SourceParser for NativeParser {
    type Tree = NativeDocument;

    fn parse(&self, source: &str) -> Parsed<NativeDocument> {
        let (tree, errors) = parse_native(source);
        Parsed { tree, errors }
    }
}

/// Parse a whole native file
pub fn parse_native(source: &str) -> (NativeDocument, Vec<SyntaxError>) {
    let mut doc = NativeDocument::default();
    let mut errors = Vec::new();
    let mut offset = 0;

    for (idx, raw) in source.split_inclusive('\n').enumerate() {
        let text = raw.trim_end_matches(['\n', '\r']);
        let span = Location::new(offset, offset + text.len());
        let number = idx + 1;

        let kind = match parse_line(text) {
            Ok(kind) => kind,
            Err(message) => {
                errors.push(SyntaxError::new(span.range(), format!("line {}: {}", number, message)));
                LineKind::Blank
            }
        };
        trace!("line {}: {:?}", number, kind);
        doc.lines.push(Node::new(NativeLine { number, kind }, span));
        offset += raw.len();
    }

    (doc, errors)
}

fn parse_line(text: &str) -> Result<LineKind, String> {
    let line = text.trim();
    if line.is_empty() {
        return Ok(LineKind::Blank);
    }
    if let Some(comment) = line.strip_prefix('#') {
        return Ok(LineKind::Comment(comment.trim().to_string()));
    }

    match line {
        "elif" => return Ok(LineKind::Elif),
        "else" => return Ok(LineKind::Else),
        _ => {}
    }

    match line.split_once(char::is_whitespace) {
        Some(("cond", rest)) => parse_cond(rest.trim()).map(LineKind::Cond),
        None if line == "cond" => Err("expected %{..} after cond".to_string()),
        _ => parse_operator(line).map(LineKind::Operator),
    }
}

fn parse_cond(rest: &str) -> Result<NativeCond, String> {
    if !rest.starts_with("%{") {
        return Err(format!("expected %{{..}} after cond, found '{}'", rest));
    }
    let end = rest
        .find('}')
        .ok_or_else(|| "unterminated %{ in condition".to_string())?;
    let tag = rest[..=end].to_string();
    let (operand, modifiers) = split_modifiers(rest[end + 1..].trim());

    Ok(NativeCond {
        tag,
        operand: (!operand.is_empty()).then(|| operand.to_string()),
        modifiers,
    })
}

fn parse_operator(line: &str) -> Result<NativeOp, String> {
    let mut words = split_words(line)?;
    let modifiers = match words.last() {
        Some(last) if words.len() > 1 && is_modifier_list(last) => {
            let list = parse_modifier_list(last);
            words.pop();
            list
        }
        _ => Vec::new(),
    };

    let mut words = words.into_iter();
    let command = words.next().ok_or_else(|| "empty operator".to_string())?;
    Ok(NativeOp {
        command,
        args: words.collect(),
        modifiers,
    })
}

/// Split a trailing `[A,B]` off a condition's operand
fn split_modifiers(rest: &str) -> (&str, Vec<String>) {
    if let Some(idx) = rest.rfind('[') {
        let (head, tail) = rest.split_at(idx);
        let head_ok = head.is_empty() || head.ends_with(char::is_whitespace);
        if head_ok && is_modifier_list(tail) {
            return (head.trim_end(), parse_modifier_list(tail));
        }
    }
    (rest, Vec::new())
}

fn is_modifier_list(word: &str) -> bool {
    word.len() > 2
        && word.starts_with('[')
        && word.ends_with(']')
        && word[1..word.len() - 1]
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == ',' || c == ' ')
}

fn parse_modifier_list(word: &str) -> Vec<String> {
    word[1..word.len() - 1]
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whitespace split that keeps quoted strings, quotes included, whole
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut escaped = false;

    for c in line.chars() {
        if in_quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quote = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_quote = true;
                current.push(c);
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if in_quote {
        return Err("unterminated string".to_string());
    }
    if !current.is_empty() {
        words.push(current);
    }
    Ok(words)
}
