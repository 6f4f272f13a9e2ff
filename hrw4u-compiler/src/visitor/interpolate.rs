//! String interpolation
//!
//! `"{inbound.req.Host}"` and `"{random(10)}"` inside a string literal
//! resolve like conditions and render as `%{..}`. Existing `%{..}`
//! references pass through untouched.

use hrw4u_core::Result;
use regex::Regex;
use std::sync::LazyLock;

static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)\((.*)\)$").expect("interpolation call pattern is valid")
});

/// One `{..}` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'s> {
    Symbol(&'s str),
    Call(&'s str, Vec<&'s str>),
}

impl<'s> Piece<'s> {
    fn parse(inner: &'s str) -> Piece<'s> {
        match CALL.captures(inner) {
            Some(caps) => {
                let name = caps.get(1).map_or("", |m| m.as_str());
                let args = caps
                    .get(2)
                    .map(|m| m.as_str())
                    .unwrap_or("")
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .collect();
                Piece::Call(name, args)
            }
            None => Piece::Symbol(inner),
        }
    }
}

/// Replace every `{..}` in `text` with what `resolve` returns for it
pub fn interpolate<F>(text: &str, mut resolve: F) -> Result<String>
where
    F: FnMut(Piece<'_>) -> Result<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find('{') {
        let (head, tail) = rest.split_at(idx);
        out.push_str(head);

        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            return Ok(out);
        };

        let inner = tail[1..end].trim();
        if head.ends_with('%') || inner.is_empty() {
            out.push_str(&tail[..=end]);
        } else {
            out.push_str(&resolve(Piece::parse(inner))?);
        }
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// True if the text holds a `%{..}` reference
pub fn has_native_refs(text: &str) -> bool {
    text.contains("%{")
}
