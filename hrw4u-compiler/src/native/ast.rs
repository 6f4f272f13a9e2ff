//! Line-level tree for native header-rewrite rules
//!
//! The native format is line oriented, so the tree is a flat list of
//! classified lines. Grouping lines into rulesets is the reverse visitor's
//! job.

use crate::parser::ast::Node;
use serde::Serialize;

/// One parsed native file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NativeDocument {
    pub lines: Vec<Node<NativeLine>>,
}

/// A source line and what it holds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeLine {
    /// 1-based
    pub number: usize,
    pub kind: LineKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Blank,
    Comment(String),
    Cond(NativeCond),
    Elif,
    Else,
    Operator(NativeOp),
}

/// `cond %{TAG:payload} operand [MODS]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeCond {
    /// Full `%{..}` reference
    pub tag: String,
    pub operand: Option<String>,
    pub modifiers: Vec<String>,
}

/// `command arg.. [MODS]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeOp {
    pub command: String,
    /// Arguments as written, quotes included
    pub args: Vec<String>,
    pub modifiers: Vec<String>,
}

impl NativeOp {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m.eq_ignore_ascii_case(modifier))
    }
}
