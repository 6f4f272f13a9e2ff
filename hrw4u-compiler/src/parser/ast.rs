//! Abstract Syntax Tree for hrw4u source
//!
//! Every node records where it came from so the visitor can attach a
//! line and column to any error it finds. The tree serializes to JSON for
//! `--ast`.

use crate::parser::lexer::Location;
use serde::Serialize;

/// A node with source location information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node<T> {
    pub inner: T,
    pub span: Location,
}

impl<T> Node<T> {
    pub fn new(inner: T, span: Location) -> Self {
        Self { inner, span }
    }
}

/// Root node: the sections of one file, in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub sections: Vec<Node<Section>>,
}

// ============================================================
// Sections
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Section name as written, e.g. `REMAP` or `VARS`
    pub name: Node<String>,
    pub body: SectionBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionBody {
    Vars(Vec<Node<VarDecl>>),
    Items(Vec<Node<SectionItem>>),
}

/// `name: type [@slot];`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub name: Node<String>,
    pub ty: Node<String>,
    pub slot: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionItem {
    Conditional(Conditional),
    Statement(Statement),
}

/// `if .. { } elif .. { } else { }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conditional {
    /// The `if` branch followed by every `elif`
    pub branches: Vec<Branch>,
    pub otherwise: Option<Node<Block>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub condition: Node<Expr>,
    pub block: Node<Block>,
}

pub type Block = Vec<Node<Statement>>;

// ============================================================
// Statements
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Break,
    /// `name(args) [with ..];`
    Call {
        call: Call,
        modifiers: Vec<Node<String>>,
    },
    /// `target = value;` or `target += value;`
    Assign {
        target: Node<String>,
        op: AssignOp,
        value: Node<Value>,
        modifiers: Vec<Node<String>>,
    },
    /// `name;`
    Bare { name: Node<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignOp {
    Set,
    Append,
}

/// `name(arg, ..)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Call {
    pub name: Node<String>,
    pub args: Vec<Node<Value>>,
}

// ============================================================
// Expressions
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Or(Box<Node<Expr>>, Box<Node<Expr>>),
    And(Box<Node<Expr>>, Box<Node<Expr>>),
    Not(Box<Node<Expr>>),
    /// Parenthesised sub-expression
    Group(Box<Node<Expr>>),
    Compare(Comparison),
    Call(Call),
    Bool(bool),
    Ident(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub lhs: Node<Operand>,
    pub op: CompareOp,
    pub rhs: Node<Rhs>,
    pub modifiers: Vec<Node<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Ident(String),
    Call(Call),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Match,
    NotMatch,
    In,
}

impl CompareOp {
    pub fn negated(self) -> bool {
        matches!(self, CompareOp::Ne | CompareOp::NotMatch)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rhs {
    Value(Value),
    /// `/pattern/`, slashes included
    Regex(String),
    /// `in [a, b]`
    Set(Vec<Node<Value>>),
    /// `in {10.0.0.0/8, ..}`
    IpRange(Vec<Node<String>>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Quotes included
    Str(String),
    Number(String),
    Ident(String),
    Bool(bool),
    Ip(String),
}

impl Value {
    /// The value as written in the source
    pub fn text(&self) -> String {
        match self {
            Value::Str(s) | Value::Number(s) | Value::Ident(s) | Value::Ip(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
        }
    }

    pub fn is_empty_string(&self) -> bool {
        matches!(self, Value::Str(s) if s == "\"\"")
    }
}
