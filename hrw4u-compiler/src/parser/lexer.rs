//! Lexer for hrw4u source
//!
//! Whitespace and `#` comments are skipped. Identifiers may contain `.`,
//! `-` and `_`, so `inbound.req.X-Foo` is a single token. String literals
//! keep their quotes because the native output reproduces them verbatim.

use logos::{Logos, Span};
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Source location for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl Location {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest location covering both
    pub fn join(self, other: Location) -> Location {
        Location {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Span> for Location {
    fn from(span: Span) -> Self {
        Self {
            start: span.start,
            end: span.end,
        }
    }
}

/// A token with its location in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Location,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: impl Into<Location>) -> Self {
        Self {
            value,
            span: span.into(),
        }
    }
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    // ============================================================
    // Keywords
    // ============================================================
    #[token("if")]
    If,

    #[token("elif")]
    Elif,

    #[token("else")]
    Else,

    #[token("in")]
    In,

    #[token("with")]
    With,

    #[token("break")]
    Break,

    #[token("true")]
    True,

    #[token("false")]
    False,

    // ============================================================
    // Structural
    // ============================================================
    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token("@")]
    At,

    // ============================================================
    // Operators
    // ============================================================
    #[token("==")]
    Eq,

    #[token("!=")]
    Ne,

    #[token("~")]
    Match,

    #[token("!~")]
    NotMatch,

    #[token(">")]
    Gt,

    #[token("<")]
    Lt,

    #[token("=")]
    Assign,

    #[token("+=")]
    PlusAssign,

    #[token("&&")]
    And,

    #[token("||")]
    Or,

    #[token("!")]
    Not,

    // ============================================================
    // Values
    // ============================================================
    /// Quoted string, quotes included
    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice().to_string())]
    Str(String),

    /// `/pattern/`, slashes included
    #[regex(r"/([^/\\\n]|\\.)+/", |lex| lex.slice().to_string())]
    Regex(String),

    /// IPv4 or IPv6 address, optionally with a prefix length. IPv6 must
    /// start with a digit or `::` so `name:bool` still lexes as a
    /// declaration.
    #[regex(r"[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+(/[0-9]+)?", |lex| lex.slice().to_string())]
    #[regex(r"([0-9][0-9a-fA-F]*:|::)[0-9a-fA-F:.]*(/[0-9]+)?", |lex| lex.slice().to_string())]
    Ip(String),

    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_.\-]*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::If => write!(f, "if"),
            Token::Elif => write!(f, "elif"),
            Token::Else => write!(f, "else"),
            Token::In => write!(f, "in"),
            Token::With => write!(f, "with"),
            Token::Break => write!(f, "break"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::BraceOpen => write!(f, "{{"),
            Token::BraceClose => write!(f, "}}"),
            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
            Token::BracketOpen => write!(f, "["),
            Token::BracketClose => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Colon => write!(f, ":"),
            Token::At => write!(f, "@"),
            Token::Eq => write!(f, "=="),
            Token::Ne => write!(f, "!="),
            Token::Match => write!(f, "~"),
            Token::NotMatch => write!(f, "!~"),
            Token::Gt => write!(f, ">"),
            Token::Lt => write!(f, "<"),
            Token::Assign => write!(f, "="),
            Token::PlusAssign => write!(f, "+="),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Not => write!(f, "!"),
            Token::Str(s) | Token::Regex(s) | Token::Ip(s) | Token::Number(s) | Token::Ident(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

/// Lexer result type
pub type LexResult = Result<Vec<Spanned<Token>>, LexError>;

/// Lexer error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character '{found}'")]
    UnexpectedChar { position: usize, found: String },
}

impl LexError {
    pub fn span(&self) -> Location {
        match self {
            LexError::UnexpectedChar { position, found } => {
                Location::new(*position, position + found.len())
            }
        }
    }
}

/// Tokenize, stopping at the first bad character
pub fn tokenize(source: &str) -> LexResult {
    let (tokens, errors) = tokenize_lossy(source);
    match errors.into_iter().next() {
        Some(error) => Err(error),
        None => Ok(tokens),
    }
}

/// Tokenize everything, collecting bad characters instead of stopping
pub fn tokenize_lossy(source: &str) -> (Vec<Spanned<Token>>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push(Spanned::new(token, span)),
            Err(()) => errors.push(LexError::UnexpectedChar {
                position: span.start,
                found: source[span.clone()].to_string(),
            }),
        }
    }

    (tokens, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|t| t.value).collect()
    }

    #[test]
    fn test_dotted_identifiers() {
        assert_eq!(
            values("inbound.req.X-Foo = \"bar\";"),
            vec![
                Token::Ident("inbound.req.X-Foo".to_string()),
                Token::Assign,
                Token::Str("\"bar\"".to_string()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_keywords_and_operators() {
        assert_eq!(
            values("if a != b && !c || d !~ /x/ {} elif iffy {}"),
            vec![
                Token::If,
                Token::Ident("a".to_string()),
                Token::Ne,
                Token::Ident("b".to_string()),
                Token::And,
                Token::Not,
                Token::Ident("c".to_string()),
                Token::Or,
                Token::Ident("d".to_string()),
                Token::NotMatch,
                Token::Regex("/x/".to_string()),
                Token::BraceOpen,
                Token::BraceClose,
                Token::Elif,
                Token::Ident("iffy".to_string()),
                Token::BraceOpen,
                Token::BraceClose,
            ]
        );
    }

    #[test]
    fn test_addresses_and_numbers() {
        assert_eq!(
            values("{10.0.0.0/8, 192.168.1.1} 404"),
            vec![
                Token::BraceOpen,
                Token::Ip("10.0.0.0/8".to_string()),
                Token::Comma,
                Token::Ip("192.168.1.1".to_string()),
                Token::BraceClose,
                Token::Number("404".to_string()),
            ]
        );
        assert_eq!(values("::1"), vec![Token::Ip("::1".to_string())]);
        assert_eq!(
            values("2001:db8::/32"),
            vec![Token::Ip("2001:db8::/32".to_string())]
        );
    }

    #[test]
    fn test_var_declaration() {
        assert_eq!(
            values("flag:bool @3;"),
            vec![
                Token::Ident("flag".to_string()),
                Token::Colon,
                Token::Ident("bool".to_string()),
                Token::At,
                Token::Number("3".to_string()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = values("# leading\nbreak; # trailing");
        assert_eq!(tokens, vec![Token::Break, Token::Semicolon]);
    }

    #[test]
    fn test_bad_character() {
        let err = tokenize("a = $;").unwrap_err();
        assert_eq!(err.span(), Location::new(4, 5));
        let (tokens, errors) = tokenize_lossy("a = $;");
        assert_eq!(tokens.len(), 3);
        assert_eq!(errors.len(), 1);
    }
}
