//! Error types for hrw4u

use crate::section::SectionType;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for hrw4u operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hrw4u
#[derive(Error, Debug)]
pub enum Error {
    /// Parser-reported error
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Identifier not present in any table that applies here
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),

    /// Modifier outside both the condition and operator sets
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),

    /// A second substring mode on the same condition
    #[error("conflicting modifiers: '{new}' cannot be combined with '{existing}'")]
    ConflictingModifier { existing: String, new: String },

    /// Known modifier used where its class does not apply
    #[error("modifier '{modifier}' is not allowed on {target}")]
    ModifierNotAllowed { modifier: String, target: String },

    /// Ambiguous tag table points at a symbol that does not exist
    #[error("internal error: ambiguous tag '{tag}' has no target in {section}")]
    AmbiguousResolution { tag: String, section: SectionType },

    #[error("symbol '{symbol}' is not valid in section {section}")]
    SectionRestriction { symbol: String, section: SectionType },

    #[error("unknown hook '{0}'")]
    UnknownHook(String),

    #[error("invalid section name '{0}'")]
    UnknownSection(String),

    #[error("invalid suffix '{suffix}' for {namespace}")]
    InvalidSuffix { namespace: String, suffix: String },

    #[error("'{symbol}' expects {expected} argument(s), got {got}")]
    InvalidArity {
        symbol: String,
        expected: String,
        got: usize,
    },

    /// Variable declaration or slot error
    #[error("variable error: {0}")]
    Variable(String),

    /// Any other statement-shape error
    #[error("{0}")]
    Semantic(String),

    #[error("usage error: {0}")]
    Usage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Discriminant of [`Error`], carried by collected diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Syntax,
    UnknownSymbol,
    UnknownModifier,
    ConflictingModifier,
    ModifierNotAllowed,
    AmbiguousResolution,
    SectionRestriction,
    UnknownHook,
    UnknownSection,
    InvalidSuffix,
    InvalidArity,
    Variable,
    Semantic,
    Usage,
    Io,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax(_) => ErrorKind::Syntax,
            Error::UnknownSymbol(_) => ErrorKind::UnknownSymbol,
            Error::UnknownModifier(_) => ErrorKind::UnknownModifier,
            Error::ConflictingModifier { .. } => ErrorKind::ConflictingModifier,
            Error::ModifierNotAllowed { .. } => ErrorKind::ModifierNotAllowed,
            Error::AmbiguousResolution { .. } => ErrorKind::AmbiguousResolution,
            Error::SectionRestriction { .. } => ErrorKind::SectionRestriction,
            Error::UnknownHook(_) => ErrorKind::UnknownHook,
            Error::UnknownSection(_) => ErrorKind::UnknownSection,
            Error::InvalidSuffix { .. } => ErrorKind::InvalidSuffix,
            Error::InvalidArity { .. } => ErrorKind::InvalidArity,
            Error::Variable(_) => ErrorKind::Variable,
            Error::Semantic(_) => ErrorKind::Semantic,
            Error::Usage(_) => ErrorKind::Usage,
            Error::Io(_) => ErrorKind::Io,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// The token a "did you mean" lookup should start from, if any
    pub fn offending_symbol(&self) -> Option<&str> {
        match self {
            Error::UnknownSymbol(s) | Error::UnknownModifier(s) => Some(s),
            Error::SectionRestriction { symbol, .. } => Some(symbol),
            Error::InvalidSuffix { suffix, .. } => Some(suffix),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::UnknownSymbol => "unknown-symbol",
            ErrorKind::UnknownModifier => "unknown-modifier",
            ErrorKind::ConflictingModifier => "conflicting-modifier",
            ErrorKind::ModifierNotAllowed => "modifier-not-allowed",
            ErrorKind::AmbiguousResolution => "ambiguous-resolution",
            ErrorKind::SectionRestriction => "section-restriction",
            ErrorKind::UnknownHook => "unknown-hook",
            ErrorKind::UnknownSection => "unknown-section",
            ErrorKind::InvalidSuffix => "invalid-suffix",
            ErrorKind::InvalidArity => "invalid-arity",
            ErrorKind::Variable => "variable",
            ErrorKind::Semantic => "semantic",
            ErrorKind::Usage => "usage",
            ErrorKind::Io => "io",
            ErrorKind::Config => "config",
        };
        f.write_str(name)
    }
}
