//! hrw4u Core Library
//!
//! This crate holds everything the forward and reverse compilers share:
//! the section model, the symbol tables and their derived maps, the
//! per-statement modifier state, the suggestion engine, the error
//! collector, the state variables and the user settings.

pub mod collector;
pub mod config;
pub mod error;
pub mod section;
pub mod states;
pub mod suggest;
pub mod tables;
pub mod tag;
pub mod vars;

pub use collector::{CollectedError, ErrorCollector, ErrorMode, Halt};
pub use error::{Error, ErrorKind, Result};
pub use section::{SectionContext, SectionSet, SectionType};
pub use states::{CondState, Modifier, ModifierClass, OperatorState, SubstringMode};
pub use suggest::{ContextType, SuggestionCandidate, SuggestionEngine};
pub use tables::SymbolTables;
pub use tag::{Namespace, TagRef};
pub use vars::{VarType, Variable, VariableTable};
pub use config::{Settings, SettingsLoader};

/// hrw4u version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
