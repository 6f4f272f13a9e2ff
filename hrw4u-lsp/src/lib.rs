//! hrw4u Language Service
//!
//! Editor-facing operations over hrw4u documents: completion filtered by
//! the section around the cursor, hover documentation from the symbol
//! tables, and diagnostics from a collect-all compile. Everything is
//! expressed as `lsp-types` values; [`LanguageService`] dispatches on LSP
//! method names so any JSON-RPC transport can host it.

pub mod completion;
pub mod diagnostics;
pub mod document;
pub mod hover;
pub mod service;

pub use completion::compute_completions;
pub use diagnostics::{compute_diagnostics, severity};
pub use document::{Document, DocumentStore, Scope};
pub use hover::compute_hover;
pub use service::{LanguageService, LspError, Result};
