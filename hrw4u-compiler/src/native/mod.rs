//! Native header-rewrite rules
//!
//! Parsing of the line-oriented native format and the reverse visitor that
//! turns it back into hrw4u.

pub mod ast;
pub mod parser;
pub mod reverse;

pub use ast::{LineKind, NativeCond, NativeDocument, NativeLine, NativeOp};
pub use parser::{parse_native, NativeParser};
pub use reverse::{Reversed, Reverser};
