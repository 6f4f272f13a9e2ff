//! Sections and hooks
//!
//! Every top-level DSL block names a section, and every section except
//! `VARS` is bound to exactly one native hook. `SectionSet` is the compact
//! form used by the symbol tables for section restrictions.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One top-level DSL block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionType {
    Remap,
    SendRequest,
    ReadResponse,
    SendResponse,
    ReadRequest,
    PreRemap,
    TxnStart,
    TxnClose,
    Vars,
}

impl SectionType {
    /// All sections, in declaration order
    pub const ALL: [SectionType; 9] = [
        SectionType::Remap,
        SectionType::SendRequest,
        SectionType::ReadResponse,
        SectionType::SendResponse,
        SectionType::ReadRequest,
        SectionType::PreRemap,
        SectionType::TxnStart,
        SectionType::TxnClose,
        SectionType::Vars,
    ];

    /// The sections that carry a hook
    pub const HOOKED: [SectionType; 8] = [
        SectionType::Remap,
        SectionType::SendRequest,
        SectionType::ReadResponse,
        SectionType::SendResponse,
        SectionType::ReadRequest,
        SectionType::PreRemap,
        SectionType::TxnStart,
        SectionType::TxnClose,
    ];

    /// DSL spelling of the section
    pub const fn name(self) -> &'static str {
        match self {
            SectionType::Remap => "REMAP",
            SectionType::SendRequest => "SEND_REQUEST",
            SectionType::ReadResponse => "READ_RESPONSE",
            SectionType::SendResponse => "SEND_RESPONSE",
            SectionType::ReadRequest => "READ_REQUEST",
            SectionType::PreRemap => "PRE_REMAP",
            SectionType::TxnStart => "TXN_START",
            SectionType::TxnClose => "TXN_CLOSE",
            SectionType::Vars => "VARS",
        }
    }

    /// Native hook name, `None` for VARS
    pub const fn hook(self) -> Option<&'static str> {
        match self {
            SectionType::Remap => Some("REMAP_PSEUDO_HOOK"),
            SectionType::SendRequest => Some("SEND_REQUEST_HDR_HOOK"),
            SectionType::ReadResponse => Some("READ_RESPONSE_HDR_HOOK"),
            SectionType::SendResponse => Some("SEND_RESPONSE_HDR_HOOK"),
            SectionType::ReadRequest => Some("READ_REQUEST_HDR_HOOK"),
            SectionType::PreRemap => Some("READ_REQUEST_PRE_REMAP_HOOK"),
            SectionType::TxnStart => Some("TXN_START_HOOK"),
            SectionType::TxnClose => Some("TXN_CLOSE_HOOK"),
            SectionType::Vars => None,
        }
    }

    /// Map a native hook name back to its section
    pub fn from_hook(hook: &str) -> Result<SectionType> {
        Self::HOOKED
            .into_iter()
            .find(|s| s.hook() == Some(hook))
            .ok_or_else(|| Error::UnknownHook(hook.to_string()))
    }

    /// Map a DSL section name to its section
    pub fn from_name(name: &str) -> Result<SectionType> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::UnknownSection(name.to_string()))
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SectionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

// ============================================================
// Section sets
// ============================================================

/// A set of sections, used for symbol restrictions
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SectionSet(u16);

impl SectionSet {
    pub const EMPTY: SectionSet = SectionSet(0);

    /// Every hook-bearing section
    pub const ALL_HOOKS: SectionSet = SectionSet::of(&SectionType::HOOKED);

    /// Hooks where HTTP transaction data is available
    pub const HTTP: SectionSet = SectionSet::of(&[
        SectionType::PreRemap,
        SectionType::Remap,
        SectionType::ReadRequest,
        SectionType::SendRequest,
        SectionType::ReadResponse,
        SectionType::SendResponse,
    ]);

    /// Hooks where an upstream connection may exist
    pub const UPSTREAM: SectionSet = SectionSet::HTTP;

    /// Hooks up to and including the origin request
    pub const EARLY_REQUEST: SectionSet = SectionSet::of(&[
        SectionType::PreRemap,
        SectionType::Remap,
        SectionType::ReadRequest,
        SectionType::SendRequest,
    ]);

    /// Hooks before remap has finished
    pub const PRE_ORIGIN: SectionSet = SectionSet::of(&[
        SectionType::PreRemap,
        SectionType::Remap,
        SectionType::ReadRequest,
    ]);

    /// Hooks that see the client-facing response
    pub const CLIENT_RESPONSE: SectionSet = SectionSet::of(&[
        SectionType::ReadResponse,
        SectionType::SendResponse,
        SectionType::TxnClose,
    ]);

    /// Hooks that see the origin response
    pub const ORIGIN_RESPONSE: SectionSet =
        SectionSet::of(&[SectionType::ReadResponse, SectionType::SendResponse]);

    pub const fn of(sections: &[SectionType]) -> SectionSet {
        let mut bits = 0u16;
        let mut i = 0;
        while i < sections.len() {
            bits |= sections[i].bit();
            i += 1;
        }
        SectionSet(bits)
    }

    pub const fn contains(self, section: SectionType) -> bool {
        self.0 & section.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = SectionType> {
        SectionType::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl fmt::Debug for SectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(SectionType::name)).finish()
    }
}

// ============================================================
// Section context
// ============================================================

/// The section enclosing the code currently being visited
///
/// There is no nesting: a context is either idle or inside exactly one
/// section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionContext {
    current: Option<SectionType>,
}

impl SectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context already inside `section`
    pub fn within(section: SectionType) -> Self {
        Self {
            current: Some(section),
        }
    }

    /// IDLE -> IN_SECTION
    pub fn enter(&mut self, section: SectionType) -> Result<()> {
        if let Some(open) = self.current {
            return Err(Error::Semantic(format!(
                "section {} opened while {} is still open",
                section, open
            )));
        }
        self.current = Some(section);
        Ok(())
    }

    /// IN_SECTION -> IDLE
    pub fn exit(&mut self) -> Option<SectionType> {
        self.current.take()
    }

    pub fn current(&self) -> Option<SectionType> {
        self.current
    }

    pub fn hook(&self) -> Option<&'static str> {
        self.current.and_then(SectionType::hook)
    }

    /// Whether a symbol restricted to `allowed` is legal here
    ///
    /// Unrestricted symbols are legal everywhere, including outside any
    /// section.
    pub fn permits(&self, allowed: Option<SectionSet>) -> bool {
        match (allowed, self.current) {
            (None, _) => true,
            (Some(set), Some(section)) => set.contains(section),
            (Some(_), None) => true,
        }
    }
}
