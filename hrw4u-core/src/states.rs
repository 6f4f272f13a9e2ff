//! Per-statement modifier state
//!
//! Conditions and operators accept disjoint modifier sets. Each statement
//! gets a fresh state, modifiers are folded into it one token at a time,
//! and rendering uses a fixed order that the reverse tool depends on.

use crate::error::{Error, Result};
use std::fmt;

/// Which state machine a modifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierClass {
    Condition,
    Operator,
}

/// Every modifier either state machine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    And,
    Or,
    Not,
    NoCase,
    Pre,
    Suf,
    Ext,
    Mid,
    Inv,
    Last,
    Qsa,
}

impl Modifier {
    /// Case-normalize a token and classify it
    pub fn classify(token: &str) -> Result<Modifier> {
        let upper = token.trim().to_ascii_uppercase();
        let modifier = match upper.as_str() {
            "AND" => Modifier::And,
            "OR" => Modifier::Or,
            "NOT" => Modifier::Not,
            "NOCASE" => Modifier::NoCase,
            "PRE" => Modifier::Pre,
            "SUF" => Modifier::Suf,
            "EXT" => Modifier::Ext,
            "MID" => Modifier::Mid,
            "I" | "INV" => Modifier::Inv,
            "L" | "LAST" => Modifier::Last,
            "QSA" => Modifier::Qsa,
            _ => return Err(Error::UnknownModifier(token.to_string())),
        };
        Ok(modifier)
    }

    pub const fn class(self) -> ModifierClass {
        match self {
            Modifier::Inv | Modifier::Last | Modifier::Qsa => ModifierClass::Operator,
            _ => ModifierClass::Condition,
        }
    }

    /// Canonical native spelling
    pub const fn as_str(self) -> &'static str {
        match self {
            Modifier::And => "AND",
            Modifier::Or => "OR",
            Modifier::Not => "NOT",
            Modifier::NoCase => "NOCASE",
            Modifier::Pre => "PRE",
            Modifier::Suf => "SUF",
            Modifier::Ext => "EXT",
            Modifier::Mid => "MID",
            Modifier::Inv => "I",
            Modifier::Last => "L",
            Modifier::Qsa => "QSA",
        }
    }

    /// Modifiers a DSL `with` clause may carry on a comparison
    pub const fn allowed_in_with(self) -> bool {
        matches!(
            self,
            Modifier::NoCase | Modifier::Pre | Modifier::Suf | Modifier::Ext | Modifier::Mid
        )
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutually exclusive substring matching modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubstringMode {
    Pre,
    Suf,
    Ext,
    Mid,
}

impl SubstringMode {
    pub const fn modifier(self) -> Modifier {
        match self {
            SubstringMode::Pre => Modifier::Pre,
            SubstringMode::Suf => Modifier::Suf,
            SubstringMode::Ext => Modifier::Ext,
            SubstringMode::Mid => Modifier::Mid,
        }
    }

    fn from_modifier(modifier: Modifier) -> Option<SubstringMode> {
        match modifier {
            Modifier::Pre => Some(SubstringMode::Pre),
            Modifier::Suf => Some(SubstringMode::Suf),
            Modifier::Ext => Some(SubstringMode::Ext),
            Modifier::Mid => Some(SubstringMode::Mid),
            _ => None,
        }
    }
}

fn bracket(mods: &[&str]) -> String {
    if mods.is_empty() {
        String::new()
    } else {
        format!(" [{}]", mods.join(","))
    }
}

// ============================================================
// Condition state
// ============================================================

/// Modifier accumulator for one condition line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CondState {
    /// OR when set, AND otherwise
    pub or: bool,
    pub not: bool,
    pub nocase: bool,
    pub substring: Option<SubstringMode>,
    /// Last condition of its chain; suppresses the conjunction
    pub last: bool,
}

impl CondState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one modifier token into the state
    pub fn add_modifier(&mut self, token: &str) -> Result<()> {
        let modifier = Modifier::classify(token)?;
        self.apply(modifier)
    }

    pub fn apply(&mut self, modifier: Modifier) -> Result<()> {
        match modifier {
            Modifier::And => self.or = false,
            Modifier::Or => self.or = true,
            Modifier::Not => self.not = true,
            Modifier::NoCase => self.nocase = true,
            Modifier::Inv | Modifier::Last | Modifier::Qsa => {
                return Err(Error::ModifierNotAllowed {
                    modifier: modifier.to_string(),
                    target: "a condition".to_string(),
                });
            }
            substring => {
                let Some(mode) = SubstringMode::from_modifier(substring) else {
                    return Err(Error::UnknownModifier(substring.to_string()));
                };
                if let Some(existing) = self.substring {
                    return Err(Error::ConflictingModifier {
                        existing: existing.modifier().to_string(),
                        new: mode.modifier().to_string(),
                    });
                }
                self.substring = Some(mode);
            }
        }
        Ok(())
    }

    /// Inline order: conjunction (unless last), NOT, NOCASE, substring
    pub fn to_list(&self) -> Vec<&'static str> {
        let mut mods = Vec::with_capacity(4);
        if !self.last {
            mods.push(if self.or { "OR" } else { "AND" });
        }
        if self.not {
            mods.push("NOT");
        }
        if self.nocase {
            mods.push("NOCASE");
        }
        if let Some(mode) = self.substring {
            mods.push(mode.modifier().as_str());
        }
        mods
    }

    /// Bracketed suffix for a native condition line, empty when bare
    pub fn render(&self) -> String {
        bracket(&self.to_list())
    }

    /// DSL `with` order: EXT, NOCASE, PRE, MID, SUF
    pub fn with_clause(&self) -> Vec<&'static str> {
        let mut mods = Vec::with_capacity(2);
        if self.substring == Some(SubstringMode::Ext) {
            mods.push("EXT");
        }
        if self.nocase {
            mods.push("NOCASE");
        }
        for mode in [SubstringMode::Pre, SubstringMode::Mid, SubstringMode::Suf] {
            if self.substring == Some(mode) {
                mods.push(mode.modifier().as_str());
            }
        }
        mods
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================
// Operator state
// ============================================================

/// Modifier accumulator for one operator line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorState {
    pub inv: bool,
    pub last: bool,
    pub qsa: bool,
}

impl OperatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_modifier(&mut self, token: &str) -> Result<()> {
        let modifier = Modifier::classify(token)?;
        self.apply(modifier)
    }

    pub fn apply(&mut self, modifier: Modifier) -> Result<()> {
        match modifier {
            Modifier::Inv => self.inv = true,
            Modifier::Last => self.last = true,
            Modifier::Qsa => self.qsa = true,
            other => {
                return Err(Error::ModifierNotAllowed {
                    modifier: other.to_string(),
                    target: "an operator".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Order: I, L, QSA
    pub fn to_list(&self) -> Vec<&'static str> {
        let mut mods = Vec::with_capacity(3);
        if self.inv {
            mods.push("I");
        }
        if self.last {
            mods.push("L");
        }
        if self.qsa {
            mods.push("QSA");
        }
        mods
    }

    pub fn render(&self) -> String {
        bracket(&self.to_list())
    }

    pub fn is_empty(&self) -> bool {
        !(self.inv || self.last || self.qsa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(Modifier::classify("nocase").unwrap(), Modifier::NoCase);
        assert_eq!(Modifier::classify("Last").unwrap(), Modifier::Last);
        assert_eq!(Modifier::classify("qsa").unwrap().class(), ModifierClass::Operator);
        assert!(matches!(
            Modifier::classify("FOO"),
            Err(Error::UnknownModifier(m)) if m == "FOO"
        ));
    }

    #[test]
    fn test_inline_order() {
        let mut state = CondState::new();
        state.add_modifier("suf").unwrap();
        state.add_modifier("nocase").unwrap();
        state.add_modifier("not").unwrap();
        state.add_modifier("or").unwrap();
        assert_eq!(state.render(), " [OR,NOT,NOCASE,SUF]");

        state.last = true;
        assert_eq!(state.render(), " [NOT,NOCASE,SUF]");
    }

    #[test]
    fn test_default_conjunction_and_bare_last() {
        let mut state = CondState::new();
        assert_eq!(state.render(), " [AND]");
        state.last = true;
        assert_eq!(state.render(), "");
    }

    #[test]
    fn test_with_clause_order() {
        let mut state = CondState::new();
        state.add_modifier("EXT").unwrap();
        state.add_modifier("NOCASE").unwrap();
        assert_eq!(state.with_clause(), vec!["EXT", "NOCASE"]);

        let mut state = CondState::new();
        state.add_modifier("MID").unwrap();
        state.add_modifier("NOCASE").unwrap();
        assert_eq!(state.with_clause(), vec!["NOCASE", "MID"]);
    }

    #[test]
    fn test_conflicting_substring() {
        let mut state = CondState::new();
        state.add_modifier("PRE").unwrap();
        let err = state.add_modifier("SUF").unwrap_err();
        match err {
            Error::ConflictingModifier { existing, new } => {
                assert_eq!(existing, "PRE");
                assert_eq!(new, "SUF");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(state.substring, Some(SubstringMode::Pre));
    }

    #[test]
    fn test_repeated_substring_is_an_error() {
        let mut state = CondState::new();
        state.add_modifier("MID").unwrap();
        let err = state.add_modifier("mid").unwrap_err();
        assert!(matches!(
            &err,
            Error::ConflictingModifier { existing, new } if existing == "MID" && new == "MID"
        ));
        assert_eq!(state.substring, Some(SubstringMode::Mid));
    }

    #[test]
    fn test_operator_modifiers() {
        let mut ops = OperatorState::new();
        ops.add_modifier("QSA").unwrap();
        ops.add_modifier("L").unwrap();
        ops.add_modifier("I").unwrap();
        assert_eq!(ops.render(), " [I,L,QSA]");
        assert!(matches!(
            ops.add_modifier("NOCASE"),
            Err(Error::ModifierNotAllowed { .. })
        ));
    }

    #[test]
    fn test_operator_modifier_rejected_on_condition() {
        let mut state = CondState::new();
        assert!(matches!(
            state.add_modifier("L"),
            Err(Error::ModifierNotAllowed { .. })
        ));
    }
}
