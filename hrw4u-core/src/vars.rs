//! Typed state variables
//!
//! `VARS` declarations bind names to per-transaction state slots. Each
//! type has its own small slot space.

use crate::error::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarType {
    Bool,
    Int8,
    Int16,
}

impl VarType {
    pub const ALL: [VarType; 3] = [VarType::Bool, VarType::Int8, VarType::Int16];

    /// `bool`, `boolean`, `int8` or `int16`, any case
    pub fn from_name(name: &str) -> Result<VarType> {
        match name.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(VarType::Bool),
            "int8" => Ok(VarType::Int8),
            "int16" => Ok(VarType::Int16),
            _ => Err(Error::Variable(format!("unknown variable type '{}'", name))),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            VarType::Bool => "bool",
            VarType::Int8 => "int8",
            VarType::Int16 => "int16",
        }
    }

    pub const fn cond_tag(self) -> &'static str {
        match self {
            VarType::Bool => "STATE-FLAG",
            VarType::Int8 => "STATE-INT8",
            VarType::Int16 => "STATE-INT16",
        }
    }

    pub const fn operator(self) -> &'static str {
        match self {
            VarType::Bool => "set-state-flag",
            VarType::Int8 => "set-state-int8",
            VarType::Int16 => "set-state-int16",
        }
    }

    /// Number of slots
    pub const fn limit(self) -> usize {
        match self {
            VarType::Bool => 16,
            VarType::Int8 => 4,
            VarType::Int16 => 1,
        }
    }

    pub fn from_cond_tag(tag: &str) -> Option<VarType> {
        Self::ALL.into_iter().find(|t| t.cond_tag() == tag)
    }

    pub fn from_operator(command: &str) -> Option<VarType> {
        Self::ALL.into_iter().find(|t| t.operator() == command)
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub ty: VarType,
    pub slot: usize,
}

impl Variable {
    /// `STATE-FLAG:3`
    pub fn target(&self) -> String {
        format!("{}:{}", self.ty.cond_tag(), self.slot)
    }

    pub fn as_cond(&self) -> String {
        format!("%{{{}}}", self.target())
    }
}

/// Variables of one program, in declaration order
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    vars: Vec<Variable>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, type_name: &str, slot: Option<usize>) -> Result<&Variable> {
        if name.contains('.') || name.contains(':') {
            return Err(Error::Variable(format!(
                "variable name '{}' must not contain '.' or ':'",
                name
            )));
        }
        if self.get(name).is_some() {
            return Err(Error::Variable(format!("variable '{}' already declared", name)));
        }
        let ty = VarType::from_name(type_name)?;
        let used = |s: usize| self.vars.iter().any(|v| v.ty == ty && v.slot == s);

        let slot = match slot {
            Some(s) if s >= ty.limit() => {
                return Err(Error::Variable(format!(
                    "slot {} out of range for {} (0-{})",
                    s,
                    ty,
                    ty.limit() - 1
                )));
            }
            Some(s) if used(s) => {
                return Err(Error::Variable(format!("{} slot {} is already in use", ty, s)));
            }
            Some(s) => s,
            None => (0..ty.limit()).find(|s| !used(*s)).ok_or_else(|| {
                Error::Variable(format!("too many {} variables (limit {})", ty, ty.limit()))
            })?,
        };

        tracing::debug!("bind `{}' to {}:{}", name, ty.cond_tag(), slot);
        self.vars.push(Variable {
            name: name.to_string(),
            ty,
            slot,
        });
        Ok(&self.vars[self.vars.len() - 1])
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.iter().find(|v| v.name == name)
    }

    pub fn by_slot(&self, ty: VarType, slot: usize) -> Option<&Variable> {
        self.vars.iter().find(|v| v.ty == ty && v.slot == slot)
    }

    pub fn names(&self) -> Vec<&str> {
        self.vars.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_slots() {
        let mut vars = VariableTable::new();
        assert_eq!(vars.declare("a", "bool", None).unwrap().slot, 0);
        assert_eq!(vars.declare("b", "boolean", Some(5)).unwrap().slot, 5);
        assert_eq!(vars.declare("c", "BOOL", None).unwrap().slot, 1);
        assert_eq!(vars.declare("n", "int8", None).unwrap().as_cond(), "%{STATE-INT8:0}");
    }

    #[test]
    fn test_limits() {
        let mut vars = VariableTable::new();
        vars.declare("w", "int16", None).unwrap();
        assert!(matches!(vars.declare("x", "int16", None), Err(Error::Variable(_))));
        assert!(vars.declare("y", "int8", Some(4)).is_err());
        assert!(vars.declare("z", "bool", Some(15)).is_ok());
    }

    #[test]
    fn test_rejects_bad_names_and_duplicates() {
        let mut vars = VariableTable::new();
        assert!(vars.declare("a.b", "bool", None).is_err());
        assert!(vars.declare("a:b", "bool", None).is_err());
        vars.declare("a", "bool", None).unwrap();
        assert!(vars.declare("a", "int8", None).is_err());
        assert!(vars.declare("q", "float", None).is_err());
    }

    #[test]
    fn test_slot_collision() {
        let mut vars = VariableTable::new();
        vars.declare("a", "bool", Some(3)).unwrap();
        assert!(vars.declare("b", "bool", Some(3)).is_err());
        assert!(vars.declare("c", "int8", Some(3)).is_ok());
        assert_eq!(vars.by_slot(VarType::Bool, 3).map(|v| v.name.as_str()), Some("a"));
    }
}
