//! Derived tables
//!
//! Everything here is a pure function of the primary tables in
//! [`symbols`](super::symbols). The forward and reverse compilers both
//! read these maps, so they can never disagree about a mapping.

use super::symbols::{AmbiguousTag, ReverseHint, SymbolEntry};
use crate::section::SectionType;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Inputs to the generator
#[derive(Debug, Clone, Copy)]
pub struct PrimaryTables {
    pub conditions: &'static [SymbolEntry],
    pub functions: &'static [SymbolEntry],
    pub operators: &'static [SymbolEntry],
    pub statements: &'static [SymbolEntry],
    pub ambiguous: &'static [AmbiguousTag],
    pub header_conditions: &'static [(SectionType, &'static str)],
    pub header_operators: &'static [(SectionType, &'static str)],
}

/// Maps derived from [`PrimaryTables`]
#[derive(Debug, Default)]
pub struct DerivedTables {
    /// (tag, payload) -> key, concrete non-IP conditions only
    pub condition_reverse: HashMap<(&'static str, Option<&'static str>), &'static str>,
    /// `IP:<payload>` -> key
    pub ip_reverse: HashMap<&'static str, &'static str>,
    /// (tag, fixed payload) -> namespace key
    pub namespace_reverse: HashMap<(&'static str, Option<&'static str>), &'static str>,
    /// Condition tags that are resolved through the header context map
    pub context_tags: HashSet<&'static str>,
    pub function_reverse: HashMap<&'static str, &'static str>,
    /// Native command -> statement function
    pub statement_reverse: HashMap<&'static str, &'static str>,
    /// Native command (any family member) -> assignment target
    pub operator_reverse: HashMap<&'static str, &'static str>,
    /// Commands resolved through the header operator context map
    pub context_commands: HashSet<&'static str>,
    pub ambiguous: HashMap<&'static str, AmbiguousTag>,
    pub header_conditions: HashMap<SectionType, &'static str>,
    pub header_operators: HashMap<SectionType, &'static str>,
    pub hook_to_section: HashMap<&'static str, SectionType>,
    pub section_to_hook: HashMap<SectionType, &'static str>,
}

/// Builds [`DerivedTables`]
pub struct TableGenerator {
    primary: PrimaryTables,
}

impl TableGenerator {
    pub fn new(primary: PrimaryTables) -> Self {
        Self { primary }
    }

    pub fn generate(&self) -> DerivedTables {
        let mut derived = DerivedTables::default();
        self.reverse_conditions(&mut derived);
        self.reverse_functions(&mut derived);
        self.reverse_operators(&mut derived);
        self.context_maps(&mut derived);
        Self::hook_maps(&mut derived);

        debug!(
            "🧮 Derived tables: {} conditions, {} namespaces, {} ip, {} functions, {} statements, {} operators",
            derived.condition_reverse.len(),
            derived.namespace_reverse.len(),
            derived.ip_reverse.len(),
            derived.function_reverse.len(),
            derived.statement_reverse.len(),
            derived.operator_reverse.len(),
        );
        derived
    }

    fn reverse_conditions(&self, derived: &mut DerivedTables) {
        for entry in self.primary.conditions {
            match entry.reverse {
                ReverseHint::Skip => continue,
                ReverseHint::Context => {
                    if entry.is_namespace() {
                        derived.context_tags.insert(entry.tag);
                    }
                    continue;
                }
                ReverseHint::Primary => {}
            }

            if entry.is_namespace() {
                insert_once(&mut derived.namespace_reverse, (entry.tag, entry.payload), entry.key);
            } else if entry.tag == "IP" {
                if let Some(payload) = entry.payload {
                    insert_once(&mut derived.ip_reverse, payload, entry.key);
                }
            } else {
                insert_once(&mut derived.condition_reverse, (entry.tag, entry.payload), entry.key);
            }
        }
    }

    fn reverse_functions(&self, derived: &mut DerivedTables) {
        for entry in self.primary.functions {
            if entry.reverse == ReverseHint::Primary {
                insert_once(&mut derived.function_reverse, entry.tag, entry.key);
            }
        }
        for entry in self.primary.statements {
            if entry.reverse == ReverseHint::Primary {
                insert_once(&mut derived.statement_reverse, entry.tag, entry.key);
            }
        }
    }

    fn reverse_operators(&self, derived: &mut DerivedTables) {
        for entry in self.primary.operators {
            let mut commands = vec![entry.tag];
            if let Some(family) = entry.family {
                commands.extend(family.add);
                commands.push(family.rm);
            }

            match entry.reverse {
                ReverseHint::Skip => {}
                ReverseHint::Context => derived.context_commands.extend(commands),
                ReverseHint::Primary => {
                    for command in commands {
                        insert_once(&mut derived.operator_reverse, command, entry.key);
                    }
                }
            }
        }
    }

    fn context_maps(&self, derived: &mut DerivedTables) {
        for tag in self.primary.ambiguous {
            derived.ambiguous.insert(tag.tag, *tag);
        }
        derived.header_conditions = self.primary.header_conditions.iter().copied().collect();
        derived.header_operators = self.primary.header_operators.iter().copied().collect();
    }

    fn hook_maps(derived: &mut DerivedTables) {
        for section in SectionType::HOOKED {
            if let Some(hook) = section.hook() {
                derived.hook_to_section.insert(hook, section);
                derived.section_to_hook.insert(section, hook);
            }
        }
    }
}

/// First entry wins; a second one is a table defect worth a warning
fn insert_once<K, V>(map: &mut HashMap<K, V>, key: K, value: V)
where
    K: std::hash::Hash + Eq + std::fmt::Debug,
    V: std::fmt::Debug,
{
    if let Some(existing) = map.get(&key) {
        warn!("duplicate reverse mapping for {:?}: keeping {:?}, ignoring {:?}", key, existing, value);
        return;
    }
    map.insert(key, value);
}
