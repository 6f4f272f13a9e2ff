//! Symbol tables
//!
//! [`SymbolTables`] owns the primary tables and the maps derived from
//! them. It is built once per process through [`SymbolTables::global`] and
//! never mutated afterwards, so concurrent compilations share it freely.

pub mod generator;
pub mod symbols;

pub use generator::{DerivedTables, PrimaryTables, TableGenerator};
pub use symbols::{
    AmbiguousTag, OpFamily, ReverseHint, SuffixGroup, SymbolEntry, ValueType, AMBIGUOUS_TAGS,
    CONDITIONS, FUNCTIONS, HEADER_CONDITION_CONTEXT, HEADER_OPERATOR_CONTEXT, OPERATORS,
    PLAIN_MODIFIERS, STATEMENTS, TEXT_MODIFIERS,
};

use crate::error::{Error, Result};
use crate::section::{SectionContext, SectionType};
use crate::tag::TagRef;
use std::sync::LazyLock;
use tracing::trace;

static GLOBAL: LazyLock<SymbolTables> = LazyLock::new(SymbolTables::new);

/// A symbol looked up in one of the tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'t> {
    pub entry: &'t SymbolEntry,
    /// Text after the namespace, normalised for rendering
    pub suffix: Option<String>,
}

impl Resolved<'_> {
    /// `TAG[:payload][:SUFFIX]`
    pub fn target(&self) -> String {
        self.entry.target(self.suffix.as_deref())
    }

    /// `%{TAG[:payload][:SUFFIX]}`
    pub fn as_cond(&self) -> String {
        format!("%{{{}}}", self.target())
    }
}

/// A native condition mapped back to a DSL identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseCondition<'t> {
    pub ident: String,
    pub entry: &'t SymbolEntry,
}

/// The immutable table set
#[derive(Debug)]
pub struct SymbolTables {
    primary: PrimaryTables,
    derived: DerivedTables,
}

impl Default for SymbolTables {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTables {
    pub fn new() -> Self {
        let primary = PrimaryTables {
            conditions: CONDITIONS,
            functions: FUNCTIONS,
            operators: OPERATORS,
            statements: STATEMENTS,
            ambiguous: AMBIGUOUS_TAGS,
            header_conditions: HEADER_CONDITION_CONTEXT,
            header_operators: HEADER_OPERATOR_CONTEXT,
        };
        let derived = TableGenerator::new(primary).generate();
        Self { primary, derived }
    }

    /// Process-wide shared instance
    pub fn global() -> &'static SymbolTables {
        &GLOBAL
    }

    pub fn conditions(&self) -> &'static [SymbolEntry] {
        self.primary.conditions
    }

    pub fn functions(&self) -> &'static [SymbolEntry] {
        self.primary.functions
    }

    pub fn operators(&self) -> &'static [SymbolEntry] {
        self.primary.operators
    }

    pub fn statements(&self) -> &'static [SymbolEntry] {
        self.primary.statements
    }

    pub fn derived(&self) -> &DerivedTables {
        &self.derived
    }

    // ========================================
    // Forward lookups
    // ========================================

    /// Exact key first, then the longest namespace that prefixes `ident`
    pub fn lookup<'t>(table: &'t [SymbolEntry], ident: &str) -> Option<&'t SymbolEntry> {
        if let Some(entry) = table.iter().find(|e| e.key == ident) {
            return Some(entry);
        }
        table
            .iter()
            .filter(|e| e.is_namespace() && ident.starts_with(e.key))
            .max_by_key(|e| e.key.len())
    }

    fn resolve_in<'t>(
        &'t self,
        table: &'t [SymbolEntry],
        ident: &str,
        ctx: &SectionContext,
    ) -> Result<Resolved<'t>> {
        let entry =
            Self::lookup(table, ident).ok_or_else(|| Error::UnknownSymbol(ident.to_string()))?;

        if !ctx.permits(entry.sections) {
            if let Some(section) = ctx.current() {
                return Err(Error::SectionRestriction {
                    symbol: ident.to_string(),
                    section,
                });
            }
        }

        let suffix = if entry.is_namespace() {
            let raw = &ident[entry.key.len()..];
            let valid = match entry.suffixes {
                Some(group) => group.validate(raw),
                None => !raw.is_empty(),
            };
            if !valid {
                return Err(Error::InvalidSuffix {
                    namespace: entry.key.to_string(),
                    suffix: raw.to_string(),
                });
            }
            Some(if entry.upper {
                raw.to_ascii_uppercase()
            } else {
                raw.to_string()
            })
        } else {
            None
        };

        trace!("resolved `{}' -> {}", ident, entry.target(suffix.as_deref()));
        Ok(Resolved { entry, suffix })
    }

    pub fn resolve_condition(&self, ident: &str, ctx: &SectionContext) -> Result<Resolved<'_>> {
        self.resolve_in(self.primary.conditions, ident, ctx)
    }

    pub fn resolve_operator(&self, ident: &str, ctx: &SectionContext) -> Result<Resolved<'_>> {
        self.resolve_in(self.primary.operators, ident, ctx)
    }

    pub fn resolve_function(&self, name: &str, ctx: &SectionContext) -> Result<&SymbolEntry> {
        self.resolve_exact(self.primary.functions, name, ctx)
    }

    pub fn resolve_statement(&self, name: &str, ctx: &SectionContext) -> Result<&SymbolEntry> {
        self.resolve_exact(self.primary.statements, name, ctx)
    }

    fn resolve_exact<'t>(
        &'t self,
        table: &'t [SymbolEntry],
        name: &str,
        ctx: &SectionContext,
    ) -> Result<&'t SymbolEntry> {
        let entry = table
            .iter()
            .find(|e| e.key == name)
            .ok_or_else(|| Error::UnknownSymbol(name.to_string()))?;
        match ctx.current() {
            Some(section) if !entry.valid_in(section) => Err(Error::SectionRestriction {
                symbol: name.to_string(),
                section,
            }),
            _ => Ok(entry),
        }
    }

    // ========================================
    // Reverse lookups
    // ========================================

    /// Pick the DSL key for an ambiguous tag
    ///
    /// Returns `None` when `tag` is not ambiguous. The two-way policy is
    /// exhaustive; an error only means the table names a key that does not
    /// exist.
    pub fn resolve_ambiguous(&self, tag: &str, section: SectionType) -> Option<Result<&SymbolEntry>> {
        let rule = self.derived.ambiguous.get(tag)?;
        let key = if rule.outbound_sections.contains(section) {
            rule.outbound
        } else {
            rule.inbound
        };
        let found = self
            .primary
            .conditions
            .iter()
            .find(|e| e.key == key)
            .ok_or_else(|| Error::AmbiguousResolution {
                tag: tag.to_string(),
                section,
            });
        Some(found)
    }

    /// Map a native condition tag back to a DSL identifier
    pub fn reverse_condition(&self, tag: &TagRef<'_>, section: SectionType) -> Result<ReverseCondition<'_>> {
        let found = self.reverse_condition_unchecked(tag, section)?;
        if !found.entry.valid_in(section) {
            return Err(Error::SectionRestriction {
                symbol: found.ident,
                section,
            });
        }
        Ok(found)
    }

    fn reverse_condition_unchecked(
        &self,
        tag: &TagRef<'_>,
        section: SectionType,
    ) -> Result<ReverseCondition<'_>> {
        let unknown = || Error::UnknownSymbol(tag.to_string());

        if tag.payload.is_none() {
            if let Some(found) = self.resolve_ambiguous(tag.tag, section) {
                let entry = found?;
                return Ok(ReverseCondition {
                    ident: entry.key.to_string(),
                    entry,
                });
            }
        }

        if tag.tag == "IP" {
            let key = tag
                .payload
                .and_then(|p| self.derived.ip_reverse.get(p))
                .ok_or_else(unknown)?;
            return self.condition_entry(key, String::new());
        }

        if let Some(key) = self.derived.condition_reverse.get(&(tag.tag, tag.payload)) {
            return self.condition_entry(key, String::new());
        }

        let payload = tag.payload.ok_or_else(unknown)?;

        if self.derived.context_tags.contains(tag.tag) {
            let key = self
                .derived
                .header_conditions
                .get(&section)
                .ok_or_else(|| Error::SectionRestriction {
                    symbol: tag.to_string(),
                    section,
                })?;
            return self.condition_entry(key, payload.to_string());
        }

        // Longest fixed payload first: `CLIENT-CERT:SAN:DNS` tries
        // `CLIENT-CERT:SAN`, then `CLIENT-CERT`, then no fixed payload.
        let mut split_points: Vec<usize> = payload.match_indices(':').map(|(i, _)| i).collect();
        split_points.reverse();
        for idx in split_points {
            let (fixed, rest) = (&payload[..idx], &payload[idx + 1..]);
            if let Some(key) = self.namespace_key(tag.tag, Some(fixed)) {
                return self.namespace_entry(key, rest);
            }
        }
        if let Some(key) = self.namespace_key(tag.tag, None) {
            return self.namespace_entry(key, payload);
        }
        Err(unknown())
    }

    fn namespace_key(&self, tag: &str, fixed: Option<&str>) -> Option<&'static str> {
        self.derived.namespace_reverse.get(&(tag, fixed)).copied()
    }

    fn namespace_entry(&self, key: &str, suffix: &str) -> Result<ReverseCondition<'_>> {
        let entry = self
            .primary
            .conditions
            .iter()
            .find(|e| e.key == key)
            .ok_or_else(|| Error::UnknownSymbol(key.to_string()))?;
        let suffix = if entry.upper {
            suffix.to_ascii_lowercase()
        } else {
            suffix.to_string()
        };
        Ok(ReverseCondition {
            ident: format!("{}{}", entry.key, suffix),
            entry,
        })
    }

    fn condition_entry(&self, key: &str, suffix: String) -> Result<ReverseCondition<'_>> {
        self.namespace_entry(key, &suffix)
    }

    /// Map a native operator command back to its assignment target
    pub fn reverse_operator(&self, command: &str, section: SectionType) -> Result<&SymbolEntry> {
        let key = if self.derived.context_commands.contains(command) {
            self.derived
                .header_operators
                .get(&section)
                .copied()
                .ok_or_else(|| Error::SectionRestriction {
                    symbol: command.to_string(),
                    section,
                })?
        } else {
            self.derived
                .operator_reverse
                .get(command)
                .copied()
                .ok_or_else(|| Error::UnknownSymbol(command.to_string()))?
        };
        let entry = self
            .primary
            .operators
            .iter()
            .find(|e| e.key == key)
            .ok_or_else(|| Error::UnknownSymbol(key.to_string()))?;
        if !entry.valid_in(section) {
            return Err(Error::SectionRestriction {
                symbol: entry.key.to_string(),
                section,
            });
        }
        Ok(entry)
    }

    pub fn reverse_function(&self, tag: &str) -> Option<&SymbolEntry> {
        let key = self.derived.function_reverse.get(tag)?;
        self.primary.functions.iter().find(|e| e.key == *key)
    }

    pub fn reverse_statement(&self, command: &str) -> Option<&SymbolEntry> {
        let key = self.derived.statement_reverse.get(command)?;
        self.primary.statements.iter().find(|e| e.key == *key)
    }

    pub fn section_for_hook(&self, hook: &str) -> Result<SectionType> {
        self.derived
            .hook_to_section
            .get(hook)
            .copied()
            .ok_or_else(|| Error::UnknownHook(hook.to_string()))
    }

    pub fn hook_for_section(&self, section: SectionType) -> Option<&'static str> {
        self.derived.section_to_hook.get(&section).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::SectionSet;
    use crate::states::Modifier;
    use pretty_assertions::assert_eq;

    fn tables() -> &'static SymbolTables {
        SymbolTables::global()
    }

    fn remap() -> SectionContext {
        SectionContext::within(SectionType::Remap)
    }

    #[test]
    fn test_resolve_exact_and_namespace() {
        let t = tables();
        assert_eq!(t.resolve_condition("inbound.ip", &remap()).unwrap().as_cond(), "%{IP:CLIENT}");
        assert_eq!(
            t.resolve_condition("outbound.req.X-Foo", &remap()).unwrap().as_cond(),
            "%{HEADER:X-Foo}"
        );
        assert_eq!(
            t.resolve_condition("inbound.url.host", &remap()).unwrap().as_cond(),
            "%{CLIENT-URL:HOST}"
        );
        assert_eq!(
            t.resolve_condition("inbound.conn.client-cert.san.dns", &remap()).unwrap().as_cond(),
            "%{INBOUND:CLIENT-CERT:SAN:DNS}"
        );
    }

    #[test]
    fn test_longest_namespace_wins() {
        let entry = SymbolTables::lookup(CONDITIONS, "inbound.conn.server-cert.pem").unwrap();
        assert_eq!(entry.key, "inbound.conn.server-cert.");
    }

    #[test]
    fn test_allowed_modifiers_follow_value_type() {
        let t = tables();
        let path = t.resolve_condition("inbound.url.path", &remap()).unwrap().entry;
        assert!(path.allows(Modifier::NoCase));
        assert!(path.allows(Modifier::Mid));

        let ip = t.resolve_condition("inbound.ip", &remap()).unwrap().entry;
        assert!(ip.allows(Modifier::Not));
        assert!(!ip.allows(Modifier::NoCase));
        assert!(!ip.allows(Modifier::Pre));

        let status = SymbolTables::lookup(CONDITIONS, "inbound.status").unwrap();
        assert_eq!(status.modifiers, PLAIN_MODIFIERS);
        assert!(!status.allows(Modifier::NoCase));
    }

    #[test]
    fn test_unknown_and_restricted() {
        let t = tables();
        assert!(matches!(
            t.resolve_condition("inbound.bogus", &remap()),
            Err(Error::UnknownSymbol(s)) if s == "inbound.bogus"
        ));
        assert!(matches!(
            t.resolve_condition("inbound.resp.X", &remap()),
            Err(Error::SectionRestriction { section: SectionType::Remap, .. })
        ));
    }

    #[test]
    fn test_invalid_suffix() {
        let err = tables().resolve_condition("geo.planet", &remap()).unwrap_err();
        assert!(matches!(err, Error::InvalidSuffix { suffix, .. } if suffix == "planet"));
    }

    #[test]
    fn test_ambiguous_resolution_is_exhaustive() {
        let t = tables();
        for rule in AMBIGUOUS_TAGS {
            for section in SectionType::ALL {
                let entry = t.resolve_ambiguous(rule.tag, section).unwrap().unwrap();
                if rule.outbound_sections.contains(section) {
                    assert_eq!(entry.key, rule.outbound);
                } else {
                    assert_eq!(entry.key, rule.inbound);
                }
            }
        }
        assert!(t.resolve_ambiguous("HEADER", SectionType::Remap).is_none());
    }

    #[test]
    fn test_primary_conditions_invert() {
        let t = tables();
        for entry in CONDITIONS.iter().filter(|e| e.reverse == ReverseHint::Primary) {
            let section = SectionType::HOOKED
                .into_iter()
                .find(|s| entry.valid_in(*s))
                .unwrap();
            let ctx = SectionContext::within(section);
            let ident = match entry.suffixes {
                Some(group) => format!("{}{}", entry.key, group.values()[0].to_ascii_lowercase()),
                None if entry.is_namespace() => format!("{}x", entry.key),
                None => entry.key.to_string(),
            };
            let forward = t.resolve_condition(&ident, &ctx).unwrap().as_cond();
            let back = t.reverse_condition(&TagRef::parse(&forward), section).unwrap();
            assert_eq!(back.ident, ident, "round trip through {forward}");
        }
    }

    #[test]
    fn test_primary_operators_invert() {
        let t = tables();
        for entry in OPERATORS.iter().filter(|e| e.reverse == ReverseHint::Primary) {
            let section = SectionType::HOOKED
                .into_iter()
                .find(|s| entry.valid_in(*s))
                .unwrap();
            assert_eq!(t.reverse_operator(entry.tag, section).unwrap().key, entry.key);
        }
    }

    #[test]
    fn test_header_context_targets_are_valid() {
        let t = tables();
        for (section, key) in HEADER_CONDITION_CONTEXT {
            let entry = SymbolTables::lookup(CONDITIONS, key).unwrap();
            assert!(entry.valid_in(*section), "{key} in {section}");
            let found = t.reverse_condition(&TagRef::parse("%{HEADER:X-Test}"), *section).unwrap();
            assert_eq!(found.ident, format!("{key}X-Test"));
        }
        for (section, key) in HEADER_OPERATOR_CONTEXT {
            let entry = SymbolTables::lookup(OPERATORS, key).unwrap();
            assert!(entry.valid_in(*section), "{key} in {section}");
        }
        assert!(t.reverse_condition(&TagRef::parse("%{HEADER:X}"), SectionType::TxnStart).is_err());
    }

    #[test]
    fn test_hook_maps_are_bijective() {
        let t = tables();
        assert_eq!(t.derived().hook_to_section.len(), 8);
        for section in SectionType::HOOKED {
            let hook = t.hook_for_section(section).unwrap();
            assert_eq!(t.section_for_hook(hook).unwrap(), section);
        }
        assert!(t.section_for_hook("BOGUS_HOOK").is_err());
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = SymbolTables::new();
        let b = SymbolTables::new();
        assert_eq!(a.derived().condition_reverse, b.derived().condition_reverse);
        assert_eq!(a.derived().namespace_reverse, b.derived().namespace_reverse);
        assert_eq!(a.derived().operator_reverse, b.derived().operator_reverse);
    }

    #[test]
    fn test_status_reverse_by_section() {
        let t = tables();
        let tag = TagRef::parse("%{STATUS}");
        assert_eq!(t.reverse_condition(&tag, SectionType::ReadResponse).unwrap().ident, "outbound.status");
        assert_eq!(t.reverse_condition(&tag, SectionType::SendResponse).unwrap().ident, "inbound.status");
        assert!(matches!(
            t.reverse_condition(&tag, SectionType::TxnStart),
            Err(Error::SectionRestriction { .. })
        ));
    }

    #[test]
    fn test_functions_and_statements() {
        let t = tables();
        assert_eq!(t.reverse_function("RANDOM").unwrap().key, "random");
        assert_eq!(t.reverse_statement("set-redirect").unwrap().key, "set-redirect");
        assert!(t.reverse_statement("rm-destination").is_none());
        let skip = t.resolve_statement("skip-remap", &remap());
        assert!(matches!(skip, Err(Error::SectionRestriction { .. })));
        assert!(SectionSet::HTTP.contains(SectionType::Remap));
    }
}
