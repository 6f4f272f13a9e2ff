//! Did-you-mean suggestions
//!
//! Candidates come from the symbol tables, filtered by the role the
//! misspelled token plays and by the enclosing section, so a suggestion is
//! always something that would be legal at that position.

use crate::config::{SimilarityAlgorithm, SuggestionSettings};
use crate::section::SectionType;
use crate::tables::{SymbolEntry, SymbolTables};
use std::collections::BTreeSet;

/// The role of the token being looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextType {
    Condition,
    Operator,
    Function,
    Unrestricted,
}

/// A ranked alternative
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionCandidate {
    pub symbol: String,
    pub score: f64,
}

/// Fuzzy matcher over the symbol tables
#[derive(Debug, Clone)]
pub struct SuggestionEngine<'t> {
    tables: &'t SymbolTables,
    settings: SuggestionSettings,
}

impl Default for SuggestionEngine<'static> {
    fn default() -> Self {
        Self::new(SymbolTables::global(), SuggestionSettings::default())
    }
}

impl<'t> SuggestionEngine<'t> {
    pub fn new(tables: &'t SymbolTables, settings: SuggestionSettings) -> Self {
        Self { tables, settings }
    }

    /// Ranked symbols for `input`, best first
    pub fn get_suggestions(
        &self,
        input: &str,
        context: ContextType,
        section: Option<SectionType>,
        declared_vars: &[&str],
    ) -> Vec<String> {
        self.rank(input, context, section, declared_vars)
            .into_iter()
            .map(|c| c.symbol)
            .collect()
    }

    pub fn rank(
        &self,
        input: &str,
        context: ContextType,
        section: Option<SectionType>,
        declared_vars: &[&str],
    ) -> Vec<SuggestionCandidate> {
        if input.is_empty() {
            return Vec::new();
        }

        let entries = self.entries(context, section);
        let native = is_native_spelling(input);

        let mut scored: Vec<SuggestionCandidate> = Vec::new();
        for var in declared_vars {
            self.push_scored(&mut scored, input, var, var.to_string());
        }

        if native {
            let tags: BTreeSet<&str> = entries.iter().map(|e| e.tag).collect();
            for tag in tags {
                self.push_scored(&mut scored, input, tag, tag.to_string());
            }
        } else {
            for entry in &entries {
                self.score_dsl_entry(&mut scored, input, entry);
            }
        }

        if scored.is_empty() && !native {
            scored = self.prefix_fallback(input, &entries);
        }

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        let mut seen = BTreeSet::new();
        scored.retain(|c| seen.insert(c.symbol.clone()));
        scored.truncate(self.settings.max);
        scored
    }

    fn entries(&self, context: ContextType, section: Option<SectionType>) -> Vec<&'t SymbolEntry> {
        let t = self.tables;
        let tables: Vec<&'t [SymbolEntry]> = match context {
            ContextType::Condition => vec![t.conditions(), t.functions()],
            ContextType::Operator => vec![t.operators(), t.statements()],
            ContextType::Function => vec![t.functions(), t.statements()],
            ContextType::Unrestricted => {
                vec![t.conditions(), t.functions(), t.operators(), t.statements()]
            }
        };
        let restrict = context != ContextType::Unrestricted;
        tables
            .into_iter()
            .flatten()
            .filter(|e| match (restrict, section) {
                (true, Some(s)) => e.valid_in(s),
                _ => true,
            })
            .collect()
    }

    fn score_dsl_entry(&self, out: &mut Vec<SuggestionCandidate>, input: &str, entry: &SymbolEntry) {
        if !entry.is_namespace() {
            self.push_scored(out, input, entry.key, entry.key.to_string());
            return;
        }

        if let Some(group) = entry.suffixes {
            for value in group.values() {
                let full = format!("{}{}", entry.key, value.to_ascii_lowercase());
                self.push_scored(out, input, &full, full.clone());
            }
            return;
        }

        // Open namespace: compare the same number of dotted segments and
        // carry the user's remainder over.
        let depth = entry.key.matches('.').count();
        let mut cut = None;
        for (seen, (idx, _)) in input.match_indices('.').enumerate() {
            if seen + 1 == depth {
                cut = Some(idx + 1);
                break;
            }
        }
        if let Some(cut) = cut {
            let (head, rest) = input.split_at(cut);
            if !rest.is_empty() {
                self.push_scored(out, head, entry.key, format!("{}{}", entry.key, rest));
            }
        }
    }

    fn push_scored(&self, out: &mut Vec<SuggestionCandidate>, input: &str, candidate: &str, symbol: String) {
        let score = self.similarity(input, candidate);
        if score >= self.settings.threshold && !input.eq_ignore_ascii_case(&symbol) {
            out.push(SuggestionCandidate { symbol, score });
        }
    }

    fn prefix_fallback(&self, input: &str, entries: &[&SymbolEntry]) -> Vec<SuggestionCandidate> {
        let lowered = input.to_ascii_lowercase();
        let mut out: Vec<SuggestionCandidate> = entries
            .iter()
            .filter(|e| e.key.to_ascii_lowercase().starts_with(&lowered))
            .map(|e| SuggestionCandidate {
                symbol: e.key.to_string(),
                score: 100.0 * input.len() as f64 / e.key.len().max(1) as f64,
            })
            .collect();
        out.sort_by(|a, b| a.symbol.len().cmp(&b.symbol.len()).then_with(|| a.symbol.cmp(&b.symbol)));
        out
    }

    /// Normalised similarity in 0-100, case-insensitive
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let a = a.to_ascii_lowercase();
        let b = b.to_ascii_lowercase();
        let raw = match self.settings.algorithm {
            SimilarityAlgorithm::DamerauLevenshtein => strsim::normalized_damerau_levenshtein(&a, &b),
            SimilarityAlgorithm::JaroWinkler => strsim::jaro_winkler(&a, &b),
        };
        raw * 100.0
    }
}

/// `HEDAER` is a native tag spelling, `inbound.req` is DSL
fn is_native_spelling(input: &str) -> bool {
    !input.contains('.') && !input.chars().any(|c| c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn engine() -> SuggestionEngine<'static> {
        SuggestionEngine::default()
    }

    #[test]
    fn test_native_typo() {
        let got = engine().get_suggestions("HEDAER", ContextType::Condition, Some(SectionType::Remap), &[]);
        assert!(!got.is_empty());
        assert_eq!(got[0], "HEADER");
    }

    #[test]
    fn test_dsl_namespace_typo_keeps_remainder() {
        let got = engine().get_suggestions(
            "inbund.req.X-Foo",
            ContextType::Condition,
            Some(SectionType::Remap),
            &[],
        );
        assert_eq!(got.first().map(String::as_str), Some("inbound.req.X-Foo"));
    }

    #[test]
    fn test_section_filter() {
        let got = engine().get_suggestions(
            "inbound.resp.X-Foo",
            ContextType::Condition,
            Some(SectionType::Remap),
            &[],
        );
        assert!(got.iter().all(|s| !s.starts_with("inbound.resp.")));
    }

    #[test]
    fn test_suffix_group_expansion() {
        let got = engine().get_suggestions("inbound.url.hots", ContextType::Condition, Some(SectionType::Remap), &[]);
        assert_eq!(got.first().map(String::as_str), Some("inbound.url.host"));
    }

    #[test]
    fn test_declared_vars() {
        let got = engine().get_suggestions("is_intenal", ContextType::Condition, Some(SectionType::Remap), &["is_internal"]);
        assert_eq!(got.first().map(String::as_str), Some("is_internal"));
    }

    #[test]
    fn test_below_threshold_is_empty() {
        let got = engine().get_suggestions("QQQQQQQQ", ContextType::Condition, Some(SectionType::Remap), &[]);
        assert!(got.is_empty());
    }

    #[test]
    fn test_prefix_fallback() {
        let got = engine().get_suggestions("http.cn", ContextType::Condition, Some(SectionType::Remap), &[]);
        assert_eq!(got, vec!["http.cntl.".to_string()]);
    }

    #[test]
    fn test_max_bound() {
        let settings = SuggestionSettings {
            threshold: 0.0,
            max: 2,
            ..Default::default()
        };
        let engine = SuggestionEngine::new(SymbolTables::global(), settings);
        let got = engine.get_suggestions("x", ContextType::Unrestricted, None, &[]);
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn test_operator_context() {
        let got = engine().get_suggestions("set-redirct", ContextType::Operator, Some(SectionType::Remap), &[]);
        assert_eq!(got.first().map(String::as_str), Some("set-redirect"));
    }
}
