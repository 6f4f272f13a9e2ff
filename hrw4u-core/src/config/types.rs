//! Settings type definitions

use crate::section::SectionType;
use serde::{Deserialize, Serialize};

/// Root settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Did-you-mean tuning
    #[serde(default)]
    pub suggestions: SuggestionSettings,

    /// Reverse tool behaviour
    #[serde(default)]
    pub reverse: ReverseSettings,

    /// Output formatting
    #[serde(default)]
    pub output: OutputSettings,
}

/// Similarity measure used for suggestions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SimilarityAlgorithm {
    #[default]
    DamerauLevenshtein,
    JaroWinkler,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionSettings {
    /// Minimum score (0-100) a candidate needs to be shown
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Maximum number of suggestions per error
    #[serde(default = "default_max")]
    pub max: usize,

    #[serde(default)]
    pub algorithm: SimilarityAlgorithm,
}

fn default_threshold() -> f64 {
    70.0
}

fn default_max() -> usize {
    5
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max: default_max(),
            algorithm: SimilarityAlgorithm::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReverseSettings {
    /// Section for native rulesets that do not start with a hook condition
    #[serde(default = "default_section")]
    pub default_section: SectionType,
}

fn default_section() -> SectionType {
    SectionType::Remap
}

impl Default for ReverseSettings {
    fn default() -> Self {
        Self {
            default_section: default_section(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSettings {
    /// Spaces per nesting level
    #[serde(default = "default_indent")]
    pub indent: usize,
}

fn default_indent() -> usize {
    4
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}
