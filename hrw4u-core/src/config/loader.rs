//! Settings loader

use crate::config::Settings;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings loader for the supported formats
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let settings = match ext {
            "json" => Self::from_json(&content)?,
            "toml" | "" => Self::from_toml(&content)?,
            _ => return Err(Error::Config(format!("Unknown config format: {}", ext))),
        };
        Self::validate(&settings)?;
        Ok(settings)
    }

    /// Parse JSON settings
    pub fn from_json(content: &str) -> Result<Settings> {
        serde_json::from_str(content).map_err(|e| Error::Config(format!("Invalid JSON: {}", e)))
    }

    /// Parse TOML settings
    pub fn from_toml(content: &str) -> Result<Settings> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Default location: `<config dir>/hrw4u/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hrw4u").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn discover() -> Result<Settings> {
        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!("⚙️ Loading settings from {}", path.display());
                Self::load(path)
            }
            _ => Ok(Settings::default()),
        }
    }

    fn validate(settings: &Settings) -> Result<()> {
        let threshold = settings.suggestions.threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "suggestions.threshold must be within 0-100, got {}",
                threshold
            )));
        }
        if settings.reverse.default_section.hook().is_none() {
            return Err(Error::Config(
                "reverse.default_section must name a hook section".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimilarityAlgorithm;
    use crate::section::SectionType;
    use std::io::Write;

    #[test]
    fn test_toml_loading() {
        let toml = r#"
            [suggestions]
            threshold = 60
            algorithm = "jaro-winkler"

            [reverse]
            default_section = "READ_REQUEST"
        "#;
        let settings = SettingsLoader::from_toml(toml).unwrap();
        assert_eq!(settings.suggestions.threshold, 60.0);
        assert_eq!(settings.suggestions.max, 5);
        assert_eq!(settings.suggestions.algorithm, SimilarityAlgorithm::JaroWinkler);
        assert_eq!(settings.reverse.default_section, SectionType::ReadRequest);
        assert_eq!(settings.output.indent, 4);
    }

    #[test]
    fn test_json_loading() {
        let settings = SettingsLoader::from_json(r#"{"output": {"indent": 2}}"#).unwrap();
        assert_eq!(settings.output.indent, 2);
        assert_eq!(settings.reverse.default_section, SectionType::Remap);
    }

    #[test]
    fn test_load_rejects_vars_default_section() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[reverse]\ndefault_section = \"VARS\"").unwrap();
        assert!(matches!(SettingsLoader::load(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(SettingsLoader::load(file.path()).is_err());
    }
}
