//! Persistent user settings, stored as JSON under the home directory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};

use crate::eval::{EvalOptions, Scoping, DEFAULT_MAX_CALL_DEPTH};

/// Accepted values for `language`.
pub const LANGUAGES: [&str; 3] = ["en", "id", "auto"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub language: String,
    pub version: String,
    pub cultural_validation: bool,
    pub auto_format: bool,
    pub log_level: String,
    pub scoping: Scoping,
    pub max_call_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: String::from("auto"),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cultural_validation: true,
            auto_format: false,
            log_level: String::from("warn"),
            scoping: Scoping::Dynamic,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl Config {
    /// `$HOME/.minangscript/config.json`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
        Some(PathBuf::from(home).join(".minangscript").join("config.json"))
    }

    /// Read the config at `path`. A missing file gives the defaults; so
    /// does a corrupt one, with a warning.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    target: "minang::cli",
                    "ignoring corrupt config {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn set_language(&mut self, lang: &str) -> anyhow::Result<()> {
        if !LANGUAGES.contains(&lang) {
            bail!(
                "unsupported language '{}' (expected one of: {})",
                lang,
                LANGUAGES.join(", ")
            );
        }
        self.language = lang.to_string();
        Ok(())
    }

    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            scoping: self.scoping,
            max_call_depth: self.max_call_depth,
        }
    }

    /// Unknown level names fall back to `warn`.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Warn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load(&path), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"language": "id", "scoping": "lexical"}"#).unwrap();
        let config = Config::load(&path);
        assert_eq!(config.language, "id");
        assert_eq!(config.scoping, Scoping::Lexical);
        assert!(config.cultural_validation);
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn save_writes_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        Config::default().save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"culturalValidation\": true"));
        assert!(text.contains("\"maxCallDepth\": 1000"));
        assert_eq!(Config::load(&path), Config::default());
    }

    #[test]
    fn language_is_validated() {
        let mut config = Config::default();
        config.set_language("en").unwrap();
        assert_eq!(config.language, "en");
        assert!(config.set_language("fr").is_err());
        assert_eq!(config.language, "en");
    }

    #[test]
    fn level_filter_parses_names() {
        let mut config = Config::default();
        assert_eq!(config.level_filter(), LevelFilter::Warn);
        config.log_level = "debug".into();
        assert_eq!(config.level_filter(), LevelFilter::Debug);
        config.log_level = "loud".into();
        assert_eq!(config.level_filter(), LevelFilter::Warn);
    }
}
