//! Run configuration
//!
//! Resolution order (later wins):
//! 1. Built-in defaults
//! 2. TOML file (explicit path, or ~/.local/share/tally/config.toml if present)
//! 3. Environment: `AI_BACKEND`, `OLLAMA_HOST`, `OLLAMA_MODEL`, `OLLAMA_TIMEOUT_SECS`
//!
//! ```toml
//! backend = "ollama"
//! categories = "/home/me/categories.json"
//!
//! [ollama]
//! host = "http://localhost:11434"
//! model = "llama3.1:8b"
//! timeout_secs = 120
//! ```
//!
//! Command-line flags are applied on top by the CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Which classification backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Ollama HTTP API
    #[default]
    Ollama,
    /// Canned replies, no network
    Mock,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown AI backend: {}", s)),
        }
    }
}

/// Ollama connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OLLAMA_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OllamaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub ollama: OllamaConfig,
    /// Directory with prompt overrides (defaults to the data dir)
    pub prompts_dir: Option<PathBuf>,
    /// JSON category table (defaults to the built-in table)
    pub categories: Option<PathBuf>,
}

impl Config {
    /// Parse a TOML config document
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load config from an explicit file, or the default location if it
    /// exists, then apply environment overrides.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::read(path)?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::read(&path)?,
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Apply environment-style overrides through a lookup function
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("AI_BACKEND") {
            match backend.parse() {
                Ok(kind) => self.backend = kind,
                Err(e) => warn!("{}, keeping {:?}", e, self.backend),
            }
        }
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.ollama.host = host;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.ollama.model = model;
        }
        if let Some(timeout) = lookup("OLLAMA_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => self.ollama.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring invalid OLLAMA_TIMEOUT_SECS"),
            }
        }
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Ollama);
        assert_eq!(config.ollama.host, DEFAULT_OLLAMA_HOST);
        assert_eq!(config.ollama.model, DEFAULT_MODEL);
        assert_eq!(config.ollama.timeout(), Duration::from_secs(120));
        assert!(config.categories.is_none());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = Config::from_toml(
            r#"
categories = "/tmp/cats.json"

[ollama]
model = "gemma3"
"#,
        )
        .unwrap();
        assert_eq!(config.ollama.model, "gemma3");
        assert_eq!(config.ollama.host, DEFAULT_OLLAMA_HOST);
        assert_eq!(config.categories, Some(PathBuf::from("/tmp/cats.json")));
    }

    #[test]
    fn test_from_toml_invalid() {
        assert!(Config::from_toml("[ollama]\ntimeout_secs = \"soon\"").is_err());
        assert!(Config::from_toml("backend = \"cloud\"").is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("AI_BACKEND", "MOCK"),
            ("OLLAMA_HOST", "http://gpu-box:11434"),
            ("OLLAMA_TIMEOUT_SECS", "30"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.backend, BackendKind::Mock);
        assert_eq!(config.ollama.host, "http://gpu-box:11434");
        assert_eq!(config.ollama.model, DEFAULT_MODEL);
        assert_eq!(config.ollama.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "AI_BACKEND" => Some("cloud".to_string()),
            "OLLAMA_TIMEOUT_SECS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ollama]\nmodel = \"qwen2.5\"\n").unwrap();

        let config = Config::read(&path).unwrap();
        assert_eq!(config.ollama.model, "qwen2.5");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
