//! Configuration file
//!
//! Optional JSON file; every field has a default:
//!
//! ```json
//! {
//!   "index_path": "docs/html/search",
//!   "default_limit": 50,
//!   "symbol_queries": true,
//!   "log_level": "warn"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::observability::Severity;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Fragment file or search directory (default: bundled fragment)
    #[serde(default)]
    pub index_path: Option<String>,

    /// Result cap for searches without `--limit` (default: unlimited)
    #[serde(default)]
    pub default_limit: Option<usize>,

    /// Escape search text like the generator does (default: false)
    #[serde(default)]
    pub symbol_queries: bool,

    /// Minimum log severity (default: "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_path: None,
            default_limit: None,
            symbol_queries: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.default_limit == Some(0) {
            return Err(CliError::config_error("default_limit must be > 0"));
        }

        if matches!(self.index_path.as_deref(), Some("")) {
            return Err(CliError::config_error("index_path must not be empty"));
        }

        self.severity()?;

        Ok(())
    }

    /// Parsed log level
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    /// Index path as a `PathBuf`, if configured
    pub fn index_path(&self) -> Option<PathBuf> {
        self.index_path.as_ref().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.severity().unwrap(), Severity::Warn);
        assert!(config.index_path().is_none());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_json(
            r#"{"index_path":"html/search","default_limit":5,"symbol_queries":true,"log_level":"trace"}"#,
        )
        .unwrap();
        assert_eq!(config.index_path(), Some(PathBuf::from("html/search")));
        assert_eq!(config.default_limit, Some(5));
        assert!(config.symbol_queries);
        assert_eq!(config.severity().unwrap(), Severity::Trace);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for text in [
            r#"{"default_limit":0}"#,
            r#"{"index_path":""}"#,
            r#"{"log_level":"chatty"}"#,
            r#"{"unknown":1}"#,
            "not json",
        ] {
            let err = Config::from_json(text).unwrap_err();
            assert_eq!(err.code_str(), "DOCX_CLI_CONFIG_ERROR", "{}", text);
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docindex.json");
        std::fs::write(&path, r#"{"default_limit":3}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.default_limit, Some(3));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.code_str(), "DOCX_CLI_CONFIG_ERROR");
    }
}
