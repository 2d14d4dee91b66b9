use crate::dialect::DEFAULT_DIALECT;
use crate::error::{QueryLensError, Result};
use crate::format::KeywordCase;
use crate::lineage::DEFAULT_SCHEMA;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub enum LogLevel {
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "warn")]
    #[default]
    Warn,
    #[serde(rename = "error")]
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default = "default_console_output")]
    pub console_output: bool,
    #[serde(default = "default_file_output")]
    pub file_output: bool,
    #[serde(default = "default_log_file_path")]
    pub file_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::default(),
            console_output: default_console_output(),
            file_output: default_file_output(),
            file_path: default_log_file_path(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_dialect")]
    pub default_dialect: String,
    /// Schema for unqualified table names before any `USE`
    #[serde(default = "default_schema")]
    pub default_schema: String,
    #[serde(default)]
    pub keyword_case: KeywordCase,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_dialect: default_dialect(),
            default_schema: default_schema(),
            keyword_case: KeywordCase::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_dialect() -> String {
    DEFAULT_DIALECT.to_string()
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_console_output() -> bool {
    true
}

fn default_file_output() -> bool {
    false
}

fn default_log_file_path() -> String {
    // Use config directory + logs/querylens.log
    match Config::config_dir() {
        Some(config_dir) => config_dir
            .join("logs")
            .join("querylens.log")
            .to_string_lossy()
            .to_string(),
        None => "querylens.log".to_string(),
    }
}

impl Config {
    /// `<config_dir>/querylens`, if the platform has a config directory
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("querylens"))
    }

    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&content).map_err(|source| QueryLensError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        ensure_config_dir(path)?;
        let toml = toml::to_string(self)?;
        fs::write(path, toml)?;
        Ok(())
    }
}

fn ensure_config_dir(config_path: &Path) -> io::Result<()> {
    if let Some(parent) = config_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_dialect, "hive");
        assert_eq!(config.default_schema, "default");
        assert_eq!(config.keyword_case, KeywordCase::Upper);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(config.logging.console_output);
        assert!(!config.logging.file_output);
    }

    #[rstest]
    fn test_partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "default_dialect = \"presto\"\nkeyword_case = \"lower\"\n\n\
             [logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_dialect, "presto");
        assert_eq!(config.default_schema, "default");
        assert_eq!(config.keyword_case, KeywordCase::Lower);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.console_output);
    }

    #[rstest]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_dialect = [unclosed").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, QueryLensError::ConfigParse { .. }));
        assert!(err.user_message().contains("config.toml"));
    }

    #[rstest]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.default_schema = "warehouse".to_string();
        config.logging.level = LogLevel::Trace;

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[rstest]
    #[case(LogLevel::Trace, "trace")]
    #[case(LogLevel::Warn, "warn")]
    #[case(LogLevel::Error, "error")]
    fn test_log_level_display(#[case] level: LogLevel, #[case] expected: &str) {
        assert_eq!(level.to_string(), expected);
    }
}
