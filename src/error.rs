//! Error types for querylens
//!
//! The lexer and analyzers never fail: malformed SQL degrades to partial
//! results. These errors only come from the outer surfaces (configuration,
//! file input, CLI argument validation, JSON output).

use std::path::PathBuf;
use thiserror::Error;

/// Result type for querylens operations
pub type Result<T> = std::result::Result<T, QueryLensError>;

/// Errors raised outside the analysis core
#[derive(Error, Debug)]
pub enum QueryLensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown SQL dialect: {0}")]
    UnknownDialect(String),

    #[error("Invalid position '{0}': expected LINE:COL")]
    InvalidPosition(String),
}

impl QueryLensError {
    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            QueryLensError::UnknownDialect(name) => format!(
                "Unknown dialect '{}'. Available dialects: {}",
                name,
                crate::dialect::dialect_names().join(", ")
            ),
            QueryLensError::ConfigParse { path, .. } => format!(
                "Configuration issue in {}: {}. Fix or remove the file to use defaults.",
                path.display(),
                self
            ),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_dialect_message_lists_dialects() {
        let err = QueryLensError::UnknownDialect("cobol".to_string());
        let message = err.user_message();
        assert!(message.contains("cobol"));
        assert!(message.contains("hive"));
        assert!(message.contains("presto"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: QueryLensError = io_err.into();
        assert!(matches!(err, QueryLensError::Io(_)));
        assert_eq!(err.user_message(), "IO error: missing");
    }
}
