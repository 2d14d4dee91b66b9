//! Tracing setup for the binary
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the caller. `RUST_LOG` takes precedence over the configured level.

use crate::config::LoggingConfig;
use crate::error::Result;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber described by `config`.
///
/// When file output is enabled the returned guard must be kept alive for
/// buffered lines to be flushed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let console_layer = config
        .console_output
        .then(|| fmt::layer().with_writer(io::stderr).with_target(false));

    let (file_layer, guard) = if config.file_output {
        let (dir, file_name) = log_file_location(&config.file_path);
        fs::create_dir_all(&dir)?;
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
    } else {
        (None, None)
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        debug!("Tracing subscriber already installed, keeping it");
    }
    Ok(guard)
}

/// Split a log file path into its directory and file name
fn log_file_location(file_path: &str) -> (PathBuf, OsString) {
    let path = Path::new(file_path);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("querylens.log"));
    (dir, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("querylens.log", ".", "querylens.log")]
    #[case("/var/log/ql/out.log", "/var/log/ql", "out.log")]
    #[case("logs/", ".", "logs")]
    fn test_log_file_location(#[case] input: &str, #[case] dir: &str, #[case] name: &str) {
        let (actual_dir, actual_name) = log_file_location(input);
        assert_eq!(actual_dir, PathBuf::from(dir));
        assert_eq!(actual_name, OsString::from(name));
    }

    #[rstest]
    fn test_file_output_creates_log_directory() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("logs").join("querylens.log");
        let config = LoggingConfig {
            level: LogLevel::Debug,
            console_output: false,
            file_output: true,
            file_path: log_path.to_string_lossy().to_string(),
        };

        let guard = init(&config).unwrap();
        assert!(guard.is_some());
        assert!(dir.path().join("logs").is_dir());
    }
}
