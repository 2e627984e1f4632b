//! Logging configuration persisted with the application config.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::metadata::LevelFilter;

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Log level filter: trace, debug, info, warn, or error.
    pub level: String,
    /// Mirror logs to stderr.
    pub console_output: bool,
    /// Also write logs to a file under the log directory.
    pub file_output: bool,
    /// Log directory; platform-local data dir when unset.
    pub directory: Option<PathBuf>,
    /// Number of log files kept by cleanup.
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            directory: None,
            max_files: 5,
        }
    }
}

impl LogConfig {
    /// Parse the configured level, defaulting to INFO if invalid.
    pub fn parse_level(&self) -> LevelFilter {
        match self.level.to_ascii_lowercase().as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "warn" => LevelFilter::WARN,
            "error" => LevelFilter::ERROR,
            "off" => LevelFilter::OFF,
            _ => LevelFilter::INFO,
        }
    }

    /// Resolved log directory.
    pub fn log_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("spinflow")
                .join("logs")
        })
    }

    /// Create the log directory if missing.
    pub fn ensure_log_directory(&self) -> io::Result<()> {
        fs::create_dir_all(self.log_directory())
    }

    /// Path of the current (per-day) log file.
    pub fn current_log_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d");
        self.log_directory().join(format!("spinflow-{stamp}.log"))
    }

    /// Remove the oldest log files beyond `max_files`.
    ///
    /// File names carry a date stamp, so lexical order is chronological.
    pub fn cleanup_old_logs(&self) -> io::Result<()> {
        let mut logs: Vec<PathBuf> = fs::read_dir(self.log_directory())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "log"))
            .collect();
        logs.sort();

        while logs.len() > self.max_files {
            let oldest = logs.remove(0);
            fs::remove_file(&oldest)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        let mut config = LogConfig::default();
        assert_eq!(config.parse_level(), LevelFilter::INFO);

        config.level = "DEBUG".to_string();
        assert_eq!(config.parse_level(), LevelFilter::DEBUG);

        config.level = "nonsense".to_string();
        assert_eq!(config.parse_level(), LevelFilter::INFO);
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            directory: Some(dir.path().to_path_buf()),
            max_files: 2,
            ..Default::default()
        };

        for stamp in ["20250101", "20250102", "20250103", "20250104"] {
            fs::write(dir.path().join(format!("spinflow-{stamp}.log")), b"x").unwrap();
        }

        config.cleanup_old_logs().unwrap();

        let mut kept: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        kept.sort();
        assert_eq!(kept, vec!["spinflow-20250103.log", "spinflow-20250104.log"]);
    }

    #[test]
    fn test_ensure_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            directory: Some(dir.path().join("nested").join("logs")),
            ..Default::default()
        };
        config.ensure_log_directory().unwrap();
        assert!(config.log_directory().is_dir());
    }
}
